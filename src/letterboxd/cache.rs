//! Durable cache of Letterboxd resolution outcomes.
//!
//! One JSON object maps each cache key to either the resolved film details
//! or an explicit `null` recording that resolution was attempted and
//! definitively failed. The file is shared across runs and only ever grows;
//! clearing it is a manual operation.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::{debug, warn};

use crate::protocol::FilmDetails;

/// Lookup result distinguishing a confirmed miss from a key that was never
/// attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A previous run resolved this key to these details.
    Details(FilmDetails),
    /// A previous run attempted this key and found no acceptable page.
    NoMatch,
    /// This key has never been resolved.
    Unattempted,
}

/// Resolution outcomes persisted to one JSON file.
pub struct DetailsCache {
    path: PathBuf,
    entries: HashMap<String, Option<FilmDetails>>,
}

impl DetailsCache {
    /// Loads the cache file, degrading to an empty cache when the file is
    /// missing, unreadable, or malformed.
    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(body) => match serde_json::from_str(&body) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(
                        "Ignoring malformed cache file {}: {}",
                        path.display(),
                        error
                    );
                    HashMap::new()
                }
            },
            Err(_) => {
                debug!("No cache file at {}, starting empty", path.display());
                HashMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn lookup(&self, key: &str) -> CacheLookup {
        match self.entries.get(key) {
            Some(Some(details)) => CacheLookup::Details(details.clone()),
            Some(None) => CacheLookup::NoMatch,
            None => CacheLookup::Unattempted,
        }
    }

    /// Records an outcome and flushes to disk immediately.
    ///
    /// An existing entry is left untouched; outcomes for a key never change
    /// within a run and stale entries are cleared out-of-band.
    pub fn record(&mut self, key: &str, outcome: Option<FilmDetails>) {
        if self.entries.contains_key(key) {
            debug!("Cache entry for {key:?} already present, keeping it");
            return;
        }
        self.entries.insert(key.to_string(), outcome);
        self.flush();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the whole map to a temp file and renames it over the cache
    /// path, so an interrupted run leaves the previous file intact.
    fn flush(&self) {
        let body = match serde_json::to_string_pretty(&self.entries) {
            Ok(body) => body,
            Err(error) => {
                warn!("Failed to serialize cache: {error}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(error) = fs::create_dir_all(parent) {
                    warn!("Failed to create {}: {}", parent.display(), error);
                    return;
                }
            }
        }
        let temp_path = {
            let mut os = self.path.clone().into_os_string();
            os.push(".tmp");
            PathBuf::from(os)
        };
        if let Err(error) = fs::write(&temp_path, body).and_then(|()| fs::rename(&temp_path, &self.path)) {
            warn!(
                "Failed to write cache file {}: {}",
                self.path.display(),
                error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheLookup, DetailsCache};
    use crate::protocol::FilmDetails;

    fn details(url: &str) -> FilmDetails {
        FilmDetails {
            letterboxd_url: url.to_string(),
            title: Some("Tenet".to_string()),
            director: Some("Christopher Nolan".to_string()),
            rating: Some("7.8".to_string()),
            tagline: None,
            description: None,
            poster: None,
        }
    }

    #[test]
    fn test_lookup_distinguishes_three_states() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = DetailsCache::load(dir.path().join("cache.json"));

        let tenet = details("https://letterboxd.com/film/tenet-2020/");
        cache.record("Tenet|2020", Some(tenet.clone()));
        cache.record("Unreleased Film", None);

        assert_eq!(cache.lookup("Tenet|2020"), CacheLookup::Details(tenet));
        assert_eq!(cache.lookup("Unreleased Film"), CacheLookup::NoMatch);
        assert_eq!(cache.lookup("Tenet|2021"), CacheLookup::Unattempted);
    }

    #[test]
    fn test_entries_survive_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");

        let tenet = details("https://letterboxd.com/film/tenet-2020/");
        {
            let mut cache = DetailsCache::load(path.clone());
            cache.record("Tenet|2020", Some(tenet.clone()));
            cache.record("Unreleased Film", None);
        }

        let reloaded = DetailsCache::load(path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.lookup("Tenet|2020"), CacheLookup::Details(tenet));
        assert_eq!(reloaded.lookup("Unreleased Film"), CacheLookup::NoMatch);
    }

    #[test]
    fn test_malformed_file_loads_as_empty_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json at all").expect("write fixture");

        let cache = DetailsCache::load(path);
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("anything"), CacheLookup::Unattempted);
    }

    #[test]
    fn test_existing_entry_is_not_overwritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = DetailsCache::load(dir.path().join("cache.json"));

        let tenet = details("https://letterboxd.com/film/tenet-2020/");
        cache.record("Tenet|2020", Some(tenet.clone()));
        cache.record("Tenet|2020", None);

        assert_eq!(cache.lookup("Tenet|2020"), CacheLookup::Details(tenet));
    }

    #[test]
    fn test_missing_parent_directory_is_created_on_flush() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deeper").join("cache.json");

        let mut cache = DetailsCache::load(path.clone());
        cache.record("Tenet|2020", None);

        assert!(path.exists());
        let reloaded = DetailsCache::load(path);
        assert_eq!(reloaded.lookup("Tenet|2020"), CacheLookup::NoMatch);
    }
}
