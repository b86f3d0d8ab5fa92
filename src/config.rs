//! Application configuration model and defaults.
//!
//! Read once at startup from `config.toml` in the platform config directory.
//! A missing or malformed file falls back to the compiled defaults; the file
//! is never rewritten by the program.

use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::fetch::BROWSER_USER_AGENT;
use crate::letterboxd::DEFAULT_BASE_URL;

/// Root configuration read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Outbound HTTP behavior.
    pub http: HttpConfig,
    #[serde(default)]
    /// Letterboxd lookup preferences.
    pub letterboxd: LetterboxdConfig,
    #[serde(default)]
    /// Per-theater scraper toggles.
    pub scrapers: ScrapersConfig,
    #[serde(default)]
    /// Export destination.
    pub output: OutputConfig,
}

/// Timeouts and identification for outbound requests.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Letterboxd lookup preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LetterboxdConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Cache file override; the platform data directory is used when unset.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

impl Default for LetterboxdConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_file: None,
        }
    }
}

impl LetterboxdConfig {
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(default_cache_path)
    }
}

/// Per-theater scraper toggles; every source is on by default.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ScrapersConfig {
    #[serde(default = "default_true")]
    pub music_box: bool,
    #[serde(default = "default_true")]
    pub logan: bool,
    #[serde(default = "default_true")]
    pub alamo: bool,
    #[serde(default = "default_true")]
    pub doc_films: bool,
    #[serde(default = "default_true")]
    pub facets: bool,
}

impl Default for ScrapersConfig {
    fn default() -> Self {
        Self {
            music_box: true,
            logan: true,
            alamo: true,
            doc_films: true,
            facets: true,
        }
    }
}

/// Export destination for the aggregated schedule.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
        }
    }
}

impl Config {
    /// Reads the platform config file, falling back to defaults when the
    /// file is absent or malformed.
    pub fn load() -> Self {
        let Some(path) = dirs::config_dir().map(|dir| dir.join("marquee").join("config.toml"))
        else {
            return Self::default();
        };
        let Ok(body) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&body) {
            Ok(config) => config,
            Err(error) => {
                warn!("Ignoring malformed config {}: {}", path.display(), error);
                Self::default()
            }
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_io_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cache_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("marquee"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("letterboxd_cache.json")
}

fn default_output_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("marquee"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("showtimes.json")
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn test_default_config_has_expected_values() {
        let config = Config::default();

        assert_eq!(config.http.connect_timeout_secs, 5);
        assert_eq!(config.http.io_timeout_secs, 10);
        assert!(config.http.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.letterboxd.base_url, "https://letterboxd.com");
        assert_eq!(config.letterboxd.cache_file, None);
        assert!(config.scrapers.music_box);
        assert!(config.scrapers.logan);
        assert!(config.scrapers.alamo);
        assert!(config.scrapers.doc_films);
        assert!(config.scrapers.facets);
        assert!(config
            .letterboxd
            .cache_path()
            .ends_with("letterboxd_cache.json"));
    }

    #[test]
    fn test_partial_config_deserialization_keeps_defaults() {
        let partial = r#"
[http]
io_timeout_secs = 30

[scrapers]
alamo = false
"#;

        let parsed: Config = toml::from_str(partial).expect("config should parse");
        assert_eq!(parsed.http.io_timeout_secs, 30);
        assert_eq!(parsed.http.connect_timeout_secs, 5);
        assert!(!parsed.scrapers.alamo);
        assert!(parsed.scrapers.music_box);
        assert_eq!(parsed.letterboxd.base_url, "https://letterboxd.com");
    }

    #[test]
    fn test_cache_file_override_wins() {
        let parsed: Config = toml::from_str(
            r#"
[letterboxd]
cache_file = "/tmp/custom_cache.json"
"#,
        )
        .expect("config should parse");
        assert_eq!(
            parsed.letterboxd.cache_path(),
            std::path::PathBuf::from("/tmp/custom_cache.json")
        );
    }
}
