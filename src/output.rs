//! JSON export of the aggregated, enriched schedule.

use std::fs;
use std::path::{Path, PathBuf};

use crate::protocol::Screening;

/// Writes the schedule sorted by date then title, through a temp file so an
/// interrupted run leaves any previous export intact.
pub fn write_screenings(path: &Path, screenings: &[Screening]) -> Result<(), String> {
    let mut sorted: Vec<&Screening> = screenings.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));

    let body = serde_json::to_string_pretty(&sorted)
        .map_err(|error| format!("Failed to serialize schedule: {error}"))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("Failed to create {}: {}", parent.display(), error))?;
        }
    }
    let temp_path = {
        let mut os = path.to_path_buf().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    };
    fs::write(&temp_path, body)
        .and_then(|()| fs::rename(&temp_path, path))
        .map_err(|error| format!("Failed to write {}: {}", path.display(), error))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::write_screenings;
    use crate::protocol::{Screening, Theater};

    const THEATER: Theater = Theater {
        name: "Test Theatre",
        url: "https://example.com",
        address: "1 Example Ave",
    };

    #[test]
    fn test_export_is_sorted_by_date_then_title() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("showtimes.json");

        let feb8 = NaiveDate::from_ymd_opt(2026, 2, 8).expect("valid date");
        let feb7 = NaiveDate::from_ymd_opt(2026, 2, 7).expect("valid date");
        let screenings = vec![
            Screening::at(&THEATER, "Zodiac".to_string(), feb8),
            Screening::at(&THEATER, "Playtime".to_string(), feb7),
            Screening::at(&THEATER, "Alien".to_string(), feb8),
        ];

        write_screenings(&path, &screenings).expect("export should succeed");

        let body = std::fs::read_to_string(&path).expect("export exists");
        let parsed: Vec<Screening> = serde_json::from_str(&body).expect("export is valid JSON");
        let titles: Vec<&str> = parsed.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Playtime", "Alien", "Zodiac"]);
    }
}
