//! Shared data types passed between scrapers, enrichment, and export.

use chrono::NaiveDate;

/// Sentinel showtime used when a source lists a film without concrete times.
pub const SEE_WEBSITE: &str = "See website";

/// Static identity of a scraped theater.
#[derive(Debug, Clone, Copy)]
pub struct Theater {
    pub name: &'static str,
    pub url: &'static str,
    pub address: &'static str,
}

/// One film screening scraped from a theater site.
///
/// Scrapers produce these; the enrichment pass only ever adds the
/// `letterboxd` attachment and leaves every other field untouched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Screening {
    pub title: String,
    pub theater: String,
    pub theater_url: String,
    pub address: String,
    pub date: NaiveDate,
    pub times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub ticket_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letterboxd: Option<FilmDetails>,
}

impl Screening {
    /// Creates a screening for a theater with the sentinel showtime and the
    /// theater page as ticket link; scrapers override what they can extract.
    pub fn at(theater: &Theater, title: String, date: NaiveDate) -> Self {
        Self {
            title,
            theater: theater.name.to_string(),
            theater_url: theater.url.to_string(),
            address: theater.address.to_string(),
            date,
            times: vec![SEE_WEBSITE.to_string()],
            format: None,
            director: None,
            year: None,
            ticket_url: theater.url.to_string(),
            letterboxd: None,
        }
    }
}

/// Canonical film metadata resolved from a Letterboxd film page.
///
/// A resolved page with missing sub-fields is still a match; only the page
/// address is always present.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilmDetails {
    pub letterboxd_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Screening, Theater, SEE_WEBSITE};
    use chrono::NaiveDate;

    const THEATER: Theater = Theater {
        name: "Test Theatre",
        url: "https://example.com",
        address: "1 Example Ave",
    };

    #[test]
    fn test_screening_at_fills_theater_fields_and_sentinel_times() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 7).expect("valid date");
        let screening = Screening::at(&THEATER, "Playtime".to_string(), date);

        assert_eq!(screening.theater, "Test Theatre");
        assert_eq!(screening.theater_url, "https://example.com");
        assert_eq!(screening.ticket_url, "https://example.com");
        assert_eq!(screening.times, vec![SEE_WEBSITE.to_string()]);
        assert_eq!(screening.year, None);
        assert!(screening.letterboxd.is_none());
    }

    #[test]
    fn test_screening_serializes_without_empty_optionals() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 7).expect("valid date");
        let screening = Screening::at(&THEATER, "Playtime".to_string(), date);

        let json = serde_json::to_string(&screening).expect("screening should serialize");
        assert!(json.contains("\"date\":\"2026-02-07\""));
        assert!(!json.contains("letterboxd"));
        assert!(!json.contains("\"year\""));
    }
}
