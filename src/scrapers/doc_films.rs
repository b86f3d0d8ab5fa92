//! Scraper for Doc Films (University of Chicago).
//!
//! The weekly schedule links each screening to the calendar; titles often
//! carry their year inline as "Title (1974)", which seeds the Letterboxd
//! lookup with a disambiguating year.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use log::{error, info};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::fetch::PageFetcher;
use crate::protocol::{Screening, Theater};

use super::{clean_text, element_text, find_showtimes, parse_month_day, TheaterScraper};

const THEATER: Theater = Theater {
    name: "Doc Films",
    url: "https://docfilms.org",
    address: "Max Palevsky Cinema, Ida Noyes Hall, 1212 E 59th St",
};

fn titled_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Z][^(]+)\(\s*(\d{4})\s*\)").expect("title-year pattern must parse")
    })
}

fn trailing_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(\d{4}\)\s*$").expect("trailing year pattern must parse"))
}

fn weekday_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday),?\s+(\w+\s+\d{1,2})",
        )
        .expect("weekday date pattern must parse")
    })
}

fn format_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(35mm|16mm|70mm|DCP|[Dd]igital)\b").expect("format pattern must parse")
    })
}

pub struct DocFilmsScraper;

impl TheaterScraper for DocFilmsScraper {
    fn name(&self) -> &'static str {
        THEATER.name
    }

    fn scrape(&self, fetcher: &dyn PageFetcher, today: NaiveDate) -> Vec<Screening> {
        let body = match fetcher.fetch(THEATER.url) {
            Ok(body) => body,
            Err(err) => {
                error!("Failed to fetch {}: {}", THEATER.name, err);
                return Vec::new();
            }
        };
        let screenings = parse_schedule(&body, today);
        info!("{}: Found {} screenings", THEATER.name, screenings.len());
        screenings
    }
}

fn parse_schedule(html: &str, today: NaiveDate) -> Vec<Screening> {
    let doc = Html::parse_document(html);
    let Ok(calendar_link_sel) = Selector::parse("a[href*='/calendar']") else {
        return Vec::new();
    };
    let Ok(heading_sel) = Selector::parse("h2, h3, h4, strong") else {
        return Vec::new();
    };

    let mut screenings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for link in doc.select(&calendar_link_sel) {
        let Some(entry) = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| matches!(el.value().name(), "div" | "article" | "li" | "section"))
        else {
            continue;
        };
        let text = element_text(entry);

        let (title, year) = match titled_year_re().captures(&text) {
            Some(caps) => (
                clean_text(&caps[1]),
                caps[2].parse::<u16>().ok(),
            ),
            None => {
                let Some(heading) = entry.select(&heading_sel).next() else {
                    continue;
                };
                let heading_text = clean_text(&element_text(heading));
                let title = trailing_year_re().replace(&heading_text, "").to_string();
                (title, None)
            }
        };
        if title.len() < 2 {
            continue;
        }

        // One card can hold several calendar links; key on the surrounding
        // text so distinct dates of the same film survive.
        let snippet: String = text.chars().take(50).collect();
        if !seen.insert(format!("{title}|{snippet}")) {
            continue;
        }

        let date = weekday_date_re()
            .captures(&text)
            .and_then(|caps| parse_month_day(&caps[1], today))
            .or_else(|| parse_month_day(&text, today));
        let Some(date) = date else {
            continue;
        };

        let mut times = find_showtimes(&text);
        times.truncate(1);

        let format = format_re().find(&text).map(|m| m.as_str().to_string());

        let mut screening = Screening::at(&THEATER, title, date);
        if !times.is_empty() {
            screening.times = times;
        }
        screening.format = format;
        screening.year = year;
        screenings.push(screening);
    }
    screenings
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::parse_schedule;
    use crate::protocol::SEE_WEBSITE;

    const SCHEDULE: &str = r#"
<html><body>
  <div class="screening">
    <strong>Chinatown (1974)</strong>
    <p>Friday, February 6 @ 7:00 PM &mdash; 35mm</p>
    <a href="/calendar/winter">calendar</a>
  </div>
  <div class="screening">
    <h3>Student Shorts Night</h3>
    <p>Saturday, February 7</p>
    <a href="/calendar/winter#shorts">calendar</a>
  </div>
  <p>Unattached <a href="/calendar">calendar link</a> outside any card is kept
     only if its section parses.</p>
</body></html>
"#;

    #[test]
    fn test_parse_schedule_reads_title_year_and_format() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
        let screenings = parse_schedule(SCHEDULE, today);

        assert_eq!(screenings.len(), 2);

        let chinatown = &screenings[0];
        assert_eq!(chinatown.title, "Chinatown");
        assert_eq!(chinatown.year, Some(1974));
        assert_eq!(
            chinatown.date,
            NaiveDate::from_ymd_opt(2026, 2, 6).expect("valid date")
        );
        assert_eq!(chinatown.times, ["7:00 PM"]);
        assert_eq!(chinatown.format.as_deref(), Some("35mm"));
        assert_eq!(chinatown.ticket_url, "https://docfilms.org");

        let shorts = &screenings[1];
        assert_eq!(shorts.title, "Student Shorts Night");
        assert_eq!(shorts.year, None);
        assert_eq!(shorts.times, [SEE_WEBSITE.to_string()]);
    }
}
