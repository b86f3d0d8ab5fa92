//! Per-theater schedule scrapers and the shared schedule-text helpers.
//!
//! Scrapers are site-specific pattern extractors and deliberately
//! disposable: each one fetches a page, pulls out whatever screenings it
//! recognizes, and returns an empty batch on any failure. They never abort
//! the run.

pub(crate) mod alamo;
pub(crate) mod doc_films;
pub(crate) mod facets;
pub(crate) mod logan;
pub(crate) mod music_box;

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use scraper::ElementRef;

use crate::config::ScrapersConfig;
use crate::fetch::PageFetcher;
use crate::protocol::Screening;

/// Interface implemented by concrete theater scrapers.
pub trait TheaterScraper {
    /// Source name used in logs.
    fn name(&self) -> &'static str;
    /// Scrapes the theater schedule, returning an empty batch on failure.
    fn scrape(&self, fetcher: &dyn PageFetcher, today: NaiveDate) -> Vec<Screening>;
}

/// All scrapers enabled by the configuration, in fixed run order.
pub fn enabled_scrapers(config: &ScrapersConfig) -> Vec<Box<dyn TheaterScraper>> {
    let mut scrapers: Vec<Box<dyn TheaterScraper>> = Vec::new();
    if config.music_box {
        scrapers.push(Box::new(music_box::MusicBoxScraper));
    }
    if config.logan {
        scrapers.push(Box::new(logan::LoganScraper));
    }
    if config.alamo {
        scrapers.push(Box::new(alamo::AlamoScraper));
    }
    if config.doc_films {
        scrapers.push(Box::new(doc_films::DocFilmsScraper));
    }
    if config.facets {
        scrapers.push(Box::new(facets::FacetsScraper));
    }
    scrapers
}

/// Collapses whitespace runs to single spaces.
pub(crate) fn clean_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element with per-node trimming.
pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a possibly relative href against a site base.
pub(crate) fn absolute_url(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parses the first "Feb 7" style month-day token against today's year.
/// Theater calendars only list current and upcoming dates, so a date far in
/// the past rolls into the following year.
pub(crate) fn parse_month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})\b")
            .expect("month-day pattern must parse")
    });
    let caps = re.captures(text)?;
    let month_token = caps[1].to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_token)? as u32 + 1;
    let day: u32 = caps[2].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date < today - Duration::days(60) {
        return NaiveDate::from_ymd_opt(today.year() + 1, month, day);
    }
    Some(date)
}

fn showtime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*(am|pm)?\b").expect("showtime pattern must parse")
    })
}

/// All "7:00pm" style tokens in a text blob, normalized, first-seen order,
/// duplicates dropped.
pub(crate) fn find_showtimes(text: &str) -> Vec<String> {
    let mut times = Vec::new();
    for caps in showtime_re().captures_iter(text) {
        let Some(time) = normalize_captured_showtime(&caps) else {
            continue;
        };
        if !times.contains(&time) {
            times.push(time);
        }
    }
    times
}

fn normalize_captured_showtime(caps: &regex::Captures) -> Option<String> {
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    match caps.get(3) {
        Some(meridiem) => Some(format!(
            "{}:{:02} {}",
            hour,
            minute,
            meridiem.as_str().to_ascii_uppercase()
        )),
        None => Some(format!("{hour}:{minute:02}")),
    }
}
