//! Scraper for Alamo Drafthouse Wrigleyville, via the market schedule API.
//!
//! The only JSON source; presentations carry a title, an optional release
//! year, and a slug for the ticket page, but no per-day times.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{error, info};

use crate::fetch::{fetch_json, PageFetcher};
use crate::protocol::{Screening, Theater};

use super::TheaterScraper;

const THEATER: Theater = Theater {
    name: "Alamo Drafthouse",
    url: "https://drafthouse.com/chicago/theater/wrigleyville",
    address: "3519 N Clark St",
};

const API_URL: &str = "https://drafthouse.com/s/mother/v2/schedule/market/chicago";

/// Non-film presentations the API mixes into the schedule.
const SKIP_WORDS: [&str; 6] = ["menu", "gift", "membership", "party", "rental", "private"];

pub struct AlamoScraper;

impl TheaterScraper for AlamoScraper {
    fn name(&self) -> &'static str {
        THEATER.name
    }

    fn scrape(&self, fetcher: &dyn PageFetcher, today: NaiveDate) -> Vec<Screening> {
        let data = match fetch_json(fetcher, API_URL) {
            Ok(data) => data,
            Err(err) => {
                error!("Failed to fetch {} API: {}", THEATER.name, err);
                return Vec::new();
            }
        };
        let screenings = parse_schedule(&data, today);
        info!("{}: Found {} screenings", THEATER.name, screenings.len());
        screenings
    }
}

fn parse_schedule(data: &serde_json::Value, today: NaiveDate) -> Vec<Screening> {
    let inner = if data["data"].is_object() {
        &data["data"]
    } else {
        data
    };
    let Some(presentations) = inner["presentations"].as_array() else {
        return Vec::new();
    };

    let mut screenings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for item in presentations {
        let show = &item["show"];
        if !show.is_object() {
            continue;
        }
        let title = show["title"].as_str().unwrap_or_default().trim().to_string();
        if title.is_empty() || seen.contains(&title) {
            continue;
        }
        let lowered = title.to_lowercase();
        if SKIP_WORDS.iter().any(|word| lowered.contains(word)) {
            continue;
        }
        seen.insert(title.clone());

        let year = show["year"]
            .as_u64()
            .and_then(|year| u16::try_from(year).ok())
            .or_else(|| show["year"].as_str().and_then(|s| s.trim().parse().ok()));

        let slug = [item["slug"].as_str(), show["slug"].as_str()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|slug| !slug.is_empty());
        let ticket_url = slug
            .map(|slug| format!("https://drafthouse.com/chicago/show/{slug}"))
            .unwrap_or_else(|| THEATER.url.to_string());

        let mut screening = Screening::at(&THEATER, title, today);
        screening.year = year;
        screening.ticket_url = ticket_url;
        screenings.push(screening);
    }
    screenings
}
