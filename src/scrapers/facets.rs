//! Scraper for Facets Cinematheque.
//!
//! Program cards are inconsistently marked up, so matching is permissive
//! and a skip list weeds out navigation and non-screening programming.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{error, info};
use scraper::{ElementRef, Html, Selector};

use crate::fetch::PageFetcher;
use crate::protocol::{Screening, Theater};

use super::{absolute_url, clean_text, element_text, find_showtimes, parse_month_day, TheaterScraper};

const THEATER: Theater = Theater {
    name: "Facets",
    url: "https://www.facets.org",
    address: "1517 W Fullerton Ave",
};

const SKIP_WORDS: [&str; 11] = [
    "calendar",
    "donate",
    "about",
    "contact",
    "view all",
    "film camp",
    "trivia",
    "party",
    "membership",
    "gift",
    "rental",
];

pub struct FacetsScraper;

impl TheaterScraper for FacetsScraper {
    fn name(&self) -> &'static str {
        THEATER.name
    }

    fn scrape(&self, fetcher: &dyn PageFetcher, today: NaiveDate) -> Vec<Screening> {
        // The calendar page is preferred; the homepage still lists the
        // current program when the calendar is down.
        let body = match fetcher.fetch(&format!("{}/calendar", THEATER.url)) {
            Ok(body) => body,
            Err(_) => match fetcher.fetch(THEATER.url) {
                Ok(body) => body,
                Err(err) => {
                    error!("Failed to fetch {}: {}", THEATER.name, err);
                    return Vec::new();
                }
            },
        };
        let screenings = parse_programs(&body, today);
        info!("{}: Found {} screenings", THEATER.name, screenings.len());
        screenings
    }
}

fn parse_programs(html: &str, today: NaiveDate) -> Vec<Screening> {
    let doc = Html::parse_document(html);
    let Ok(card_sel) = Selector::parse(
        "div[class*='event'], div[class*='program'], div[class*='screening'], \
         li[class*='event'], li[class*='program'], article[class*='event']",
    ) else {
        return Vec::new();
    };
    let Ok(link_card_sel) =
        Selector::parse("a[href*='/program'], a[href*='/film'], a[href*='/event']")
    else {
        return Vec::new();
    };
    let Ok(heading_sel) = Selector::parse("h2, h3, h4, strong") else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let cards: Vec<ElementRef> = doc.select(&card_sel).collect();
    // Bare program links carry enough text to list when no cards exist.
    let cards = if cards.is_empty() {
        doc.select(&link_card_sel).collect()
    } else {
        cards
    };

    let mut screenings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for card in cards {
        let title = match card.select(&heading_sel).next() {
            Some(heading) => clean_text(&element_text(heading)),
            None if card.value().name() == "a" => clean_text(&element_text(card)),
            None => continue,
        };
        if title.len() < 2 {
            continue;
        }
        let lowered = title.to_lowercase();
        if SKIP_WORDS.iter().any(|word| lowered.contains(word)) {
            continue;
        }
        if !seen.insert(title.clone()) {
            continue;
        }

        let text = element_text(card);
        let date = parse_month_day(&text, today).unwrap_or(today);
        let times = find_showtimes(&text);

        let href = if card.value().name() == "a" {
            card.value().attr("href")
        } else {
            card.select(&link_sel)
                .next()
                .and_then(|link| link.value().attr("href"))
        };
        let ticket_url = href
            .map(|href| absolute_url(THEATER.url, href))
            .unwrap_or_else(|| THEATER.url.to_string());

        let mut screening = Screening::at(&THEATER, title, date);
        if !times.is_empty() {
            screening.times = times;
        }
        screening.ticket_url = ticket_url;
        screenings.push(screening);
    }
    screenings
}
