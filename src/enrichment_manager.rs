//! Attaches Letterboxd details to scraped screenings, one lookup per film.
//!
//! A film showing at five theaters on ten dates is still one resolution:
//! the batch is deduplicated by (title, year) before the resolver runs, and
//! the shared outcome is merged back onto every matching screening.

use std::collections::{HashMap, HashSet};

use log::info;

use crate::letterboxd::DetailsResolver;
use crate::protocol::{FilmDetails, Screening};

/// Enriches a batch of screenings in place, preserving length and order.
pub fn enrich_screenings(
    resolver: &mut DetailsResolver,
    mut screenings: Vec<Screening>,
) -> Vec<Screening> {
    // First-seen order keeps the lookup log stable across runs.
    let mut unique: Vec<(String, Option<u16>)> = Vec::new();
    let mut seen: HashSet<(String, Option<u16>)> = HashSet::new();
    for screening in &screenings {
        let pair = (screening.title.clone(), screening.year);
        if seen.insert(pair.clone()) {
            unique.push(pair);
        }
    }

    info!("Fetching Letterboxd details for {} unique films", unique.len());
    let mut resolved: HashMap<(String, Option<u16>), Option<FilmDetails>> = HashMap::new();
    for (title, year) in unique {
        let details = resolver.resolve(&title, year);
        resolved.insert((title, year), details);
    }

    let matched = resolved.values().filter(|details| details.is_some()).count();
    info!("Found Letterboxd details for {} films", matched);

    for screening in &mut screenings {
        let pair = (screening.title.clone(), screening.year);
        if let Some(Some(details)) = resolved.get(&pair) {
            screening.letterboxd = Some(details.clone());
        }
    }
    screenings
}
