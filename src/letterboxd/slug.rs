//! Title canonicalization for Letterboxd film addresses.
//!
//! Letterboxd indexes films by a strict slug convention; these pure helpers
//! turn the free-text titles scraped from theater pages into that form, and
//! derive the key under which a resolution outcome is cached.

use std::sync::OnceLock;

use regex::Regex;

fn parenthetical_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(\d{4}\)\s*").expect("year pattern must parse"))
}

/// Converts a scraped title to a Letterboxd URL slug.
///
/// A parenthetical year and any subtitle after the first colon are dropped
/// before slugging, so "The Matrix (1999)" and "the matrix" converge.
/// Returns an empty string only for titles with no alphanumeric characters;
/// callers treat that as "no match" without a lookup.
pub fn title_slug(title: &str) -> String {
    let title = parenthetical_year_re().replace_all(title, "");
    let title = match title.split_once(':') {
        Some((head, _)) => head,
        None => title.as_ref(),
    };

    let mut filtered = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            filtered.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            filtered.push(ch);
        }
    }

    let hyphenated = filtered.split_whitespace().collect::<Vec<_>>().join("-");
    let mut slug = String::with_capacity(hyphenated.len());
    let mut previous_was_hyphen = false;
    for ch in hyphenated.chars() {
        if ch == '-' {
            if !previous_was_hyphen {
                slug.push('-');
            }
            previous_was_hyphen = true;
        } else {
            slug.push(ch);
            previous_was_hyphen = false;
        }
    }
    slug.trim_matches('-').to_string()
}

/// Key under which a resolution outcome is cached.
///
/// An absent year is a distinct key from every concrete year, so "Tenet"
/// and "Tenet (2020)" resolve and cache independently.
pub fn film_cache_key(title: &str, year: Option<u16>) -> String {
    match year {
        Some(year) => format!("{title}|{year}"),
        None => title.to_string(),
    }
}
