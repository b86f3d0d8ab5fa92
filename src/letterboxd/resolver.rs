//! Ordered lookup strategies resolving one film title to its Letterboxd page.
//!
//! Each strategy is a single blocking fetch with its own failure isolation:
//! a transport error or non-success status only means "this address is not
//! reachable" and the next strategy runs. Exhausting every strategy, or
//! failing year disambiguation, records a confirmed no-match so later runs
//! stay quiet.

use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::fetch::PageFetcher;
use crate::protocol::FilmDetails;

use super::cache::{CacheLookup, DetailsCache};
use super::slug::{film_cache_key, title_slug};

pub const DEFAULT_BASE_URL: &str = "https://letterboxd.com";

/// Resolves film titles against Letterboxd, backed by the durable outcome
/// cache for the lifetime of one pipeline run.
pub struct DetailsResolver {
    fetcher: Box<dyn PageFetcher>,
    cache: DetailsCache,
    base_url: String,
}

impl DetailsResolver {
    pub fn new(fetcher: Box<dyn PageFetcher>, cache: DetailsCache, base_url: String) -> Self {
        Self {
            fetcher,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves one title to its Letterboxd details, or a confirmed absence.
    ///
    /// The cache is consulted first and any hit answers without network
    /// activity; every fresh outcome is written back under the same key.
    pub fn resolve(&mut self, title: &str, year: Option<u16>) -> Option<FilmDetails> {
        let key = film_cache_key(title, year);
        match self.cache.lookup(&key) {
            CacheLookup::Details(details) => {
                debug!("Cache hit for {key:?}");
                return Some(details);
            }
            CacheLookup::NoMatch => {
                debug!("Cached no-match for {key:?}");
                return None;
            }
            CacheLookup::Unattempted => {}
        }

        let outcome = self.resolve_uncached(title, year);
        self.cache.record(&key, outcome.clone());
        outcome
    }

    fn resolve_uncached(&self, title: &str, year: Option<u16>) -> Option<FilmDetails> {
        let slug = title_slug(title);
        if slug.is_empty() {
            info!("No usable slug for {title:?}, skipping lookup");
            return None;
        }

        // A year-qualified address is more specific, so it goes first and is
        // trusted without re-checking the page's own year.
        if let Some(year) = year {
            if let Some((page, url)) = self.try_film_page(&format!("{slug}-{year}")) {
                return Some(extract_details(&page, url));
            }
        }

        let Some((page, url)) = self.try_film_page(&slug) else {
            info!("No Letterboxd page found for {title:?}");
            return None;
        };
        let Some(wanted_year) = year else {
            return Some(extract_details(&page, url));
        };
        match extract_page_year(&page) {
            Some(page_year) if page_year != wanted_year => {
                self.resolve_with_article_variants(title, &slug, wanted_year, page_year)
            }
            // A page without a readable year is not rejected.
            _ => Some(extract_details(&page, url)),
        }
    }

    /// Letterboxd sometimes slugs a film with or without its leading
    /// article; the fixed variant order below decides ties. A page that
    /// loaded but still disagrees on year is discarded, not attached.
    fn resolve_with_article_variants(
        &self,
        title: &str,
        slug: &str,
        wanted_year: u16,
        page_year: u16,
    ) -> Option<FilmDetails> {
        let variants = [
            format!("the-{slug}-{wanted_year}"),
            format!("{}-{wanted_year}", slug.trim_start_matches("the-")),
        ];
        for variant in variants {
            let Some((page, url)) = self.try_film_page(&variant) else {
                continue;
            };
            if extract_page_year(&page) == Some(wanted_year) {
                return Some(extract_details(&page, url));
            }
        }
        warn!("Letterboxd year mismatch for {title}: wanted {wanted_year}, got {page_year}");
        None
    }

    fn try_film_page(&self, slug: &str) -> Option<(Html, String)> {
        let url = format!("{}/film/{}/", self.base_url, slug);
        match self.fetcher.fetch(&url) {
            Ok(body) => Some((Html::parse_document(&body), url)),
            Err(error) => {
                debug!("Letterboxd fetch failed for {url}: {error}");
                None
            }
        }
    }
}

fn select_first<'a>(page: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    page.select(&selector).next()
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Year a film page claims for itself, from the year-indexed link when
/// present, else the trailing parenthetical of the document title.
fn extract_page_year(page: &Html) -> Option<u16> {
    static HREF_RE: OnceLock<Regex> = OnceLock::new();
    let href_re = HREF_RE
        .get_or_init(|| Regex::new(r"/films/year/(\d{4})/").expect("year href pattern must parse"));
    if let Some(link) = select_first(page, "a[href*='/films/year/']") {
        if let Some(href) = link.value().attr("href") {
            if let Some(caps) = href_re.captures(href) {
                if let Ok(year) = caps[1].parse() {
                    return Some(year);
                }
            }
        }
    }

    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let title_re = TITLE_RE
        .get_or_init(|| Regex::new(r"\((\d{4})\)").expect("title year pattern must parse"));
    let title = select_first(page, "title").map(element_text)?;
    let caps = title_re.captures(&title)?;
    caps[1].parse().ok()
}

/// Pulls the metadata fields off a matched film page. Missing sub-fields
/// stay `None`; a partial page is still a match.
fn extract_details(page: &Html, letterboxd_url: String) -> FilmDetails {
    let title = select_first(page, "h1.headline-1")
        .map(element_text)
        .filter(|t| !t.is_empty());
    let director = select_first(page, "a[href*='/director/']")
        .map(element_text)
        .filter(|t| !t.is_empty());
    let rating = select_first(page, "meta[name='twitter:data2']")
        .and_then(|meta| meta.value().attr("content"))
        .and_then(decimal_token);
    let tagline = select_first(page, "h4.tagline")
        .map(element_text)
        .filter(|t| !t.is_empty());
    let description = select_first(page, "div.truncate")
        .map(element_text)
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().take(200).collect());
    let poster = select_first(page, "div.film-poster img")
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    FilmDetails {
        letterboxd_url,
        title,
        director,
        rating,
        tagline,
        description,
        poster,
    }
}

fn decimal_token(content: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[\d.]+").expect("rating pattern must parse"));
    re.find(content).map(|m| m.as_str().to_string())
}
