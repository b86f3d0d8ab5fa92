//! Scraper for the Logan Theatre.
//!
//! The homepage carries loosely structured movie cards; anything with a
//! heading and at least one showtime counts, navigation blocks are skipped
//! by title.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{error, info};
use scraper::{Html, Selector};

use crate::fetch::PageFetcher;
use crate::protocol::{Screening, Theater};

use super::{absolute_url, clean_text, element_text, find_showtimes, parse_month_day, TheaterScraper};

const THEATER: Theater = Theater {
    name: "Logan Theatre",
    url: "https://thelogantheatre.com",
    address: "2646 N Milwaukee Ave",
};

const NAV_TITLES: [&str; 6] = ["movies", "events", "membership", "food", "drink", "info"];

pub struct LoganScraper;

impl TheaterScraper for LoganScraper {
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
        let screenings = parse_homepage(&body, today);
        info!("{}: Found {} screenings", THEATER.name, screenings.len());
        screenings
    }
}

fn parse_homepage(html: &str, today: NaiveDate) -> Vec<Screening> {
    let doc = Html::parse_document(html);
    let Ok(container_sel) = Selector::parse(
        "div[class*='movie'], div[class*='film'], div[class*='show'], \
         article[class*='movie'], article[class*='film'], article[class*='show']",
    ) else {
        return Vec::new();
    };
    let Ok(heading_sel) = Selector::parse("h2, h3, h4") else {
        return Vec::new();
    };
    let Ok(date_sel) = Selector::parse("[class*='date']") else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut screenings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for container in doc.select(&container_sel) {
        let Some(heading) = container.select(&heading_sel).next() else {
            continue;
        };
        let title = clean_text(&element_text(heading));
        if title.len() < 2 || NAV_TITLES.contains(&title.to_lowercase().as_str()) {
            continue;
        }
        if !seen.insert(title.clone()) {
            continue;
        }

        let text = element_text(container);
        let times = find_showtimes(&text);
        if times.is_empty() {
            continue;
        }

        let date = container
            .select(&date_sel)
            .next()
            .map(element_text)
            .and_then(|t| parse_month_day(&t, today))
            .unwrap_or(today);

        let ticket_url = container
            .select(&link_sel)
            .next()
            .and_then(|link| link.value().attr("href"))
            .map(|href| absolute_url(THEATER.url, href))
            .unwrap_or_else(|| THEATER.url.to_string());

        let mut screening = Screening::at(&THEATER, title, date);
        screening.times = times;
        screening.ticket_url = ticket_url;
        screenings.push(screening);
    }
    screenings
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::parse_homepage;

    const HOMEPAGE: &str = r#"
<html><body>
  <div class="movie-card">
    <h3>The Conversation</h3>
    <span class="showdate">Feb 9</span>
    <a href="/movies/the-conversation">Tickets</a>
    <p>4:30pm 7:00pm 9:45pm</p>
  </div>
  <div class="movie-card">
    <h3>Movies</h3>
    <p>7:00pm</p>
  </div>
  <div class="film-strip">
    <h3>Coming Soon</h3>
    <p>No times listed yet</p>
  </div>
</body></html>
"#;

    #[test]
    fn test_parse_homepage_keeps_cards_with_times_and_skips_nav() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
        let screenings = parse_homepage(HOMEPAGE, today);

        assert_eq!(screenings.len(), 1);
        let conversation = &screenings[0];
        assert_eq!(conversation.title, "The Conversation");
        assert_eq!(
            conversation.date,
            NaiveDate::from_ymd_opt(2026, 2, 9).expect("valid date")
        );
        assert_eq!(conversation.times, ["4:30 PM", "7:00 PM", "9:45 PM"]);
        assert_eq!(
            conversation.ticket_url,
            "https://thelogantheatre.com/movies/the-conversation"
        );
    }

    #[test]
    fn test_dateless_card_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
        let html = r#"<div class="show-listing"><h2>Late Show</h2><p>11:59pm</p></div>"#;
        let screenings = parse_homepage(html, today);

        assert_eq!(screenings.len(), 1);
        assert_eq!(screenings[0].date, today);
        assert_eq!(screenings[0].ticket_url, "https://thelogantheatre.com");
    }
}
