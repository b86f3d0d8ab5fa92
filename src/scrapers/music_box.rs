//! Scraper for the Music Box Theatre calendar.
//!
//! Each showtime block carries its date and times as one text run; the film
//! link lives on the enclosing card, so the block walks up to the nearest
//! container the way the calendar is actually nested.

use std::sync::OnceLock;

use chrono::NaiveDate;
use log::{error, info};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::fetch::PageFetcher;
use crate::protocol::{Screening, Theater};

use super::{absolute_url, clean_text, element_text, find_showtimes, parse_month_day, TheaterScraper};

const THEATER: Theater = Theater {
    name: "Music Box Theatre",
    url: "https://musicboxtheatre.com",
    address: "3733 N Southport Ave",
};

fn format_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(35mm|70mm|16mm|3D DCP|DCP)\b").expect("format pattern must parse")
    })
}

pub struct MusicBoxScraper;

impl TheaterScraper for MusicBoxScraper {
    fn name(&self) -> &'static str {
        THEATER.name
    }

    fn scrape(&self, fetcher: &dyn PageFetcher, today: NaiveDate) -> Vec<Screening> {
        let url = format!("{}/calendar", THEATER.url);
        let body = match fetcher.fetch(&url) {
            Ok(body) => body,
            Err(err) => {
                error!("Failed to fetch {}: {}", THEATER.name, err);
                return Vec::new();
            }
        };
        let screenings = parse_calendar(&body, today);
        info!("{}: Found {} screenings", THEATER.name, screenings.len());
        screenings
    }
}

fn parse_calendar(html: &str, today: NaiveDate) -> Vec<Screening> {
    let doc = Html::parse_document(html);
    let Ok(block_sel) = Selector::parse(".programming-showtimes") else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse("a[href*='/films-and-events/']") else {
        return Vec::new();
    };

    let mut screenings = Vec::new();
    for block in doc.select(&block_sel) {
        let text = element_text(block);
        let Some(date) = parse_month_day(&text, today) else {
            continue;
        };
        let times = find_showtimes(&text);
        if times.is_empty() {
            continue;
        }

        // Nearest enclosing card, mirroring how the title link is nested
        // relative to the showtime block.
        let Some(card) = block
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| matches!(el.value().name(), "div" | "article" | "li"))
        else {
            continue;
        };
        let Some(link) = card.select(&link_sel).next() else {
            continue;
        };
        let title = clean_text(&element_text(link));
        if title.len() < 3 {
            continue;
        }
        let ticket_url = link
            .value()
            .attr("href")
            .map(|href| absolute_url(THEATER.url, href))
            .unwrap_or_else(|| THEATER.url.to_string());

        let card_text = element_text(card);
        let format = format_re()
            .find(&card_text)
            .map(|m| m.as_str().to_string());

        let mut screening = Screening::at(&THEATER, title, date);
        screening.times = times;
        screening.format = format;
        screening.ticket_url = ticket_url;
        screenings.push(screening);
    }
    screenings
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::parse_calendar;

    const CALENDAR: &str = r#"
<html><body>
  <li class="calendar-card">
    <a href="/films-and-events/playtime-70mm">
      <h4>Playtime</h4>
    </a>
    <span class="badge">70mm</span>
    <div class="programming-showtimes">Sat, Feb 7 11:30am / 7:00pm</div>
  </li>
  <li class="calendar-card">
    <a href="/films-and-events/the-third-man">
      <h4>The Third Man</h4>
    </a>
    <div class="programming-showtimes">Sun, Feb 8 2:00pm</div>
  </li>
  <li class="calendar-card">
    <div class="programming-showtimes">No date in this block at all</div>
  </li>
</body></html>
"#;

    #[test]
    fn test_parse_calendar_extracts_dated_screenings() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
        let screenings = parse_calendar(CALENDAR, today);

        assert_eq!(screenings.len(), 2);

        let playtime = &screenings[0];
        assert_eq!(playtime.title, "Playtime");
        assert_eq!(
            playtime.date,
            NaiveDate::from_ymd_opt(2026, 2, 7).expect("valid date")
        );
        assert_eq!(playtime.times, ["11:30 AM", "7:00 PM"]);
        assert_eq!(playtime.format.as_deref(), Some("70mm"));
        assert_eq!(
            playtime.ticket_url,
            "https://musicboxtheatre.com/films-and-events/playtime-70mm"
        );
        assert_eq!(playtime.theater, "Music Box Theatre");

        let third_man = &screenings[1];
        assert_eq!(third_man.title, "The Third Man");
        assert_eq!(third_man.times, ["2:00 PM"]);
        assert_eq!(third_man.format, None);
    }
}
