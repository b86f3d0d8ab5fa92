mod config;
mod enrichment_manager;
mod fetch;
mod letterboxd;
mod output;
mod protocol;
mod scrapers;

use log::{error, info};

use config::Config;
use fetch::HttpFetcher;
use letterboxd::{DetailsCache, DetailsResolver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let config = Config::load();
    let agent = fetch::build_agent(&config.http);
    let fetcher = HttpFetcher::new(agent, config.http.user_agent.clone());
    let today = chrono::Local::now().date_naive();

    let mut screenings = Vec::new();
    for scraper in scrapers::enabled_scrapers(&config.scrapers) {
        screenings.extend(scraper.scrape(&fetcher, today));
    }
    info!("Scraped {} screenings total", screenings.len());

    let cache = DetailsCache::load(config.letterboxd.cache_path());
    if !cache.is_empty() {
        info!("Loaded {} cached Letterboxd entries", cache.len());
    }
    let mut resolver = DetailsResolver::new(
        Box::new(fetcher),
        cache,
        config.letterboxd.base_url.clone(),
    );
    let screenings = enrichment_manager::enrich_screenings(&mut resolver, screenings);

    if let Err(err) = output::write_screenings(&config.output.file, &screenings) {
        error!("{err}");
        return Err(err.into());
    }
    info!(
        "Wrote {} screenings to {}",
        screenings.len(),
        config.output.file.display()
    );
    Ok(())
}
