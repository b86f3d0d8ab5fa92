//! Blocking HTTP plumbing shared by the theater scrapers and the Letterboxd
//! resolver.
//!
//! Every outbound request goes through one `ureq` agent with bounded
//! timeouts. Transport failures and non-success statuses surface as
//! `Err(String)` so callers can downgrade them to a skipped source or a
//! failed lookup strategy instead of aborting the run.

use std::io::Read;
use std::time::Duration;

use crate::config::HttpConfig;

/// Browser-like identification sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";

/// Builds the blocking agent used for every outbound request.
pub fn build_agent(http: &HttpConfig) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(http.connect_timeout_secs))
        .timeout_read(Duration::from_secs(http.io_timeout_secs))
        .timeout_write(Duration::from_secs(http.io_timeout_secs))
        .build()
}

/// Seam over page fetching so lookup logic can be exercised offline.
pub trait PageFetcher {
    /// Returns the response body of a successful request, an error string
    /// for any transport failure or non-success status.
    fn fetch(&self, url: &str) -> Result<String, String>;
}

/// Live fetcher backed by a shared `ureq` agent.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(agent: ureq::Agent, user_agent: String) -> Self {
        Self { agent, user_agent }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, String> {
        let response = self
            .agent
            .get(url)
            .set("User-Agent", &self.user_agent)
            .call()
            .map_err(|error| format!("Request failed: {error}"))?;
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|error| format!("Failed to read response: {error}"))?;
        Ok(body)
    }
}

/// Fetches a URL and parses the body as JSON.
pub fn fetch_json(fetcher: &dyn PageFetcher, url: &str) -> Result<serde_json::Value, String> {
    let body = fetcher.fetch(url)?;
    serde_json::from_str(&body).map_err(|error| format!("Invalid JSON response: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{fetch_json, PageFetcher};

    struct CannedFetcher(&'static str);

    impl PageFetcher for CannedFetcher {
        fn fetch(&self, _url: &str) -> Result<String, String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_fetch_json_parses_body() {
        let fetcher = CannedFetcher(r#"{"presentations": []}"#);
        let value = fetch_json(&fetcher, "https://example.com/api").expect("valid json");
        assert!(value["presentations"].as_array().is_some());
    }

    #[test]
    fn test_fetch_json_reports_malformed_body() {
        let fetcher = CannedFetcher("<html>maintenance page</html>");
        let error = fetch_json(&fetcher, "https://example.com/api").unwrap_err();
        assert!(error.contains("Invalid JSON"));
    }
}
