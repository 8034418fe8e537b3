use super::error::ScrapeError;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Blocking network access used by scrapers and the texture store.
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and decode the body as JSON
    fn get_json(&self, url: &str) -> Result<Value>;

    /// GET `url` and return the raw body
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Request to {} failed: HTTP {}",
                url,
                response.status()
            ));
        }

        Ok(response)
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get_json(&self, url: &str) -> Result<Value> {
        debug!("Fetching JSON: {}", url);
        self.get(url)?
            .json::<Value>()
            .with_context(|| format!("Failed to parse JSON from {url}"))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading: {}", url);
        let data = self
            .get(url)?
            .bytes()
            .with_context(|| format!("Failed to read body of {url}"))?
            .to_vec();
        Ok(data)
    }
}

/// Fetches `url` and decodes it into `T`; any failure is an API error.
pub(crate) fn fetch_json<T: DeserializeOwned>(
    fetcher: &dyn HttpFetcher,
    url: &str,
) -> Result<T, ScrapeError> {
    let value = fetcher
        .get_json(url)
        .map_err(|e| ScrapeError::Api(format!("{e:#}")))?;
    serde_json::from_value(value)
        .map_err(|e| ScrapeError::Api(format!("Unexpected response from {url}: {e}")))
}
