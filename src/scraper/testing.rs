//! In-memory [`HttpFetcher`] for exercising scrapers without a network.

use super::http::HttpFetcher;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned responses keyed by URL and counts every call. Unknown URLs
/// fail like an HTTP 404.
#[derive(Default)]
pub struct StubFetcher {
    json: HashMap<String, Value>,
    bytes: HashMap<String, Vec<u8>>,
    json_calls: AtomicUsize,
    downloads: AtomicUsize,
}

impl StubFetcher {
    pub fn with_json(mut self, url: &str, value: Value) -> Self {
        self.json.insert(url.to_string(), value);
        self
    }

    pub fn with_bytes(mut self, url: &str, data: &[u8]) -> Self {
        self.bytes.insert(url.to_string(), data.to_vec());
        self
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Every request, JSON or binary
    pub fn requests(&self) -> usize {
        self.json_calls() + self.downloads()
    }
}

impl HttpFetcher for StubFetcher {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        self.json
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("HTTP 404 for {url}"))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.bytes
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("HTTP 404 for {url}"))
    }
}
