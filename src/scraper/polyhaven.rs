//! Pieces shared by the Poly Haven scrapers.

use super::{error::ScrapeError, http::fetch_json, http::HttpFetcher};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

pub const API_BASE: &str = "https://api.polyhaven.com";
pub const PAGE_PREFIX: &str = "https://polyhaven.com/a/";

/// Type codes reported by the info endpoint
pub const TYPE_HDRI: i64 = 0;
pub const TYPE_TEXTURE: i64 = 1;

static ASSET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https://)?polyhaven\.com/a/([^/?#]+)").expect("asset URL pattern is valid")
});

#[derive(Debug, Deserialize)]
pub struct AssetInfo {
    #[serde(rename = "type")]
    pub kind: i64,
    pub name: String,
}

/// Asset slug from a page URL such as `https://polyhaven.com/a/<slug>`.
pub fn asset_id(url: &str) -> Option<String> {
    ASSET_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn can_handle_url(url: &str) -> bool {
    url.starts_with(PAGE_PREFIX)
}

pub fn url_from_name(asset_name: &str) -> String {
    let slug = asset_name.to_lowercase().replace(' ', "_").replace('\'', "");
    format!("{PAGE_PREFIX}{slug}")
}

pub fn thumbnail_url(id: &str) -> String {
    format!("https://cdn.polyhaven.com/asset_img/thumbs/{id}.png?width=512&height=512")
}

pub fn files_url(id: &str) -> String {
    format!("{API_BASE}/files/{id}")
}

/// Queries the info endpoint and checks the declared asset type.
pub fn fetch_info(
    fetcher: &dyn HttpFetcher,
    id: &str,
    expected_type: i64,
    expected: &'static str,
) -> Result<AssetInfo, ScrapeError> {
    let info: AssetInfo = fetch_json(fetcher, &format!("{API_BASE}/info/{id}"))?;
    if info.kind != expected_type {
        return Err(ScrapeError::NotSupportedAssetType {
            expected,
            found: format!("type {}", info.kind),
        });
    }
    Ok(info)
}
