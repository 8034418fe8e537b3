//! Two-step import: list the variants of a URL, let the caller choose, then
//! fetch the choice with the same scraper instance.

use crate::scraper::{
    AssetData, AssetKind, ScrapeError, Scraper, ScraperRegistry, TextureStore,
};
use tracing::{info, warn};

/// An in-progress import, threaded by the caller between the variant listing
/// and the fetch of the selected variant.
pub struct ImportSession {
    scraper: Box<dyn Scraper>,
    variants: Vec<String>,
}

impl ImportSession {
    /// Tries each provider claiming `url` (restricted to `kind` if given) in
    /// registration order. A provider reporting an incompatible asset type
    /// hands over to the next one; any other failure is returned as is.
    pub fn open(
        registry: &ScraperRegistry,
        store: &TextureStore,
        url: &str,
        kind: Option<AssetKind>,
    ) -> Result<Self, ScrapeError> {
        let candidates = registry.candidates(url, kind);
        if candidates.is_empty() {
            return Err(ScrapeError::UnsupportedProvider(url.to_string()));
        }

        let mut last_error = None;
        for factory in candidates {
            info!("Resolving {} with {}", url, factory.info().source_name);
            match Self::from_scraper(factory.create(store.clone()), url) {
                Ok(session) => return Ok(session),
                Err(e @ ScrapeError::NotSupportedAssetType { .. }) => {
                    warn!("{} skipped: {}", factory.info().id, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ScrapeError::UnsupportedProvider(url.to_string())))
    }

    /// Lists the variants of `url` with an existing scraper.
    pub fn from_scraper(mut scraper: Box<dyn Scraper>, url: &str) -> Result<Self, ScrapeError> {
        let variants = scraper.variant_list(url)?;
        Ok(Self { scraper, variants })
    }

    pub fn scraper(&self) -> &dyn Scraper {
        self.scraper.as_ref()
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn is_downloaded(&self, label: &str) -> bool {
        self.scraper.is_downloaded(label)
    }

    /// Picks a variant without prompting: the only one if there is at most
    /// one, otherwise the one labelled `name`.
    pub fn select(&self, name: Option<&str>) -> Option<usize> {
        if self.variants.len() <= 1 {
            return Some(0);
        }
        let name = name?;
        self.variants.iter().position(|v| v == name)
    }

    /// Fetches variant `index`, its thumbnail, and persists the metadata next
    /// to the downloaded files.
    pub fn fetch(&mut self, index: usize) -> Result<AssetData, ScrapeError> {
        let mut out = AssetData::default();
        self.scraper.fetch_variant(index, &mut out)?;

        if let Some(url) = self.scraper.thumbnail_url() {
            let relative_dir = self.scraper.relative_dir();
            match self.scraper.store().fetch_image(&url, &relative_dir, "thumbnail") {
                Ok(path) => {
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned());
                    self.scraper.core_mut().metadata.thumbnail = file_name;
                }
                Err(e) => warn!("Failed to fetch thumbnail {}: {}", url, e),
            }
        }

        self.scraper.save_metadata()?;
        info!("Imported {}", out.name);
        Ok(out)
    }
}
