mod error;
pub(crate) mod http;
mod metadata;
pub mod polyhaven;
pub mod polyhaven_hdri;
pub mod polyhaven_texture;
mod provider;
mod store;
#[doc(hidden)]
pub mod testing;
mod types;

pub use error::ScrapeError;
pub use http::{HttpFetcher, ReqwestFetcher};
pub use metadata::AssetMetadata;
pub use provider::{Scraper, ScraperCore, ScraperFactory};
pub use store::{url_extension, TextureStore};
pub use types::{
    parse_variant_label, variant_label, AssetData, AssetKind, ScraperInfo, VariantDescriptor,
};

use polyhaven_hdri::PolyHavenHdriFactory;
use polyhaven_texture::PolyHavenTextureFactory;
use std::sync::Arc;
use tracing::{debug, info};

/// Known providers, in dispatch priority order.
pub struct ScraperRegistry {
    factories: Vec<Arc<dyn ScraperFactory>>,
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Registry with every built-in provider.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        // HDRI first: both Poly Haven scrapers accept the same page URLs
        registry.register(Arc::new(PolyHavenHdriFactory));
        registry.register(Arc::new(PolyHavenTextureFactory));

        info!("Scraper registry initialized with {} providers", registry.len());
        registry
    }

    /// Appends a provider. Returns `false` if one with the same id is already
    /// registered; the registry is left unchanged in that case.
    pub fn register(&mut self, factory: Arc<dyn ScraperFactory>) -> bool {
        let id = factory.info().id;
        if self.factories.iter().any(|f| f.info().id == id) {
            debug!("Scraper {} already registered", id);
            return false;
        }
        debug!("Registered scraper {}", id);
        self.factories.push(factory);
        true
    }

    /// First registered provider claiming `url`.
    pub fn find_for_url(&self, url: &str) -> Option<Arc<dyn ScraperFactory>> {
        self.candidates(url, None).into_iter().next()
    }

    /// Every provider claiming `url`, optionally restricted to one asset kind,
    /// in registration order.
    pub fn candidates(&self, url: &str, kind: Option<AssetKind>) -> Vec<Arc<dyn ScraperFactory>> {
        self.list(kind)
            .into_iter()
            .filter(|f| f.can_handle_url(url))
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Arc<dyn ScraperFactory>> {
        self.factories.iter().find(|f| f.info().id == id).cloned()
    }

    /// Providers scraping `kind` (all of them for `None`), in registration order.
    pub fn list(&self, kind: Option<AssetKind>) -> Vec<Arc<dyn ScraperFactory>> {
        self.factories
            .iter()
            .filter(|f| kind.is_none_or(|k| f.handles(k)))
            .cloned()
            .collect()
    }

    /// Builds a scraper for `url` from the first matching provider.
    pub fn open(&self, url: &str, store: TextureStore) -> Result<Box<dyn Scraper>, ScrapeError> {
        let factory = self
            .find_for_url(url)
            .ok_or_else(|| ScrapeError::UnsupportedProvider(url.to_string()))?;
        debug!("Dispatching {} to {}", url, factory.info().id);
        Ok(factory.create(store))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
