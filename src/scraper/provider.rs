use super::{
    error::ScrapeError,
    metadata::AssetMetadata,
    store::TextureStore,
    types::{AssetData, AssetKind, ScraperInfo},
};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Provider-level entry point: recognizes URLs and builds scraper instances.
pub trait ScraperFactory: Send + Sync {
    fn info(&self) -> &'static ScraperInfo;

    /// Pure string test on the URL shape; never touches the network.
    fn can_handle_url(&self, url: &str) -> bool;

    /// Best-effort guess of the asset page URL from a human-readable name
    fn url_from_name(&self, asset_name: &str) -> String;

    fn create(&self, store: TextureStore) -> Box<dyn Scraper>;

    fn handles(&self, kind: AssetKind) -> bool {
        self.info().scraped_types.contains(&kind)
    }
}

/// One asset lookup against a provider.
///
/// `variant_list` must succeed before `fetch_variant` is called on the same
/// instance, since it records the per-variant download descriptors in the
/// metadata.
pub trait Scraper: Send {
    fn info(&self) -> &'static ScraperInfo;

    fn core(&self) -> &ScraperCore;

    fn core_mut(&mut self) -> &mut ScraperCore;

    /// Resolves `url` and returns the ordered variant labels. An empty list is
    /// a valid answer.
    fn variant_list(&mut self, url: &str) -> Result<Vec<String>, ScrapeError>;

    /// Downloads (or reuses) the files of the selected variant and fills `out`.
    /// `out` is left untouched on failure.
    fn fetch_variant(&mut self, index: usize, out: &mut AssetData) -> Result<(), ScrapeError>;

    /// Preview image URL derived from the known asset id.
    fn thumbnail_url(&self) -> Option<String>;

    /// Whether the files of `label` are already on disk. No network access.
    fn is_downloaded(&self, label: &str) -> bool;

    fn metadata(&self) -> &AssetMetadata {
        &self.core().metadata
    }

    /// Message of the last failed operation, cleared by the next success.
    fn error(&self) -> Option<&str> {
        self.core().error()
    }

    fn store(&self) -> &TextureStore {
        &self.core().store
    }

    /// Asset directory relative to the texture root.
    fn relative_dir(&self) -> PathBuf {
        Path::new(self.info().home_dir).join(&self.metadata().name)
    }

    fn asset_dir(&self) -> PathBuf {
        self.store().texture_directory(self.relative_dir())
    }

    fn metadata_path(&self) -> PathBuf {
        self.asset_dir().join(self.info().metadata_filename)
    }

    /// Replaces the in-memory metadata with a previously saved record, so
    /// `is_downloaded` and `fetch_variant` work without a network round-trip.
    fn load_metadata(&mut self, path: &Path) -> Result<(), ScrapeError> {
        let result = AssetMetadata::load(path);
        let metadata = self.core_mut().record(result)?;
        self.core_mut().metadata = metadata;
        Ok(())
    }

    fn save_metadata(&mut self) -> Result<(), ScrapeError> {
        let path = self.metadata_path();
        let result = self.metadata().save(&path);
        self.core_mut().record(result)
    }
}

/// State every scraper instance carries.
#[derive(Debug)]
pub struct ScraperCore {
    pub metadata: AssetMetadata,
    pub store: TextureStore,
    error: Option<String>,
}

impl ScraperCore {
    pub fn new(store: TextureStore) -> Self {
        Self {
            metadata: AssetMetadata::default(),
            store,
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Remembers the outcome of an operation for later display.
    pub fn record<T>(&mut self, result: Result<T, ScrapeError>) -> Result<T, ScrapeError> {
        match &result {
            Ok(_) => self.error = None,
            Err(e) => {
                warn!("Scraper operation failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
        result
    }
}
