use super::{
    error::ScrapeError,
    http::fetch_json,
    polyhaven,
    provider::{Scraper, ScraperCore, ScraperFactory},
    store::TextureStore,
    types::{parse_variant_label, variant_label, AssetData, AssetKind, ScraperInfo, VariantDescriptor},
};
use crate::utils::{natural::sort_key, sanitize_component};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub static INFO: ScraperInfo = ScraperInfo {
    id: "polyhaven-hdri",
    source_name: "Poly Haven HDRI",
    home_url: "https://polyhaven.com/hdris",
    home_dir: "hdrihaven",
    metadata_filename: "metadata.json",
    scraped_types: &[AssetKind::World],
};

const VARIANT_DATA: &str = "variant_data";

/// Map slot holding the environment image
pub const SKY_SLOT: &str = "sky";

#[derive(Debug, Deserialize)]
struct FileEntry {
    url: String,
}

#[derive(Debug, Deserialize)]
struct HdriFiles {
    hdri: BTreeMap<String, BTreeMap<String, FileEntry>>,
}

pub struct PolyHavenHdriFactory;

impl ScraperFactory for PolyHavenHdriFactory {
    fn info(&self) -> &'static ScraperInfo {
        &INFO
    }

    fn can_handle_url(&self, url: &str) -> bool {
        polyhaven::can_handle_url(url)
    }

    fn url_from_name(&self, asset_name: &str) -> String {
        polyhaven::url_from_name(asset_name)
    }

    fn create(&self, store: TextureStore) -> Box<dyn Scraper> {
        Box::new(PolyHavenHdriScraper::new(store))
    }
}

pub struct PolyHavenHdriScraper {
    core: ScraperCore,
}

impl PolyHavenHdriScraper {
    pub fn new(store: TextureStore) -> Self {
        Self {
            core: ScraperCore::new(store),
        }
    }

    fn resolve_variants(&mut self, url: &str) -> Result<Vec<String>, ScrapeError> {
        self.core.metadata.variants.clear();
        self.core.metadata.custom.remove(VARIANT_DATA);

        let id = polyhaven::asset_id(url).ok_or_else(|| ScrapeError::BadUrl(url.to_string()))?;

        let fetcher = self.core.store.fetcher();
        let asset = polyhaven::fetch_info(fetcher, &id, polyhaven::TYPE_HDRI, "hdri")?;
        let files: HdriFiles = fetch_json(fetcher, &polyhaven::files_url(&id))?;

        let mut by_pair: BTreeMap<(String, String), String> = BTreeMap::new();
        for (resolution, formats) in files.hdri {
            for (format, entry) in formats {
                by_pair.insert((resolution.clone(), format), entry.url);
            }
        }

        let mut descriptors: Vec<VariantDescriptor> = by_pair
            .into_iter()
            .map(|((resolution, format), url)| VariantDescriptor {
                resolution,
                format,
                url,
            })
            .collect();
        descriptors.sort_by_cached_key(|d| sort_key(&format!("{} {}", d.url, d.resolution)));

        let variants: Vec<String> = descriptors
            .iter()
            .map(|d| variant_label(&d.resolution, &d.format))
            .collect();

        info!("Found {} variants for HDRI {}", variants.len(), id);

        let metadata = &mut self.core.metadata;
        metadata.set_custom(VARIANT_DATA, &descriptors)?;
        metadata.name = sanitize_component(&asset.name);
        metadata.id = id;
        metadata.fetch_url = url.to_string();
        metadata.variants = variants.clone();

        Ok(variants)
    }

    fn fetch_selected(&mut self, index: usize, out: &mut AssetData) -> Result<(), ScrapeError> {
        let metadata = &self.core.metadata;
        let count = metadata.variants.len();
        let invalid = || ScrapeError::InvalidVariantIndex { index, count };

        let label = metadata.variants.get(index).ok_or_else(invalid)?;
        let descriptors: Vec<VariantDescriptor> =
            metadata.custom(VARIANT_DATA).ok_or_else(invalid)?;
        let descriptor = descriptors.get(index).ok_or_else(invalid)?;

        let name = format!("{}/{}/{}", INFO.home_dir, metadata.name, label);
        let path = self
            .core
            .store
            .fetch_image(&descriptor.url, self.relative_dir(), &descriptor.resolution)?;

        debug!("HDRI variant {} stored at {}", label, path.display());
        self.core
            .metadata
            .maps
            .insert(SKY_SLOT.to_string(), path.clone());
        out.name = name;
        out.maps.insert(SKY_SLOT.to_string(), path);
        Ok(())
    }
}

impl Scraper for PolyHavenHdriScraper {
    fn info(&self) -> &'static ScraperInfo {
        &INFO
    }

    fn core(&self) -> &ScraperCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ScraperCore {
        &mut self.core
    }

    fn variant_list(&mut self, url: &str) -> Result<Vec<String>, ScrapeError> {
        let result = self.resolve_variants(url);
        self.core.record(result)
    }

    fn fetch_variant(&mut self, index: usize, out: &mut AssetData) -> Result<(), ScrapeError> {
        let result = self.fetch_selected(index, out);
        self.core.record(result)
    }

    fn thumbnail_url(&self) -> Option<String> {
        let id = &self.core.metadata.id;
        (!id.is_empty()).then(|| polyhaven::thumbnail_url(id))
    }

    fn is_downloaded(&self, label: &str) -> bool {
        if self.core.metadata.name.is_empty() {
            return false;
        }
        let Some((resolution, format)) = parse_variant_label(label) else {
            return false;
        };
        self.asset_dir()
            .join(format!("{resolution}.{format}"))
            .is_file()
    }
}
