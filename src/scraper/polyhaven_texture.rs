use super::{
    error::ScrapeError,
    http::fetch_json,
    polyhaven,
    provider::{Scraper, ScraperCore, ScraperFactory},
    store::TextureStore,
    types::{parse_variant_label, variant_label, AssetData, AssetKind, ScraperInfo},
};
use crate::utils::{natural::sort_key, sanitize_component};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub static INFO: ScraperInfo = ScraperInfo {
    id: "polyhaven-texture",
    source_name: "Poly Haven Textures",
    home_url: "https://polyhaven.com/textures",
    home_dir: "polyhaven",
    metadata_filename: "metadata.json",
    scraped_types: &[AssetKind::Material],
};

const VARIANT_DATA: &str = "variant_data";

/// Provider map name to material slot. The first entry decides which
/// (resolution, format) pairs exist.
const MAP_SLOTS: &[(&str, &str)] = &[
    ("Diffuse", "baseColor"),
    ("nor_gl", "normal"),
    ("Rough", "roughness"),
    ("Displacement", "height"),
    ("AO", "ambientOcclusion"),
    ("Metal", "metallic"),
];

type FilesByResolution = BTreeMap<String, BTreeMap<String, FileEntry>>;

#[derive(Debug, Deserialize)]
struct FileEntry {
    url: String,
}

/// Every map of one (resolution, format) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureVariant {
    pub resolution: String,
    pub format: String,
    /// Slot name to download URL
    pub maps: BTreeMap<String, String>,
}

impl TextureVariant {
    fn base_name(&self, slot: &str) -> String {
        format!("{}_{}", self.resolution, slot)
    }
}

pub struct PolyHavenTextureFactory;

impl ScraperFactory for PolyHavenTextureFactory {
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
        Box::new(PolyHavenTextureScraper::new(store))
    }
}

pub struct PolyHavenTextureScraper {
    core: ScraperCore,
}

impl PolyHavenTextureScraper {
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
        let asset = polyhaven::fetch_info(fetcher, &id, polyhaven::TYPE_TEXTURE, "texture")?;
        let files: BTreeMap<String, Value> = fetch_json(fetcher, &polyhaven::files_url(&id))?;

        let mut by_slot: Vec<(&str, FilesByResolution)> = Vec::new();
        for (map_name, slot) in MAP_SLOTS {
            let Some(value) = files.get(*map_name) else {
                continue;
            };
            let parsed: FilesByResolution = serde_json::from_value(value.clone()).map_err(|e| {
                ScrapeError::Api(format!("Unexpected {map_name} entry for {id}: {e}"))
            })?;
            by_slot.push((*slot, parsed));
        }

        let mut variants_data: Vec<TextureVariant> = Vec::new();
        if let Some((_, primary)) = by_slot.first() {
            for (resolution, formats) in primary {
                for format in formats.keys() {
                    let maps = by_slot
                        .iter()
                        .filter_map(|(slot, slot_files)| {
                            let entry = slot_files.get(resolution)?.get(format)?;
                            Some((slot.to_string(), entry.url.clone()))
                        })
                        .collect();
                    variants_data.push(TextureVariant {
                        resolution: resolution.clone(),
                        format: format.clone(),
                        maps,
                    });
                }
            }
        } else {
            warn!("Texture {} has no diffuse map", id);
        }

        let primary_slot = MAP_SLOTS[0].1;
        variants_data.sort_by_cached_key(|v| {
            let url = v.maps.get(primary_slot).map(String::as_str).unwrap_or_default();
            sort_key(&format!("{} {}", url, v.resolution))
        });

        let variants: Vec<String> = variants_data
            .iter()
            .map(|v| variant_label(&v.resolution, &v.format))
            .collect();

        info!("Found {} variants for texture {}", variants.len(), id);

        let metadata = &mut self.core.metadata;
        metadata.set_custom(VARIANT_DATA, &variants_data)?;
        metadata.name = sanitize_component(&asset.name);
        metadata.id = id;
        metadata.fetch_url = url.to_string();
        metadata.variants = variants.clone();

        Ok(variants)
    }

    fn variant_data(&self) -> Vec<TextureVariant> {
        self.core.metadata.custom(VARIANT_DATA).unwrap_or_default()
    }

    fn fetch_selected(&mut self, index: usize, out: &mut AssetData) -> Result<(), ScrapeError> {
        let count = self.core.metadata.variants.len();
        let invalid = || ScrapeError::InvalidVariantIndex { index, count };

        let label = self.core.metadata.variants.get(index).ok_or_else(invalid)?.clone();
        let variant = self.variant_data().into_iter().nth(index).ok_or_else(invalid)?;

        let relative_dir = self.relative_dir();
        let mut maps = BTreeMap::new();
        for (slot, url) in &variant.maps {
            let path = self
                .core
                .store
                .fetch_image(url, &relative_dir, &variant.base_name(slot))?;
            debug!("Texture map {} stored at {}", slot, path.display());
            maps.insert(slot.clone(), path);
        }

        self.core.metadata.maps = maps.clone();
        out.name = format!("{}/{}/{}", INFO.home_dir, self.core.metadata.name, label);
        out.maps = maps;
        Ok(())
    }
}

impl Scraper for PolyHavenTextureScraper {
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
        let Some(variant) = self
            .variant_data()
            .into_iter()
            .find(|v| v.resolution == resolution && v.format == format)
        else {
            return false;
        };

        let store = self.store();
        let relative_dir = self.relative_dir();
        !variant.maps.is_empty()
            && variant.maps.iter().all(|(slot, url)| {
                store
                    .image_path(url, &relative_dir, &variant.base_name(slot))
                    .is_file()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::testing::StubFetcher;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    const PAGE: &str = "https://polyhaven.com/a/rocky_trail";

    fn dl(map: &str, res: &str, fmt: &str) -> String {
        format!("https://dl.polyhaven.org/file/ph-assets/Textures/{fmt}/{res}/rocky_trail/rocky_trail_{map}_{res}.{fmt}")
    }

    fn stub() -> StubFetcher {
        let mut files = serde_json::Map::new();
        let mut fetcher = StubFetcher::default();
        for map in ["Diffuse", "nor_gl", "Rough"] {
            let mut by_res = serde_json::Map::new();
            for res in ["2k", "1k"] {
                let mut by_fmt = serde_json::Map::new();
                for fmt in ["jpg", "png"] {
                    // normal maps ship without jpg at 2k
                    if map == "nor_gl" && res == "2k" && fmt == "jpg" {
                        continue;
                    }
                    by_fmt.insert(fmt.to_string(), json!({"url": dl(map, res, fmt)}));
                    fetcher = fetcher.with_bytes(&dl(map, res, fmt), map.as_bytes());
                }
                by_res.insert(res.to_string(), Value::Object(by_fmt));
            }
            files.insert(map.to_string(), Value::Object(by_res));
        }
        files.insert(
            "blend".to_string(),
            json!({"1k": {"blend": {"url": "https://dl.polyhaven.org/rocky_trail_1k.blend", "include": {}}}}),
        );

        fetcher
            .with_json(
                "https://api.polyhaven.com/info/rocky_trail",
                json!({"type": 1, "name": "Rocky Trail"}),
            )
            .with_json(
                "https://api.polyhaven.com/files/rocky_trail",
                Value::Object(files),
            )
    }

    fn scraper(dir: &TempDir, fetcher: &Arc<StubFetcher>) -> PolyHavenTextureScraper {
        PolyHavenTextureScraper::new(TextureStore::new(dir.path(), fetcher.clone()))
    }

    #[test]
    fn test_variants_follow_diffuse_map() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(stub());
        let mut scraper = scraper(&dir, &fetcher);

        let variants = scraper.variant_list(PAGE).unwrap();
        assert_eq!(variants, vec!["1k (jpg)", "2k (jpg)", "1k (png)", "2k (png)"]);
        assert_eq!(scraper.metadata().name, "Rocky Trail");
    }

    #[test]
    fn test_hdri_asset_is_rejected() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(StubFetcher::default().with_json(
            "https://api.polyhaven.com/info/rocky_trail",
            json!({"type": 0, "name": "Rocky Trail"}),
        ));
        let mut scraper = scraper(&dir, &fetcher);

        let err = scraper.variant_list(PAGE).unwrap_err();
        assert!(matches!(err, ScrapeError::NotSupportedAssetType { expected: "texture", .. }));
        assert!(scraper.metadata().variants.is_empty());
    }

    #[test]
    fn test_fetch_variant_downloads_every_map() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(stub());
        let mut scraper = scraper(&dir, &fetcher);
        scraper.variant_list(PAGE).unwrap();

        let mut out = AssetData::default();
        scraper.fetch_variant(2, &mut out).unwrap();
        let asset_dir = dir.path().join("polyhaven/Rocky Trail");
        assert_eq!(out.name, "polyhaven/Rocky Trail/1k (png)");
        assert_eq!(out.maps.len(), 3);
        assert_eq!(out.maps["baseColor"], asset_dir.join("1k_baseColor.png"));
        assert_eq!(out.maps["normal"], asset_dir.join("1k_normal.png"));
        assert_eq!(out.maps["roughness"], asset_dir.join("1k_roughness.png"));
        assert_eq!(fetcher.downloads(), 3);
        assert!(scraper.is_downloaded("1k (png)"));
        assert!(!scraper.is_downloaded("1k (jpg)"));

        let mut again = AssetData::default();
        scraper.fetch_variant(2, &mut again).unwrap();
        assert_eq!(fetcher.downloads(), 3);
        assert_eq!(out, again);
    }

    #[test]
    fn test_missing_map_format_is_skipped() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(stub());
        let mut scraper = scraper(&dir, &fetcher);
        let variants = scraper.variant_list(PAGE).unwrap();
        let index = variants.iter().position(|v| v == "2k (jpg)").unwrap();

        let mut out = AssetData::default();
        scraper.fetch_variant(index, &mut out).unwrap();
        assert!(out.maps.contains_key("baseColor"));
        assert!(!out.maps.contains_key("normal"));
        assert!(scraper.is_downloaded("2k (jpg)"));
    }

    #[test]
    fn test_invalid_index() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(stub());
        let mut scraper = scraper(&dir, &fetcher);
        scraper.variant_list(PAGE).unwrap();

        let mut out = AssetData::default();
        let err = scraper.fetch_variant(4, &mut out).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidVariantIndex { index: 4, count: 4 }));
        assert_eq!(out, AssetData::default());
        assert!(scraper.error().is_some());
    }

    #[test]
    fn test_failed_relisting_drops_previous_variants() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(stub());
        let mut scraper = scraper(&dir, &fetcher);
        scraper.variant_list(PAGE).unwrap();

        assert!(scraper.variant_list("https://polyhaven.com/a/unknown_asset").is_err());
        assert!(scraper.metadata().variants.is_empty());
        assert!(scraper.metadata().custom::<Vec<TextureVariant>>(VARIANT_DATA).is_none());

        let mut out = AssetData::default();
        let err = scraper.fetch_variant(0, &mut out).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidVariantIndex { .. }));
        assert_eq!(fetcher.downloads(), 0);
    }
}
