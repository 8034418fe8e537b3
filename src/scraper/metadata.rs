use super::error::ScrapeError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persisted record of an asset, stored next to its downloaded files.
///
/// A later import loads this file to learn which variants already exist on
/// disk and where they came from, without contacting the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub id: String,
    /// File name of the preview image, relative to the asset directory
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub fetch_url: String,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub custom: BTreeMap<String, Value>,
    #[serde(default)]
    pub maps: BTreeMap<String, PathBuf>,
}

impl AssetMetadata {
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        let metadata = serde_json::from_str(&content).map_err(|source| ScrapeError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded asset metadata from {}", path.display());
        Ok(metadata)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScrapeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScrapeError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ScrapeError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|e| ScrapeError::io(path, e))?;
        debug!("Saved asset metadata to {}", path.display());
        Ok(())
    }

    pub fn set_custom<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), ScrapeError> {
        let value = serde_json::to_value(value).map_err(|source| ScrapeError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.custom.insert(key.to_string(), value);
        Ok(())
    }

    /// Returns `None` when the field is absent or has an unexpected shape.
    pub fn custom<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.custom
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
