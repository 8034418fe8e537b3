use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Kind of asset a scraper produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Material,
    World,
    Light,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Material => "material",
            AssetKind::World => "world",
            AssetKind::Light => "light",
        };
        f.write_str(name)
    }
}

/// Static description of a provider, known at program start.
#[derive(Debug)]
pub struct ScraperInfo {
    /// Stable identity used for registration and on the command line
    pub id: &'static str,
    pub source_name: &'static str,
    pub home_url: &'static str,
    /// Directory under the texture root holding this provider's assets
    pub home_dir: &'static str,
    pub metadata_filename: &'static str,
    pub scraped_types: &'static [AssetKind],
}

/// Output of a variant fetch, consumed by material/world/light builders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetData {
    pub name: String,
    /// Semantic slot (e.g. "sky", "baseColor") to local image path
    pub maps: BTreeMap<String, PathBuf>,
}

/// One downloadable (resolution, format) file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    pub resolution: String,
    pub format: String,
    pub url: String,
}

pub fn variant_label(resolution: &str, format: &str) -> String {
    format!("{resolution} ({format})")
}

/// Splits a `"{resolution} ({format})"` label back into its parts.
pub fn parse_variant_label(label: &str) -> Option<(&str, &str)> {
    let (resolution, rest) = label.split_once(" (")?;
    let format = rest.strip_suffix(')')?;
    if resolution.is_empty() || format.is_empty() {
        return None;
    }
    Some((resolution, format))
}
