use std::path::PathBuf;

/// Failures a scraper can report. None of them is fatal: callers branch on the
/// error and show its message.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Bad URL: {0}")]
    BadUrl(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Not a supported asset type: expected {expected}, provider reported {found}")]
    NotSupportedAssetType {
        expected: &'static str,
        found: String,
    },

    #[error("Invalid variant index: {index} ({count} variants available)")]
    InvalidVariantIndex { index: usize, count: usize },

    #[error("No scraper can handle URL: {0}")]
    UnsupportedProvider(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata file {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode metadata field {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScrapeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
