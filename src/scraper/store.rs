use super::error::ScrapeError;
use super::http::HttpFetcher;
use crate::utils::format_bytes;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// On-disk texture cache rooted at the user's texture directory.
///
/// The directory layout is the cache index: a file is reused whenever its
/// `(directory, base name)` pair already exists, regardless of content.
#[derive(Clone)]
pub struct TextureStore {
    root: PathBuf,
    fetcher: Arc<dyn HttpFetcher>,
    reinstall: bool,
}

impl fmt::Debug for TextureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureStore")
            .field("root", &self.root)
            .field("reinstall", &self.reinstall)
            .finish_non_exhaustive()
    }
}

impl TextureStore {
    pub fn new(root: impl Into<PathBuf>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
            reinstall: false,
        }
    }

    /// Re-download files even when they are already present.
    pub fn with_reinstall(mut self, reinstall: bool) -> Self {
        self.reinstall = reinstall;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fetcher(&self) -> &dyn HttpFetcher {
        self.fetcher.as_ref()
    }

    /// Absolute path of `relative` under the texture root. Does not touch the
    /// filesystem.
    pub fn texture_directory(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Local path `fetch_image` would use for `url`.
    pub fn image_path(&self, url: &str, relative_dir: impl AsRef<Path>, base_name: &str) -> PathBuf {
        let file_name = match url_extension(url) {
            Some(ext) => format!("{base_name}.{ext}"),
            None => base_name.to_string(),
        };
        self.texture_directory(relative_dir).join(file_name)
    }

    /// Returns the cached copy of `url`, downloading it first if missing.
    pub fn fetch_image(
        &self,
        url: &str,
        relative_dir: impl AsRef<Path>,
        base_name: &str,
    ) -> Result<PathBuf, ScrapeError> {
        let path = self.image_path(url, relative_dir, base_name);

        if path.is_file() && !self.reinstall {
            debug!("Cache hit for {}: {}", url, path.display());
            return Ok(path);
        }

        info!("Downloading {} to {}", url, path.display());
        let data = self
            .fetcher
            .get_bytes(url)
            .map_err(|e| ScrapeError::Api(format!("{e:#}")))?;

        write_atomic(&path, &data)?;

        debug!(
            "Wrote {} bytes to {}",
            format_bytes(data.len() as u64),
            path.display()
        );
        Ok(path)
    }
}

/// Writes `data` next to `path` and renames it into place, so `path` only
/// ever holds a complete download.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), ScrapeError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| ScrapeError::io(parent, e))?;

    let mut file = NamedTempFile::new_in(parent).map_err(|e| ScrapeError::io(parent, e))?;
    if let Err(e) = file.write_all(data).and_then(|_| file.flush()) {
        return Err(ScrapeError::io(file.path(), e));
    }
    file.persist(path).map_err(|e| ScrapeError::io(path, e.error))?;
    Ok(())
}

/// Extension of the last path segment of `url`, ignoring query and fragment.
pub fn url_extension(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let file_name = parsed.path_segments()?.next_back()?;
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
}
