use crate::scraper::{AssetMetadata, ScrapeError, ScraperInfo};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An asset found on disk from an earlier import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Directory name under the provider's home directory
    pub dir_name: String,
    pub name: String,
    pub thumbnail: Option<PathBuf>,
    pub fetch_url: String,
}

/// Previously downloaded assets under a texture root.
///
/// Loaded entries are remembered for the lifetime of the value. Directories
/// without usable metadata are read again on every scan until they load.
#[derive(Debug)]
pub struct Library {
    root: PathBuf,
    seen: HashMap<PathBuf, LibraryEntry>,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seen: HashMap::new(),
        }
    }

    /// Lists the assets of one provider, sorted by directory name. A missing
    /// home directory means an empty library.
    pub fn scan(&mut self, info: &ScraperInfo) -> Result<Vec<LibraryEntry>, ScrapeError> {
        let home = self.root.join(info.home_dir);
        if !home.is_dir() {
            debug!("No library directory at {}", home.display());
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&home).map_err(|e| ScrapeError::io(&home, e))? {
            let entry = entry.map_err(|e| ScrapeError::io(&home, e))?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut entries = Vec::new();
        for dir in dirs {
            if let Some(entry) = self.seen.get(&dir) {
                entries.push(entry.clone());
                continue;
            }
            if let Some(entry) = load_entry(&dir, info.metadata_filename) {
                self.seen.insert(dir, entry.clone());
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    pub fn find(
        &mut self,
        info: &ScraperInfo,
        dir_name: &str,
    ) -> Result<Option<LibraryEntry>, ScrapeError> {
        Ok(self
            .scan(info)?
            .into_iter()
            .find(|entry| entry.dir_name == dir_name))
    }
}

fn load_entry(dir: &Path, metadata_filename: &str) -> Option<LibraryEntry> {
    let path = dir.join(metadata_filename);
    if !path.is_file() {
        debug!("Skipping {}: no metadata", dir.display());
        return None;
    }

    let metadata = match AssetMetadata::load(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Skipping {}: {}", dir.display(), e);
            return None;
        }
    };
    if metadata.name.is_empty() {
        return None;
    }

    let dir_name = dir.file_name()?.to_string_lossy().into_owned();
    Some(LibraryEntry {
        dir_name,
        name: metadata.name,
        thumbnail: metadata.thumbnail.map(|thumb| dir.join(thumb)),
        fetch_url: metadata.fetch_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::polyhaven_hdri;
    use tempfile::TempDir;

    fn write_metadata(root: &Path, dir: &str, name: &str, thumbnail: Option<&str>) {
        let metadata = AssetMetadata {
            name: name.to_string(),
            id: dir.to_lowercase(),
            thumbnail: thumbnail.map(str::to_string),
            fetch_url: format!("https://polyhaven.com/a/{}", dir.to_lowercase()),
            ..Default::default()
        };
        metadata
            .save(&root.join("hdrihaven").join(dir).join("metadata.json"))
            .unwrap();
    }

    #[test]
    fn test_scan_lists_assets_with_metadata() {
        let dir = TempDir::new().unwrap();
        write_metadata(dir.path(), "Sky", "Sky", Some("thumbnail.png"));
        write_metadata(dir.path(), "Dusk", "Dusk", None);
        write_metadata(dir.path(), "Nameless", "", None);
        std::fs::create_dir_all(dir.path().join("hdrihaven/Empty")).unwrap();
        std::fs::write(dir.path().join("hdrihaven/stray.txt"), "x").unwrap();

        let mut library = Library::new(dir.path());
        let entries = library.scan(&polyhaven_hdri::INFO).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Dusk", "Sky"]);
        assert_eq!(
            entries[1].thumbnail,
            Some(dir.path().join("hdrihaven/Sky/thumbnail.png"))
        );
        assert_eq!(entries[0].thumbnail, None);
        assert_eq!(entries[1].fetch_url, "https://polyhaven.com/a/sky");
    }

    #[test]
    fn test_scan_without_home_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut library = Library::new(dir.path());
        assert!(library.scan(&polyhaven_hdri::INFO).unwrap().is_empty());
    }

    #[test]
    fn test_scan_reuses_seen_directories() {
        let dir = TempDir::new().unwrap();
        write_metadata(dir.path(), "Sky", "Sky", None);

        let mut library = Library::new(dir.path());
        assert_eq!(library.scan(&polyhaven_hdri::INFO).unwrap().len(), 1);

        // later edits to a scanned directory are not re-read
        write_metadata(dir.path(), "Sky", "Renamed", None);
        write_metadata(dir.path(), "Dusk", "Dusk", None);
        let entries = library.scan(&polyhaven_hdri::INFO).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Dusk", "Sky"]);
    }

    #[test]
    fn test_scan_retries_directories_without_metadata() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("hdrihaven/Sky")).unwrap();
        write_metadata(dir.path(), "Dusk", "", None);

        let mut library = Library::new(dir.path());
        assert!(library.scan(&polyhaven_hdri::INFO).unwrap().is_empty());

        // import finished after the first scan
        write_metadata(dir.path(), "Sky", "Sky", None);
        write_metadata(dir.path(), "Dusk", "Dusk", None);
        let entries = library.scan(&polyhaven_hdri::INFO).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Dusk", "Sky"]);
    }

    #[test]
    fn test_find_by_directory() {
        let dir = TempDir::new().unwrap();
        write_metadata(dir.path(), "Sky", "Sky", None);

        let mut library = Library::new(dir.path());
        let entry = library.find(&polyhaven_hdri::INFO, "Sky").unwrap().unwrap();
        assert_eq!(entry.fetch_url, "https://polyhaven.com/a/sky");
        assert!(library.find(&polyhaven_hdri::INFO, "Dusk").unwrap().is_none());
    }
}
