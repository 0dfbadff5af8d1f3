use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::photo_types::PhotoRecord;

const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

/// Lookup of photo records. Implementations drop anything they cannot resolve.
pub trait PhotoSource {
    /// Every photo, oldest modification first
    fn list_all(&self) -> Vec<PhotoRecord>;

    fn get_by_name(&self, name: &str) -> Option<PhotoRecord>;

    /// Resolves each path by its file name, oldest modification first
    fn get_by_paths(&self, paths: &[String]) -> Vec<PhotoRecord> {
        let mut photos: Vec<PhotoRecord> = paths
            .iter()
            .filter_map(|path| file_name_of(path))
            .filter_map(|name| self.get_by_name(name))
            .collect();
        photos.sort_by_key(|photo| photo.modified_at);
        photos
    }
}

/// Final path component of a user supplied path or name, if any.
pub fn file_name_of(path: &str) -> Option<&str> {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
}

/// Flat (non-recursive) scanner over a single photo directory
#[derive(Debug, Clone)]
pub struct FileScanner {
    photos_dir: PathBuf,
}

impl FileScanner {
    pub fn new(photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            photos_dir: photos_dir.into(),
        }
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// Location of `name` inside the photo directory. Only the final
    /// component of `name` is used.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        file_name_of(name).map(|file_name| self.photos_dir.join(file_name))
    }

    fn record_for(path: &Path) -> Option<PhotoRecord> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let name = path.file_name()?.to_str()?.to_string();
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Some(PhotoRecord::new(name, path, metadata.len(), modified_at))
    }

    fn is_supported_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl PhotoSource for FileScanner {
    fn list_all(&self) -> Vec<PhotoRecord> {
        let entries = match fs::read_dir(&self.photos_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Photo directory {} is not readable: {}",
                    self.photos_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut photos: Vec<PhotoRecord> = entries
            .filter_map(|e| e.ok())
            .map(|entry| entry.path())
            .filter(|path| Self::is_supported_file(path))
            .filter_map(|path| Self::record_for(&path))
            .collect();

        photos.sort_by_key(|photo| photo.modified_at);
        debug!(
            "Found {} photos in {}",
            photos.len(),
            self.photos_dir.display()
        );
        photos
    }

    fn get_by_name(&self, name: &str) -> Option<PhotoRecord> {
        self.resolve(name).and_then(|path| Self::record_for(&path))
    }
}
