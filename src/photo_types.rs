use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// URL prefix under which photo files are served
pub const PUBLIC_PHOTO_PREFIX: &str = "/photos";

/// A photo file as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoRecord {
    #[serde(rename = "fileName")]
    pub name: String,
    /// Public URL path, always `/photos/<name>`
    #[serde(rename = "filePath")]
    pub path: String,
    #[serde(rename = "fileSize")]
    pub size_bytes: u64,
    #[serde(rename = "dateModified")]
    pub modified_at: DateTime<Utc>,
    #[serde(skip)]
    disk_path: PathBuf,
}

impl PhotoRecord {
    pub fn new(
        name: impl Into<String>,
        disk_path: impl Into<PathBuf>,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        Self {
            path: format!("{}/{}", PUBLIC_PHOTO_PREFIX, name),
            name,
            size_bytes,
            modified_at,
            disk_path: disk_path.into(),
        }
    }

    /// Where the image bytes live on this machine
    pub fn file_path(&self) -> &Path {
        &self.disk_path
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAlbumRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub photo_paths: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
