use chrono::{DateTime, TimeZone};
use log::info;

use super::planner::{PageLayoutPlanner, PageSizeRoll, SeededRoll};
use super::renderer::AlbumRenderer;
use super::{AlbumError, Result};
use crate::file_scanner::PhotoSource;

/// Download name for an album built at `created_at`
pub fn album_file_name<Tz: TimeZone>(prefix: &str, created_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Album_{}_{}.pdf", prefix, created_at.format("%Y%m%d_%H%M%S"))
}

/// Turns a selection of photo paths into a finished PDF album.
///
/// Holds no per-request state: every call plans with its own freshly seeded
/// generator, so concurrent calls share nothing mutable.
pub struct AlbumService<S: PhotoSource> {
    source: S,
    renderer: AlbumRenderer,
}

impl<S: PhotoSource> AlbumService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            renderer: AlbumRenderer::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn generate_album(&self, selected_paths: &[String]) -> Result<Vec<u8>> {
        self.generate_album_with(selected_paths, SeededRoll::new())
    }

    pub fn generate_album_with<R: PageSizeRoll>(
        &self,
        selected_paths: &[String],
        roll: R,
    ) -> Result<Vec<u8>> {
        if selected_paths.is_empty() {
            return Err(AlbumError::NoSelection);
        }

        let mut photos = self.source.get_by_paths(selected_paths);
        if photos.is_empty() {
            return Err(AlbumError::NoMatch);
        }
        // stable, ties keep resolution order
        photos.sort_by_key(|photo| photo.modified_at);

        info!(
            "Starting album generation with {} of {} selected photos",
            photos.len(),
            selected_paths.len()
        );

        let plan = PageLayoutPlanner::new(roll).plan(&photos);
        let bytes = self.renderer.render(&plan)?;

        info!(
            "Album generated: {} pages, {} bytes",
            plan.page_count(),
            bytes.len()
        );
        Ok(bytes)
    }
}
