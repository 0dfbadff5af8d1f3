use thiserror::Error;

pub mod planner;
pub mod renderer;
pub mod service;

pub use planner::{AlbumPlan, Arrangement, PageGroup, PageLayoutPlanner, PageSizeRoll, SeededRoll};
pub use renderer::AlbumRenderer;
pub use service::AlbumService;

#[derive(Error, Debug)]
pub enum AlbumError {
    #[error("No photos selected")]
    NoSelection,
    #[error("No photos found")]
    NoMatch,
    #[error("Album plan has no pages")]
    EmptyPlan,
    #[error("Failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },
    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlbumError {
    /// Errors the caller can fix by changing the selection
    pub fn is_user_error(&self) -> bool {
        matches!(self, AlbumError::NoSelection | AlbumError::NoMatch)
    }
}

pub type Result<T> = std::result::Result<T, AlbumError>;
