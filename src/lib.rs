pub mod album;
pub mod config;
pub mod file_scanner;
pub mod handlers_album;
pub mod handlers_health;
pub mod handlers_photo;
pub mod handlers_static;
pub mod mimetype_detector;
pub mod photo_types;
pub mod warp_helpers;
