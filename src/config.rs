use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub photos_path: String,
    pub index_path: String,
    pub album_prefix: String,
    pub max_body_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            port: env::var("PHOTO_ALBUM_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            host: env::var("PHOTO_ALBUM_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            photos_path: env::var("PHOTO_ALBUM_PHOTOS_PATH")
                .unwrap_or_else(|_| "/photos".to_string()),
            index_path: env::var("PHOTO_ALBUM_INDEX_PATH")
                .unwrap_or_else(|_| "../index.html".to_string()),
            album_prefix: env::var("PHOTO_ALBUM_ALBUM_PREFIX").unwrap_or_else(|_| "Mai".to_string()),
            // 2 GiB
            max_body_bytes: env::var("PHOTO_ALBUM_MAX_BODY_BYTES")
                .unwrap_or_else(|_| (2u64 * 1024 * 1024 * 1024).to_string())
                .parse()?,
        })
    }
}
