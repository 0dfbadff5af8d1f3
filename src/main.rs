use log::{error, info};
use mimalloc::MiMalloc;
use std::net::{IpAddr, TcpListener};
use std::sync::Arc;
use warp::Filter;

use photo_album::album::AlbumService;
use photo_album::config::Config;
use photo_album::file_scanner::FileScanner;
use photo_album::warp_helpers::{cors, handle_rejection};
use photo_album::{handlers_album, handlers_health, handlers_photo, handlers_static};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let host: IpAddr = config.host.parse()?;
    let port = config.port;

    info!("Starting photo album server on {}:{}", host, port);
    info!("Photo directory: {}", config.photos_path);
    info!("Index page: {}", config.index_path);

    if !is_port_available(host, port) {
        error!(
            "Port {} is already in use. Stop the other process or set PHOTO_ALBUM_PORT.",
            port
        );
        return Err(format!("Port {} is already in use", port).into());
    }

    let scanner = FileScanner::new(&config.photos_path);
    let album_service = Arc::new(AlbumService::new(scanner.clone()));

    let health_routes = handlers_health::build_health_routes();
    let album_routes = handlers_album::build_album_routes(
        album_service,
        config.album_prefix.clone(),
        config.max_body_bytes,
    );
    let photo_routes = handlers_photo::build_photo_routes(scanner);
    let static_routes = handlers_static::build_static_routes(config.index_path.clone());

    let routes = health_routes
        .or(album_routes)
        .or(photo_routes)
        .or(static_routes)
        .with(cors())
        .with(warp::log("photo_album"))
        .recover(handle_rejection);

    info!(
        "Server started successfully, listening on http://{}:{}",
        host, port
    );

    warp::serve(routes).run((host, port)).await;

    Ok(())
}

fn is_port_available(host: IpAddr, port: u16) -> bool {
    TcpListener::bind((host, port)).is_ok()
}
