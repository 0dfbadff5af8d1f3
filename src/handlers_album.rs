use log::{error, info};
use warp::{reject, Filter, Rejection, Reply};

use crate::album::service::album_file_name;
use crate::photo_types::GenerateAlbumRequest;
use crate::warp_helpers::{
    with_album_service, with_string, InternalError, SharedAlbumService, ValidationError,
};

/// Builds the album on the blocking pool and returns it as a PDF download.
pub async fn generate_album(
    request: GenerateAlbumRequest,
    album_service: SharedAlbumService,
    album_prefix: String,
) -> Result<impl Reply, Rejection> {
    info!(
        "Album requested for {} selected photo(s)",
        request.photo_paths.len()
    );

    let paths = request.photo_paths;
    let result =
        tokio::task::spawn_blocking(move || album_service.generate_album(&paths)).await;

    let pdf_bytes = match result {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) if e.is_user_error() => {
            return Err(reject::custom(ValidationError {
                message: e.to_string(),
            }));
        }
        Ok(Err(e)) => {
            error!("Album generation failed: {}", e);
            return Err(reject::custom(InternalError));
        }
        Err(e) => {
            error!("Album generation task failed: {}", e);
            return Err(reject::custom(InternalError));
        }
    };

    let file_name = album_file_name(&album_prefix, &chrono::Local::now());
    let reply = warp::reply::with_header(pdf_bytes, "content-type", "application/pdf");
    let reply = warp::reply::with_header(
        reply,
        "content-disposition",
        format!("attachment; filename=\"{}\"", file_name),
    );

    Ok(reply)
}

pub fn build_album_routes(
    album_service: SharedAlbumService,
    album_prefix: String,
    max_body_bytes: u64,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "photos" / "album")
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json::<GenerateAlbumRequest>())
        .and(with_album_service(album_service))
        .and(with_string(album_prefix))
        .and_then(generate_album)
}
