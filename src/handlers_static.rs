use std::path::PathBuf;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::warp_helpers::with_string;

/// Serves the front-end page, read from disk on every request.
pub async fn serve_index(index_path: String) -> Result<Box<dyn Reply>, Rejection> {
    let path = PathBuf::from(&index_path);

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(Box::new(warp::reply::html(content))),
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            Ok(Box::new(warp::reply::with_status(
                "index.html not found",
                StatusCode::NOT_FOUND,
            )))
        }
    }
}

pub fn build_static_routes(
    index_path: String,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .and(with_string(index_path))
        .and_then(serve_index)
}
