use serde_json::json;
use std::io::ErrorKind;
use warp::{reject, Filter, Rejection, Reply};

use crate::file_scanner::{FileScanner, PhotoSource};
use crate::mimetype_detector;
use crate::warp_helpers::{decode_segment, with_scanner, InternalError, NotFoundError};

pub async fn list_photos(scanner: FileScanner) -> Result<impl Reply, Rejection> {
    let photos = scanner.list_all();
    Ok(warp::reply::json(&photos))
}

pub async fn get_photo(file_name: String, scanner: FileScanner) -> Result<impl Reply, Rejection> {
    match scanner.get_by_name(&decode_segment(&file_name)) {
        Some(photo) => Ok(warp::reply::json(&photo)),
        None => Err(reject::custom(NotFoundError)),
    }
}

pub async fn delete_photo(
    file_name: String,
    scanner: FileScanner,
) -> Result<impl Reply, Rejection> {
    let photo = scanner
        .get_by_name(&decode_segment(&file_name))
        .ok_or_else(|| reject::custom(NotFoundError))?;

    match tokio::fs::remove_file(photo.file_path()).await {
        Ok(()) => {
            log::info!("Deleted photo {}", photo.file_path().display());
            Ok(warp::reply::json(&json!({ "message": "Photo deleted" })))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(reject::custom(NotFoundError)),
        Err(e) => {
            log::error!("Failed to delete {}: {}", photo.file_path().display(), e);
            Err(reject::custom(InternalError))
        }
    }
}

pub async fn get_photo_file(
    file_name: String,
    scanner: FileScanner,
) -> Result<impl Reply, Rejection> {
    let path = scanner
        .resolve(&decode_segment(&file_name))
        .ok_or_else(|| reject::custom(NotFoundError))?;

    match tokio::fs::read(&path).await {
        Ok(file_data) => {
            let content_type = mimetype_detector::content_type_for(&path);
            let reply = warp::reply::with_header(file_data, "content-type", content_type);
            let reply =
                warp::reply::with_header(reply, "cache-control", "public, max-age=31536000");
            Ok(reply)
        }
        Err(_) => Err(reject::custom(NotFoundError)),
    }
}

pub fn build_photo_routes(
    scanner: FileScanner,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api_photos_list = warp::path!("api" / "photos")
        .and(warp::get())
        .and(with_scanner(scanner.clone()))
        .and_then(list_photos);

    let api_photo_get = warp::path!("api" / "photos" / String)
        .and(warp::get())
        .and(with_scanner(scanner.clone()))
        .and_then(get_photo);

    let api_photo_delete = warp::path!("api" / "photos" / String)
        .and(warp::delete())
        .and(with_scanner(scanner.clone()))
        .and_then(delete_photo);

    let photo_file = warp::path!("photos" / String)
        .and(warp::get())
        .and(with_scanner(scanner))
        .and_then(get_photo_file);

    api_photos_list
        .or(api_photo_get)
        .or(api_photo_delete)
        .or(photo_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use warp::http::StatusCode;

    fn scanner_with(files: &[&str]) -> (TempDir, FileScanner) {
        let temp_dir = TempDir::new().unwrap();
        for name in files {
            fs::write(temp_dir.path().join(name), b"image bytes").unwrap();
        }
        let scanner = FileScanner::new(temp_dir.path());
        (temp_dir, scanner)
    }

    #[tokio::test]
    async fn test_get_photo_found_and_missing() {
        let (_dir, scanner) = scanner_with(&["a b.jpg"]);

        let reply = get_photo("a%20b.jpg".to_string(), scanner.clone())
            .await
            .unwrap();
        assert_eq!(reply.into_response().status(), StatusCode::OK);

        let rejection = get_photo("nope.jpg".to_string(), scanner)
            .await
            .err()
            .unwrap();
        assert!(rejection.find::<NotFoundError>().is_some());
    }

    #[tokio::test]
    async fn test_delete_photo_removes_file() {
        let (dir, scanner) = scanner_with(&["a.jpg"]);

        let reply = delete_photo("a.jpg".to_string(), scanner.clone())
            .await
            .unwrap();
        assert_eq!(reply.into_response().status(), StatusCode::OK);
        assert!(!dir.path().join("a.jpg").exists());

        let rejection = delete_photo("a.jpg".to_string(), scanner)
            .await
            .err()
            .unwrap();
        assert!(rejection.find::<NotFoundError>().is_some());
    }

    #[tokio::test]
    async fn test_photo_file_has_content_type() {
        let (_dir, scanner) = scanner_with(&["a.png"]);

        let response = get_photo_file("a.png".to_string(), scanner.clone())
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");

        assert!(get_photo_file("..".to_string(), scanner).await.is_err());
    }
}
