//! Upload handlers
//!
//! `POST /upload` takes a multipart form with a `file` field; stored files are
//! served back from `/uploads/<filename>`.

use super::body::{read_body, BoxError};
use super::static_files::{self, FileRequest};
use super::store_error_response;
use crate::config::AppState;
use crate::http::cache::CachePolicy;
use crate::http::{self, query};
use crate::logger;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

/// Name of the multipart field carrying the file
const FILE_FIELD: &str = "file";

fn no_file_part() -> Response<Full<Bytes>> {
    http::json_error(StatusCode::BAD_REQUEST, "No file part")
}

/// `POST /upload`
pub async fn upload_file<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let boundary = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok());
    let Some(boundary) = boundary else {
        return no_file_part();
    };

    let body = match read_body(req.into_body(), state.config.http.max_body_size).await {
        Ok(b) => b,
        Err(response) => return response,
    };

    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return no_file_part(),
            Err(e) => {
                logger::log_warning(&format!("Malformed multipart upload: {e}"));
                return no_file_part();
            }
        };

        // A part without a filename is a plain form value, not a file
        let filename = match (field.name(), field.file_name()) {
            (Some(FILE_FIELD), Some(filename)) => filename.to_string(),
            _ => continue,
        };
        if filename.is_empty() {
            return http::json_error(StatusCode::BAD_REQUEST, "No selected file");
        }

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                logger::log_warning(&format!("Failed to read upload '{filename}': {e}"));
                return http::json_error(StatusCode::BAD_REQUEST, "Malformed upload");
            }
        };

        return match state.uploads.save(&filename, &data).await {
            Ok(url) => {
                logger::log_upload(&filename, data.len());
                http::json_response(StatusCode::OK, &serde_json::json!({ "url": url }))
            }
            Err(e) => store_error_response(&e),
        };
    }
}

/// `GET /uploads/<filename>`
pub async fn serve_upload(
    raw_name: &str,
    file_req: FileRequest<'_>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let name = query::decode_path_segment(raw_name);
    static_files::serve_directory(state.uploads.dir(), &name, file_req, CachePolicy::UPLOADS).await
}
