//! Request handler module
//!
//! Route dispatch plus the article, upload and static-file handlers behind it.

pub mod articles;
pub mod body;
pub mod router;
pub mod static_files;
pub mod uploads;

// Re-export main entry point
pub use router::handle_request;

use crate::http;
use crate::logger;
use crate::storage::StoreError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Translate a store failure into its JSON error response
fn store_error_response(err: &StoreError) -> Response<Full<Bytes>> {
    if let StoreError::Storage(io_err) = err {
        logger::log_error(&format!("Storage failure: {io_err}"));
    }
    http::json_error(err.status(), &err.to_string())
}
