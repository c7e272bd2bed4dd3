//! HTTP protocol layer module
//!
//! Response builders, caching headers, MIME detection and query parsing,
//! independent of the article and upload handlers that use them.

pub mod cache;
pub mod mime;
pub mod query;
pub mod response;

pub use query::QueryParams;
pub use response::{
    apply_common_headers, build_304_response, build_404_response, build_405_response,
    build_413_response, build_health_response, build_html_response, build_options_response,
    build_text_response, json_error, json_response,
};
