//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: access logging, method checks,
//! body size checks and dispatch to the article, upload and static handlers.

use super::articles;
use super::body::BoxError;
use super::static_files::{self, FileRequest};
use super::uploads;
use crate::config::{AppState, HealthConfig};
use crate::http::{self, cache::CachePolicy, QueryParams};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Every endpoint the server knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Home,
    Upload,
    UploadedFile(&'a str),
    SaveArticle,
    EditArticle,
    DeleteArticle,
    GetArticle,
    ListArticles,
    ViewArticle,
    Static(&'a str),
}

impl<'a> Route<'a> {
    fn resolve(path: &'a str) -> Option<Self> {
        let route = match path {
            "/" => Self::Home,
            "/upload" => Self::Upload,
            "/save-article" => Self::SaveArticle,
            "/edit-article" => Self::EditArticle,
            "/delete-article" => Self::DeleteArticle,
            "/get-article" => Self::GetArticle,
            "/list-articles" => Self::ListArticles,
            "/view-article" => Self::ViewArticle,
            _ => {
                if let Some(name) = path.strip_prefix("/uploads/").filter(|n| !n.is_empty()) {
                    Self::UploadedFile(name)
                } else if let Some(rest) = path.strip_prefix("/static/").filter(|r| !r.is_empty()) {
                    Self::Static(rest)
                } else {
                    return None;
                }
            }
        };
        Some(route)
    }

    fn method(self) -> Method {
        match self {
            Self::Upload | Self::SaveArticle => Method::POST,
            Self::EditArticle => Method::PUT,
            Self::DeleteArticle => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// `Allow` header value for this route
    const fn allow(self) -> &'static str {
        match self {
            Self::Upload | Self::SaveArticle => "POST, OPTIONS",
            Self::EditArticle => "PUT, OPTIONS",
            Self::DeleteArticle => "DELETE, OPTIONS",
            _ => "GET, HEAD, OPTIONS",
        }
    }

    /// GET routes also answer HEAD
    fn accepts(self, method: &Method) -> bool {
        let expected = self.method();
        *method == expected || (expected == Method::GET && *method == Method::HEAD)
    }
}

/// Main entry point for HTTP request handling
///
/// Generic over the body so the whole dispatcher runs on in-memory requests
/// as well as hyper's `Incoming`.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let access_log = state.access_log_enabled();
    let entry = access_log.then(|| access_entry(&req, remote_addr));

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = dispatch(req, &state).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

async fn dispatch<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // Health checks come before everything else and never touch the body
    if let Some(response) = health_check(&path, &state.config.routes.health, state).await {
        return response;
    }

    let Some(route) = Route::resolve(&path) else {
        logger::log_debug(&format!("No route for {method} {path}"));
        return http::build_404_response();
    };

    if !route.accepts(&method) {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return http::build_405_response(route.allow());
    }

    if let Some(response) = check_body_size(&req, state.config.http.max_body_size) {
        return response;
    }

    let query = QueryParams::parse(req.uri().query());
    let is_head = method == Method::HEAD;
    let if_none_match = req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let file_req = FileRequest {
        is_head,
        if_none_match: if_none_match.as_deref(),
    };

    match route {
        Route::Home => static_files::serve_homepage(&state.config.storage.index_file, is_head).await,
        Route::Upload => uploads::upload_file(req, state).await,
        Route::UploadedFile(name) => uploads::serve_upload(name, file_req, state).await,
        Route::SaveArticle => articles::save_article(req.into_body(), state).await,
        Route::EditArticle => articles::edit_article(req.into_body(), &query, state).await,
        Route::DeleteArticle => articles::delete_article(&query, state).await,
        Route::GetArticle => articles::get_article(&query, state).await,
        Route::ListArticles => articles::list_articles(&query, state).await,
        Route::ViewArticle => articles::view_article(&query, state, is_head).await,
        Route::Static(rest) => {
            static_files::serve_directory(
                &state.config.storage.static_dir,
                &http::query::decode_path_segment(rest),
                file_req,
                CachePolicy::STATIC_ASSETS,
            )
            .await
        }
    }
}

/// Liveness always answers `ok`; readiness also needs both storage directories
async fn health_check(
    path: &str,
    health: &HealthConfig,
    state: &AppState,
) -> Option<Response<Full<Bytes>>> {
    if !health.enabled {
        return None;
    }
    if path == health.liveness_path {
        return Some(http::build_health_response(StatusCode::OK, "ok"));
    }
    if path == health.readiness_path {
        let ready = is_dir(state.articles.dir()).await && is_dir(state.uploads.dir()).await;
        return Some(if ready {
            http::build_health_response(StatusCode::OK, "ok")
        } else {
            logger::log_warning("Readiness check failed: storage directory missing");
            http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
        });
    }
    None
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_dir())
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
