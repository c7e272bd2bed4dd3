//! HTTP response building module
//!
//! Builders for every status the server returns. None of them panic: a
//! builder error is logged and replaced by a bare response.

use crate::config::HttpConfig;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Finish a builder, falling back to an empty response on error
fn finish(
    builder: hyper::http::response::Builder,
    body: Bytes,
    label: &str,
) -> Response<Full<Bytes>> {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(label, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache_control: &str) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header("Cache-Control", cache_control);
    finish(builder, Bytes::new(), "304")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response listing the allowed methods
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", allow);
    finish(builder, Bytes::from("405 Method Not Allowed"), "405")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    const ALLOW: &str = "GET, HEAD, POST, PUT, DELETE, OPTIONS";

    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOW);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", ALLOW)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    finish(builder, Bytes::new(), "OPTIONS")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Plain UTF-8 text response
pub fn build_text_response(status: StatusCode, text: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8");
    finish(builder, text.into(), status.as_str())
}

/// Liveness/readiness probe response
pub fn build_health_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-store");
    finish(builder, Bytes::from_static(body.as_bytes()), "health")
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length);
    finish(builder, body, "HTML")
}

/// Build file response with `ETag` and cache control
pub fn build_cached_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    cache_control: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", cache_control);
    finish(builder, body, "200")
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            let builder = Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json");
            return finish(
                builder,
                Bytes::from_static(br#"{"error":"Internal server error"}"#),
                "500",
            );
        }
    };

    let builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    finish(builder, Bytes::from(json), status.as_str())
}

/// `{"error": message}` with the given status
pub fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Headers every response carries: `Server`, plus CORS when enabled
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, http_config: &HttpConfig) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&http_config.server_name) {
        headers.insert(SERVER, value);
    }
    if http_config.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("infallible body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[tokio::test]
    async fn test_json_error_body() {
        let response = json_error(StatusCode::NOT_FOUND, "Article not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["Content-Type"],
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"error":"Article not found"}"#);
    }

    #[tokio::test]
    async fn test_html_head_has_no_body() {
        let response = build_html_response("<p>hi</p>".to_string(), true);
        assert_eq!(response.headers()["Content-Length"], "9");
        assert_eq!(body_string(response).await, "");
    }

    #[test]
    fn test_common_headers() {
        let http_config = HttpConfig {
            server_name: "inkwell".to_string(),
            enable_cors: true,
            max_body_size: 1024,
        };
        let mut response = build_404_response();
        apply_common_headers(&mut response, &http_config);
        assert_eq!(response.headers()["server"], "inkwell");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_options_without_cors() {
        let response = build_options_response(false);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get("Access-Control-Allow-Methods").is_none());
    }
}
