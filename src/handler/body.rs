//! Request body collection
//!
//! Bodies are read fully into memory, capped at `http.max_body_size`.

use crate::http;
use crate::logger;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Boxed error every supported request body converts into
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Collect `body`, answering 413 once it grows past `limit` bytes
pub async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {limit} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::json_error(StatusCode::BAD_REQUEST, "Invalid request body"))
        }
    }
}

/// Collect `body` and decode it as JSON
///
/// Malformed JSON is answered with the same `Invalid data` error as missing
/// fields.
pub async fn read_json<T, B>(body: B, limit: u64) -> Result<T, Response<Full<Bytes>>>
where
    T: DeserializeOwned,
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let bytes = read_body(body, limit).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        logger::log_debug(&format!("Rejected JSON body: {e}"));
        http::json_error(StatusCode::BAD_REQUEST, "Invalid data")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        value: String,
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = Full::new(Bytes::from_static(b"hello"));
        let bytes = read_body(body, 5).await.expect("within limit");
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let body = Full::new(Bytes::from_static(b"hello world"));
        let response = read_body(body, 4).await.expect_err("over limit");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_read_json() {
        let body = Full::new(Bytes::from_static(br#"{"value":"x"}"#));
        let probe: Probe = read_json(body, 1024).await.expect("valid json");
        assert_eq!(probe.value, "x");

        let body = Full::new(Bytes::from_static(b"{not json"));
        let response = read_json::<Probe, _>(body, 1024)
            .await
            .expect_err("invalid json");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
