//! Article handlers
//!
//! JSON in, JSON out for the write operations; raw text and rendered HTML for
//! the read ones.

use super::body::{read_json, BoxError};
use super::store_error_response;
use crate::config::AppState;
use crate::http::{self, QueryParams};
use crate::logger;
use crate::render;
use crate::search;
use crate::storage::StoreError;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SaveArticleRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditArticleRequest {
    #[serde(default)]
    content: Option<String>,
}

fn success() -> Response<Full<Bytes>> {
    http::json_response(StatusCode::OK, &serde_json::json!({ "success": true }))
}

fn name_param(query: &QueryParams) -> &str {
    query.get("name").unwrap_or_default()
}

/// `POST /save-article` with `{title, content}`
pub async fn save_article<B>(body: B, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let request: SaveArticleRequest = match read_json(body, state.config.http.max_body_size).await
    {
        Ok(r) => r,
        Err(response) => return response,
    };

    let title = request.title.unwrap_or_default();
    let content = request.content.unwrap_or_default();
    match state.articles.save(&title, &content).await {
        Ok(name) => {
            logger::log_article("saved", &name);
            success()
        }
        Err(e) => store_error_response(&e),
    }
}

/// `PUT /edit-article?name=<file>` with `{content}`
pub async fn edit_article<B>(
    body: B,
    query: &QueryParams,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let request: EditArticleRequest = match read_json(body, state.config.http.max_body_size).await
    {
        Ok(r) => r,
        Err(response) => return response,
    };

    let name = name_param(query);
    let content = request.content.unwrap_or_default();
    match state.articles.update(name, &content).await {
        Ok(()) => {
            logger::log_article("updated", name);
            success()
        }
        Err(e) => store_error_response(&e),
    }
}

/// `DELETE /delete-article?name=<file>`
pub async fn delete_article(query: &QueryParams, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let name = name_param(query);
    match state.articles.delete(name).await {
        Ok(()) => {
            logger::log_article("deleted", name);
            success()
        }
        Err(e) => store_error_response(&e),
    }
}

/// `GET /get-article?name=<file>`: the raw Markdown
pub async fn get_article(query: &QueryParams, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match state.articles.read(name_param(query)).await {
        Ok(content) => http::build_text_response(StatusCode::OK, content),
        Err(e) => store_error_response(&e),
    }
}

/// `GET /list-articles?page=<n>&query=<q>`
pub async fn list_articles(query: &QueryParams, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let page = match query.get("page") {
        None => 1,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(page) => page,
            Err(_) => {
                return http::json_error(StatusCode::BAD_REQUEST, &format!("Invalid page: {raw}"))
            }
        },
    };
    let search_query = query.get("query").unwrap_or_default();

    let names = match state.articles.list().await {
        Ok(names) => names,
        Err(e) => return store_error_response(&e),
    };

    let result = search::search_page(names, search_query, page);
    logger::log_debug(&format!(
        "list-articles page={page} query={search_query:?} -> {} result(s)",
        result.articles.len()
    ));
    http::json_response(StatusCode::OK, &result)
}

/// `GET /view-article?name=<file>`: the article rendered into an HTML page
///
/// Failures are answered in plain text, not JSON.
pub async fn view_article(
    query: &QueryParams,
    state: &Arc<AppState>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let name = name_param(query);
    match state.articles.read(name).await {
        Ok(content) => http::build_html_response(render::render_article_page(name, &content), is_head),
        Err(StoreError::NotFound(_)) => {
            http::build_text_response(StatusCode::NOT_FOUND, "Article not found")
        }
        Err(e) => {
            if let StoreError::Storage(ref io_err) = e {
                logger::log_error(&format!("Failed to read article '{name}': {io_err}"));
            }
            http::build_text_response(e.status(), e.to_string())
        }
    }
}
