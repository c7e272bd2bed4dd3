//! Static file serving module
//!
//! Serves uploads, bundled assets and the homepage: path containment checks,
//! MIME detection, `ETag` revalidation.

use crate::http::{self, cache, cache::CachePolicy, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Component, Path};
use tokio::fs;

/// Request details that shape a file response
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRequest<'a> {
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Serve `relative` from inside `dir`, or 404
pub async fn serve_directory(
    dir: &Path,
    relative: &str,
    file_req: FileRequest<'_>,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    match load_from_directory(dir, relative).await {
        Some((content, content_type)) => {
            build_static_file_response(content, content_type, file_req, policy)
        }
        None => http::build_404_response(),
    }
}

/// Load a file below `dir`
///
/// Returns `None` for anything missing, not a regular file, or resolving
/// outside `dir` (`..` segments, absolute paths, symlinks pointing away).
pub async fn load_from_directory(dir: &Path, relative: &str) -> Option<(Vec<u8>, &'static str)> {
    let relative = Path::new(relative.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {}",
            relative.display()
        ));
        return None;
    }

    let dir_canonical = match fs::canonicalize(dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Directory not found or inaccessible '{}': {e}",
                dir.display()
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let file_canonical = fs::canonicalize(dir.join(relative)).await.ok()?;
    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            relative.display(),
            file_canonical.display()
        ));
        return None;
    }
    if !fs::metadata(&file_canonical).await.ok()?.is_file() {
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_canonical.display()
            ));
            return None;
        }
    };

    Some((content, mime::content_type_for(&file_canonical)))
}

/// `GET /`: the configured template if present, else the built-in page
pub async fn serve_homepage(index_file: &Path, is_head: bool) -> Response<Full<Bytes>> {
    let html = fs::read_to_string(index_file).await.unwrap_or_else(|_| {
        logger::log_debug(&format!(
            "No homepage template at '{}', serving built-in page",
            index_file.display()
        ));
        default_homepage().to_string()
    });
    http::build_html_response(html, is_head)
}

/// Build file response with `ETag` revalidation
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    file_req: FileRequest<'_>,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    let cache_control = policy.to_header_value();

    if cache::check_etag_match(file_req.if_none_match, &etag) {
        return http::build_304_response(&etag, &cache_control);
    }

    http::response::build_cached_response(
        Bytes::from(data),
        content_type,
        &etag,
        &cache_control,
        file_req.is_head,
    )
}

/// Built-in homepage: a small editor driving the JSON API
#[allow(clippy::too_many_lines)]
pub const fn default_homepage() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Inkwell</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f5f5f5;
            color: #333;
        }
        h1, h2 { color: #667eea; }
        input[type=text], textarea {
            width: 100%;
            box-sizing: border-box;
            padding: 8px;
            margin: 6px 0;
            font-size: 1em;
        }
        textarea { height: 320px; font-family: "Courier New", monospace; }
        button {
            background: #667eea;
            color: white;
            border: none;
            border-radius: 4px;
            padding: 6px 14px;
            margin: 2px;
            cursor: pointer;
        }
        ul { padding-left: 0; }
        li { list-style: none; margin: 6px 0; }
        a { color: #667eea; text-decoration: none; font-weight: 600; }
        .row { display: flex; gap: 8px; align-items: center; }
    </style>
</head>
<body>
    <h1>Inkwell</h1>

    <h2>Editor</h2>
    <input type="text" id="articleTitle" placeholder="Article title">
    <textarea id="editor" placeholder="Write Markdown here..."></textarea>
    <div class="row">
        <button id="saveButton">Save Article</button>
        <input type="file" id="imageInput" accept="image/*">
        <button id="uploadButton">Insert Image</button>
    </div>

    <h2>Articles</h2>
    <div class="row">
        <input type="text" id="searchQuery" placeholder="Search articles">
        <button id="searchButton">Search</button>
    </div>
    <ul id="articleList"></ul>
    <button id="loadMoreButton">Load More</button>

    <script>
    (function () {
        let currentPage = 1;
        let currentQuery = "";
        let editing = null;
        const list = document.getElementById("articleList");
        const loadMore = document.getElementById("loadMoreButton");
        const editor = document.getElementById("editor");
        const titleInput = document.getElementById("articleTitle");

        function loadArticles() {
            const params = new URLSearchParams({ page: currentPage, query: currentQuery });
            fetch("/list-articles?" + params)
                .then(r => r.json())
                .then(data => {
                    data.articles.forEach(name => {
                        const li = document.createElement("li");
                        const link = document.createElement("a");
                        link.href = "/view-article?name=" + encodeURIComponent(name);
                        link.target = "_blank";
                        link.textContent = name.replace(/\.md$/, "");
                        const edit = document.createElement("button");
                        edit.textContent = "Edit";
                        edit.onclick = () => editArticle(name);
                        const del = document.createElement("button");
                        del.textContent = "Delete";
                        del.onclick = () => deleteArticle(name);
                        li.append(link, " ", edit, del);
                        list.appendChild(li);
                    });
                    loadMore.style.display = data.has_more ? "" : "none";
                })
                .catch(err => console.error("Error:", err));
        }

        function reload() {
            currentPage = 1;
            list.innerHTML = "";
            loadArticles();
        }

        function editArticle(name) {
            fetch("/get-article?name=" + encodeURIComponent(name))
                .then(r => r.ok ? r.text() : Promise.reject(r.status))
                .then(text => {
                    editing = name;
                    titleInput.value = name.replace(/\.md$/, "").replace(/_/g, " ");
                    editor.value = text;
                })
                .catch(err => alert("Failed to load article: " + err));
        }

        function deleteArticle(name) {
            if (!confirm("Delete " + name + "?")) return;
            fetch("/delete-article?name=" + encodeURIComponent(name), { method: "DELETE" })
                .then(r => r.json())
                .then(data => data.success ? reload() : alert(data.error))
                .catch(err => console.error("Error:", err));
        }

        document.getElementById("saveButton").addEventListener("click", () => {
            const title = titleInput.value;
            const content = editor.value;
            if (!title || !content) {
                alert("Please provide a title and content for the article.");
                return;
            }
            const request = editing && editing === title.replace(/ /g, "_") + ".md"
                ? fetch("/edit-article?name=" + encodeURIComponent(editing), {
                    method: "PUT",
                    headers: { "Content-Type": "application/json" },
                    body: JSON.stringify({ content: content })
                })
                : fetch("/save-article", {
                    method: "POST",
                    headers: { "Content-Type": "application/json" },
                    body: JSON.stringify({ title: title, content: content })
                });
            request
                .then(r => r.json())
                .then(data => {
                    alert(data.success ? "Article saved successfully!" : "Failed to save the article.");
                    reload();
                })
                .catch(err => console.error("Error:", err));
        });

        document.getElementById("uploadButton").addEventListener("click", () => {
            const input = document.getElementById("imageInput");
            if (!input.files.length) return;
            const form = new FormData();
            form.append("file", input.files[0]);
            fetch("/upload", { method: "POST", body: form })
                .then(r => r.json())
                .then(data => {
                    if (data.url) {
                        editor.value += "\n![" + input.files[0].name + "](" + data.url + ")\n";
                    } else {
                        alert("Failed to upload image.");
                    }
                })
                .catch(err => console.error("Error:", err));
        });

        document.getElementById("searchButton").addEventListener("click", () => {
            currentQuery = document.getElementById("searchQuery").value.trim();
            reload();
        });

        loadMore.addEventListener("click", () => {
            currentPage++;
            loadArticles();
        });

        loadArticles();
    })();
    </script>
</body>
</html>"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("photo.png"), b"png-bytes").expect("write");

        let (content, content_type) = load_from_directory(dir.path(), "photo.png")
            .await
            .expect("file served");
        assert_eq!(content, b"png-bytes");
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn test_load_rejects_traversal_and_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        let served = root.path().join("served");
        std::fs::create_dir_all(served.join("sub")).expect("mkdir");
        std::fs::write(root.path().join("secret.txt"), b"secret").expect("write");

        assert!(load_from_directory(&served, "../secret.txt").await.is_none());
        assert!(load_from_directory(&served, "sub").await.is_none());
        assert!(load_from_directory(&served, "missing.png").await.is_none());
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("app.js"), b"console.log(1)").expect("write");

        let first = serve_directory(
            dir.path(),
            "app.js",
            FileRequest::default(),
            CachePolicy::STATIC_ASSETS,
        )
        .await;
        assert_eq!(first.status(), 200);
        let etag = first.headers()["ETag"]
            .to_str()
            .expect("ascii etag")
            .to_string();

        let second = serve_directory(
            dir.path(),
            "app.js",
            FileRequest {
                is_head: false,
                if_none_match: Some(&etag),
            },
            CachePolicy::STATIC_ASSETS,
        )
        .await;
        assert_eq!(second.status(), 304);
    }

    #[tokio::test]
    async fn test_homepage_falls_back_to_builtin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = serve_homepage(&dir.path().join("index.html"), false).await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["Content-Type"],
            "text/html; charset=utf-8"
        );
    }
}
