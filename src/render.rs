//! Markdown rendering module
//!
//! Converts stored article Markdown to HTML. Output is not sanitized: raw HTML
//! inside an article is passed through as written.

use crate::storage::articles::ARTICLE_EXTENSION;
use pulldown_cmark::{html, Options, Parser};

/// Render a Markdown document to an HTML fragment
pub fn render_markdown(md_content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(md_content, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Full HTML page for `/view-article`
///
/// The page title is the article name without its extension.
pub fn render_article_page(name: &str, md_content: &str) -> String {
    let title = name.strip_suffix(ARTICLE_EXTENSION).unwrap_or(name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{}</title>
</head>
<body>
    <div>
{}
    </div>
</body>
</html>"#,
        escape_html(title),
        render_markdown(md_content)
    )
}

/// Escape text for use inside HTML element content
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_markdown() {
        let html = render_markdown(
            "# Title\n\nSome *emphasis* and `code`.\n\n- one\n- two\n\n[link](https://example.com)\n",
        );
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
    }

    #[test]
    fn test_extensions_enabled() {
        let html = render_markdown("~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = render_markdown("<span class=\"x\">raw</span>\n");
        assert!(html.contains("<span class=\"x\">raw</span>"));
    }

    #[test]
    fn test_article_page_title() {
        let page = render_article_page("Go_Basics.md", "# Go\n");
        assert!(page.contains("<title>Go_Basics</title>"));
        assert!(page.contains("<h1>Go</h1>"));

        let page = render_article_page("<b>.md", "x");
        assert!(page.contains("<title>&lt;b&gt;</title>"));
    }
}
