//! Article search and pagination
//!
//! Ranks article file names against a free-text query with [`fuzz`] scoring
//! and cuts the result into fixed-size pages.

pub mod fuzz;

use serde::Serialize;
use std::cmp::Reverse;

/// Articles per page
pub const PAGE_SIZE: usize = 5;

/// Matches must score strictly above this
pub const SCORE_THRESHOLD: u8 = 60;

/// One page of article names, as returned by `/list-articles`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArticlePage {
    pub articles: Vec<String>,
    pub has_more: bool,
}

/// Narrow `names` down to the ones matching `query`
///
/// An empty (or blank) query keeps every name in its given order. Otherwise
/// names scoring above [`SCORE_THRESHOLD`] are returned best first; equal
/// scores keep their relative order from `names`.
pub fn filter_articles(names: Vec<String>, query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return names;
    }

    let mut scored: Vec<(u8, String)> = names
        .into_iter()
        .map(|name| (fuzz::weighted_ratio(query, &name), name))
        .filter(|(score, _)| *score > SCORE_THRESHOLD)
        .collect();
    // Stable sort: ties stay in input (lexicographic) order
    scored.sort_by_key(|(score, _)| Reverse(*score));
    scored.into_iter().map(|(_, name)| name).collect()
}

/// Slice `candidates` into the 1-based `page`
///
/// Pages below 1 are treated as page 1. A page past the end is empty.
#[allow(clippy::cast_possible_wrap)]
pub fn paginate(candidates: Vec<String>, page: i64) -> ArticlePage {
    let start = page
        .saturating_sub(1)
        .saturating_mul(PAGE_SIZE as i64)
        .max(0);
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let end = start.saturating_add(PAGE_SIZE);
    let has_more = end < candidates.len();

    ArticlePage {
        articles: candidates.into_iter().skip(start).take(PAGE_SIZE).collect(),
        has_more,
    }
}

/// Filter then paginate
pub fn search_page(names: Vec<String>, query: &str, page: i64) -> ArticlePage {
    paginate(filter_articles(names, query), page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn seven() -> Vec<String> {
        names(&["a.md", "b.md", "c.md", "d.md", "e.md", "f.md", "g.md"])
    }

    #[test]
    fn test_pages_without_query() {
        let first = search_page(seven(), "", 1);
        assert_eq!(first.articles, names(&["a.md", "b.md", "c.md", "d.md", "e.md"]));
        assert!(first.has_more);

        let second = search_page(seven(), "", 2);
        assert_eq!(second.articles, names(&["f.md", "g.md"]));
        assert!(!second.has_more);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = search_page(seven(), "", 3);
        assert!(page.articles.is_empty());
        assert!(!page.has_more);

        let page = search_page(seven(), "", i64::MAX);
        assert!(page.articles.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_zero_and_negative_page_clamp_to_first() {
        let first = search_page(seven(), "", 1);
        assert_eq!(search_page(seven(), "", 0), first);
        assert_eq!(search_page(seven(), "", -4), first);
        assert_eq!(search_page(seven(), "", i64::MIN), first);
    }

    #[test]
    fn test_exact_page_boundary_has_no_more() {
        let five = names(&["a.md", "b.md", "c.md", "d.md", "e.md"]);
        let page = search_page(five, "", 1);
        assert_eq!(page.articles.len(), 5);
        assert!(!page.has_more);
    }

    #[test]
    fn test_typo_query_matches() {
        let all = names(&["Cooking_Pasta.md", "Go_Basics.md", "Rust_Ownership.md"]);
        let page = search_page(all, "go basic", 1);
        assert!(page.articles.contains(&"Go_Basics.md".to_string()));
        assert!(!page.has_more);
    }

    #[test]
    fn test_unrelated_query_is_empty() {
        let all = names(&["Cooking_Pasta.md", "Go_Basics.md", "Rust_Ownership.md"]);
        let page = search_page(all, "zzzz qqq", 1);
        assert!(page.articles.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_blank_query_keeps_order() {
        assert_eq!(filter_articles(seven(), "   "), seven());
    }

    #[test]
    fn test_ranked_best_first_ties_by_name() {
        let all = names(&["Basics.md", "Go_Basics.md", "Rust_Ownership.md"]);
        // Both "basics" files score equally; input order breaks the tie
        assert_eq!(
            filter_articles(all, "basics"),
            names(&["Basics.md", "Go_Basics.md"])
        );

        let all = names(&["Go_Basics.md", "Rust_Ownership.md"]);
        let ranked = filter_articles(all, "rust ownership");
        assert_eq!(ranked.first().map(String::as_str), Some("Rust_Ownership.md"));
    }
}
