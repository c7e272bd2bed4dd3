//! Fuzzy string scoring
//!
//! Token-aware similarity scores in `0..=100`. Every score is symmetric,
//! case-insensitive and built on the insert/delete similarity of two strings:
//! `2 * LCS / (len_a + len_b)`, measured in chars.

use std::collections::BTreeSet;

/// Scale applied to token-based scores in [`weighted_ratio`]
const UNBASE_SCALE: f64 = 0.95;

/// Normalize a string before scoring
///
/// Characters that are neither alphanumeric nor `_` become spaces, the result
/// is lowercased and trimmed. Inner runs of spaces are kept.
pub fn full_process(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    replaced.to_lowercase().trim().to_string()
}

/// Length of the longest common subsequence
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Similarity in `0.0..=1.0`; equal strings (even empty ones) score 1
#[allow(clippy::cast_precision_loss)]
fn similarity(a: &[char], b: &[char]) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (2 * lcs_len(a, b)) as f64 / (a.len() + b.len()) as f64
}

/// Best similarity of the shorter string against every same-length window of
/// the longer one
fn partial_similarity(a: &[char], b: &[char]) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let score = similarity(shorter, window);
        if score > 0.995 {
            return 1.0;
        }
        best = best.max(score);
    }
    best
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_score(value: f64) -> u8 {
    (value * 100.0).round().clamp(0.0, 100.0) as u8
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// Plain similarity score of two strings, as given
pub fn ratio(a: &str, b: &str) -> u8 {
    to_score(similarity(&chars(a), &chars(b)))
}

/// Best score of the shorter string against any substring of the longer one
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    to_score(partial_similarity(&chars(a), &chars(b)))
}

/// Whitespace tokens, sorted and joined back with single spaces
fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// [`ratio`] of both strings after sorting their tokens
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compare the shared tokens against each side's full token set
///
/// Scores high when one string's tokens are a subset of the other's, whatever
/// the order or the extra words.
fn token_set_with(a: &str, b: &str, scorer: fn(&str, &str) -> u8) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = tokens_a
        .intersection(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let diff_ab = tokens_a
        .difference(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let diff_ba = tokens_b
        .difference(&tokens_a)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let combined_ab = format!("{sect} {diff_ab}");
    let combined_ba = format!("{sect} {diff_ba}");
    let (combined_ab, combined_ba) = (combined_ab.trim(), combined_ba.trim());

    [
        scorer(&sect, combined_ab),
        scorer(&sect, combined_ba),
        scorer(combined_ab, combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, ratio)
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, partial_ratio)
}

/// Best of the ratio family, weighted by how different the lengths are
///
/// Strings of similar length are compared whole (plain, token-sorted and
/// token-set). When one is at least 1.5 times longer, substring matches are
/// tried instead, discounted more heavily past an 8x length difference.
#[allow(clippy::cast_precision_loss)]
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let p1 = full_process(a);
    let p2 = full_process(b);
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(&p1, &p2));
    let (len1, len2) = (p1.chars().count(), p2.chars().count());
    let len_ratio = len1.max(len2) as f64 / len1.min(len2) as f64;

    let best = if len_ratio < 1.5 {
        let sort = f64::from(token_sort_ratio(&p1, &p2)) * UNBASE_SCALE;
        let set = f64::from(token_set_ratio(&p1, &p2)) * UNBASE_SCALE;
        base.max(sort).max(set)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        let partial = f64::from(partial_ratio(&p1, &p2)) * partial_scale;
        let sort = f64::from(partial_token_sort_ratio(&p1, &p2)) * UNBASE_SCALE * partial_scale;
        let set = f64::from(partial_token_set_ratio(&p1, &p2)) * UNBASE_SCALE * partial_scale;
        base.max(partial).max(sort).max(set)
    };

    to_score(best / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_process() {
        assert_eq!(full_process("  Go_Basics.md "), "go_basics md");
        assert_eq!(full_process("Hello, World!"), "hello  world");
        assert_eq!(full_process("!!!"), "");
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("abc", ""), 0);
        assert_eq!(ratio("abcd", "wxyz"), 0);
        // LCS "abc" = 3, 2*3 / (4+3)
        assert_eq!(ratio("abcd", "abc"), 86);
    }

    #[test]
    fn test_partial_ratio() {
        assert_eq!(partial_ratio("basics", "go_basics md"), 100);
        assert_eq!(partial_ratio("go_basics md", "basics"), 100);
        assert_eq!(partial_ratio("xyz", "go_basics md"), 0);
    }

    #[test]
    fn test_token_ratios_ignore_order() {
        assert_eq!(token_sort_ratio("pasta cooking", "cooking pasta"), 100);
        assert_eq!(token_set_ratio("rust", "rust ownership guide"), 100);
        assert!(ratio("pasta cooking", "cooking pasta") < 100);
    }

    #[test]
    fn test_weighted_ratio_symmetric_and_case_insensitive() {
        let pairs = [
            ("go basic", "Go_Basics.md"),
            ("RUST ownership", "Rust_Ownership.md"),
            ("pasta", "Cooking_Pasta.md"),
        ];
        for (a, b) in pairs {
            assert_eq!(weighted_ratio(a, b), weighted_ratio(b, a));
            assert_eq!(
                weighted_ratio(&a.to_lowercase(), b),
                weighted_ratio(&a.to_uppercase(), b)
            );
        }
    }

    #[test]
    fn test_weighted_ratio_typo_and_partial() {
        assert!(weighted_ratio("go basic", "Go_Basics.md") > 60);
        assert!(weighted_ratio("rust ownrship", "Rust_Ownership.md") > 60);
        assert!(weighted_ratio("zzzz qqq", "Go_Basics.md") <= 60);
    }

    #[test]
    fn test_weighted_ratio_empty_after_processing() {
        assert_eq!(weighted_ratio("???", "Go_Basics.md"), 0);
        assert_eq!(weighted_ratio("go", ""), 0);
    }
}
