//! Shared text normalization and comparison utilities
//!
//! Everything that scores text (listing scorer, file matcher) goes through
//! these helpers so case folding and tokenization stay consistent.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::sequence_matcher::SequenceMatcher;

static QUERY_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.\-]").expect("valid query strip regex"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Calculate similarity between two strings (0.0 to 1.0).
///
/// Both sides are trimmed and lowercased first. Returns 0.0 when either side
/// is empty after that. The ratio is Ratcliff/Obershelp block matching
/// (see [`SequenceMatcher`]), exactly 1.0 for identical inputs.
///
/// # Example
/// ```
/// use trackmatch::services::text_utils::similarity;
/// assert_eq!(similarity("Yesterday", "  yesterday "), 1.0);
/// assert_eq!(similarity("", "anything"), 0.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    SequenceMatcher::new(&a, &b).ratio()
}

/// Lowercase, whitespace-split word set
pub fn words_of(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Fraction of `target` words that also appear in `haystack` words.
///
/// The denominator is never below 1, so an empty target yields 0.0.
pub fn word_overlap(target: &HashSet<String>, haystack: &HashSet<String>) -> f64 {
    let matches = target.intersection(haystack).count();
    matches as f64 / target.len().max(1) as f64
}

/// Clean a track field before it is used as a search query.
///
/// Keeps word characters, whitespace, `.` and `-`; collapses whitespace runs
/// and trims.
pub fn clean_query_text(text: &str) -> String {
    let stripped = QUERY_STRIP_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Turn free text into a filesystem-safe stem of at most `max_chars` characters.
///
/// Path separators and reserved characters are dropped and whitespace runs
/// become underscores.
pub fn file_stem(text: &str, max_chars: usize) -> String {
    let sanitized = sanitize_filename::sanitize(text);
    WHITESPACE_RE
        .replace_all(sanitized.trim(), "_")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_identical() {
        assert_eq!(similarity("yesterday", "yesterday"), 1.0);
        assert_eq!(similarity("The Beatles", "the beatles"), 1.0);
        assert_eq!(similarity("  padded  ", "padded"), 1.0);
    }

    #[test]
    fn test_similarity_empty() {
        assert_eq!(similarity("", "yesterday"), 0.0);
        assert_eq!(similarity("yesterday", ""), 0.0);
        assert_eq!(similarity("   ", "   "), 0.0);
    }

    #[test]
    fn test_similarity_partial() {
        let score = similarity("abcd", "abxd");
        assert!((score - 0.75).abs() < 1e-9);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_similarity_unrelated_titles_stay_low() {
        let score = similarity("The Beatles", "Various Artists - Yesterday covers");
        assert!((score - 0.1778).abs() < 1e-4, "{score}");

        let score = similarity("the beatles", "the beatles - yesterday (1965) [flac]");
        assert!((score - 0.4583).abs() < 1e-4, "{score}");
    }

    #[test]
    fn test_words_of() {
        let words = words_of("The Beatles  the BEATLES");
        assert_eq!(words.len(), 2);
        assert!(words.contains("the"));
        assert!(words.contains("beatles"));
        assert!(words_of("   ").is_empty());
    }

    #[test]
    fn test_word_overlap() {
        let target = words_of("The Beatles");
        assert_eq!(word_overlap(&target, &words_of("the beatles - help")), 1.0);
        assert_eq!(word_overlap(&target, &words_of("beatles")), 0.5);
        assert_eq!(word_overlap(&words_of(""), &words_of("anything")), 0.0);
    }

    #[test]
    fn test_clean_query_text() {
        assert_eq!(clean_query_text("Guns N' Roses"), "Guns N Roses");
        assert_eq!(clean_query_text("  AC/DC   -  T.N.T. "), "ACDC - T.N.T.");
        assert_eq!(clean_query_text("Help!"), "Help");
        assert_eq!(clean_query_text("Кино"), "Кино");
        assert_eq!(clean_query_text("?!"), "");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("The Beatles Yesterday", 50), "The_Beatles_Yesterday");
        assert_eq!(file_stem("AC/DC - Back In Black", 50), "ACDC_-_Back_In_Black");
        assert_eq!(file_stem("abcdefgh", 3), "abc");
    }
}
