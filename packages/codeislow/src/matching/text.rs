//! Text normalization applied before citation scanning.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Any run of whitespace or control characters (CR, LF, TAB, FF, NBSP, ...).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{Cc}]+").expect("valid regex"));

/// Normalize a block of text for scanning.
///
/// Recomposes accents (NFC) so that `é` typed as `e` + combining acute
/// matches the code aliases, then collapses every whitespace or control
/// character run into a single space.
///
/// # Examples
/// ```
/// use codeislow::matching::normalize_text;
///
/// assert_eq!(normalize_text("Article\u{a0}1240\r\ndu\tCode civil"), "Article 1240 du Code civil");
/// ```
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    BLANK_RUN.replace_all(&composed, " ").trim().to_string()
}

/// Join extracted paragraphs into one normalized full text.
///
/// Paragraphs are joined with a single space, so a citation broken across
/// a paragraph boundary is still recognized.
pub fn normalize_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> String {
    let joined = paragraphs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    normalize_text(&joined)
}
