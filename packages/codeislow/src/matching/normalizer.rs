//! Reference span normalization into canonical article tokens.
//!
//! A raw span such as `"L. 121-1, L. 121-2 et R. 132-1 al. 2"` may cite
//! several articles. It is split on connectors, stripped of alinéa markers
//! and punctuation, and every article number is rewritten to a single
//! token such as `L121-1`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// Connectors separating several articles in one span: " et ", ", ", " du".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CONNECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\set\s|,\s|\sdu\b").expect("valid regex"));

/// Separators inside a single article number.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBER_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s.\-]").expect("valid regex"));

/// Well-formed token: optional rank letter fused to hyphenated digit groups.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TOKEN_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[LARD]?\d+(?:-\d+)*$").expect("valid regex"));

/// Tokens announcing a paragraph-level sub-reference.
const ALINEA_MARKERS: &[&str] = &["al", "alinea", "alinéa"];

/// Rank of the text an article belongs to, from its leading letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// "L": loi.
    Loi,
    /// "R": règlement (décret en Conseil d'État).
    Reglement,
    /// "A": arrêté.
    Arrete,
    /// "D": décret simple.
    Decret,
}

impl Rank {
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'L' => Some(Self::Loi),
            'R' => Some(Self::Reglement),
            'A' => Some(Self::Arrete),
            'D' => Some(Self::Decret),
            _ => None,
        }
    }

    #[must_use]
    pub fn letter(&self) -> char {
        match self {
            Self::Loi => 'L',
            Self::Reglement => 'R',
            Self::Arrete => 'A',
            Self::Decret => 'D',
        }
    }
}

/// Canonical article number, e.g. `L248-1`, `1240-1` or `225-7-1`.
///
/// Only digits, inner hyphens and at most one leading rank letter; never
/// ends with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceToken(String);

impl ReferenceToken {
    /// Accept a string already in canonical form.
    ///
    /// # Examples
    /// ```
    /// use codeislow::matching::ReferenceToken;
    ///
    /// assert!(ReferenceToken::parse("L248-1").is_some());
    /// assert!(ReferenceToken::parse("L-248-1").is_none());
    /// assert!(ReferenceToken::parse("12-").is_none());
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        TOKEN_SHAPE
            .is_match(token)
            .then(|| Self(token.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rank letter, if the token carries one.
    #[must_use]
    pub fn rank(&self) -> Option<Rank> {
        self.0.chars().next().and_then(Rank::from_letter)
    }

    /// Numeric part without the rank letter.
    #[must_use]
    pub fn number(&self) -> &str {
        match self.rank() {
            Some(_) => &self.0[1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for ReferenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferenceToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ReferenceToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Split a raw span on the article connectors, dropping empty pieces.
fn split_references(reference: &str) -> Vec<&str> {
    CONNECTOR
        .split(reference)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Drop alinéa markers and rejoin the number parts with hyphens.
fn strip_alinea(fragment: &str) -> String {
    NUMBER_SEPARATOR
        .split(fragment)
        .filter(|part| {
            !part.is_empty()
                && !ALINEA_MARKERS
                    .iter()
                    .any(|marker| part.to_lowercase() == *marker)
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Keep digits, rank letters and hyphens; collapse and trim hyphens.
///
/// Rank letters are recognized in upper case only, so "l. 121-1" loses
/// its rank.
fn filter_characters(fragment: &str) -> String {
    let kept: String = fragment
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'L' | 'A' | 'R' | 'D' | '-'))
        .collect();

    kept.split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Fuse a lone rank letter onto the digits that follow it ("L-248-1" -> "L248-1").
fn fuse_rank(token: &str) -> String {
    match token.split_once('-') {
        Some((left, right)) if matches!(left, "L" | "A" | "R" | "D") => format!("{left}{right}"),
        _ => token.to_string(),
    }
}

/// Normalize one fragment; `None` when nothing article-like survives.
fn normalize_fragment(fragment: &str) -> Option<ReferenceToken> {
    let candidate = fuse_rank(&filter_characters(&strip_alinea(fragment)));
    let token = ReferenceToken::parse(&candidate);
    if token.is_none() && !candidate.is_empty() {
        tracing::debug!(fragment = %fragment, candidate = %candidate, "Discarding malformed reference");
    }
    token
}

/// Normalize a raw reference span into article tokens, in citation order.
///
/// # Examples
/// ```
/// use codeislow::matching::normalize_reference;
///
/// let tokens: Vec<String> = normalize_reference("22, 23 et 24")
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(tokens, vec!["22", "23", "24"]);
/// ```
pub fn normalize_reference(reference: &str) -> Vec<ReferenceToken> {
    split_references(reference)
        .into_iter()
        .filter_map(normalize_fragment)
        .collect()
}
