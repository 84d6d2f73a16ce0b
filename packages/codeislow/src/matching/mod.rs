//! Citation detection: pattern building, scanning and reference normalization.
//!
//! ```text
//! paragraphs ──normalize_paragraphs──▶ full text
//!                                        │
//! CodeRegistry ──CitationPattern::build──┤
//!                                        ▼
//!                              CitationScanner (RawMatch)
//!                                        │
//!                              normalize_reference
//!                                        ▼
//!                          Citation { code, article }
//! ```

mod normalizer;
mod pattern;
mod scanner;
mod text;

use std::collections::BTreeSet;

use serde::Serialize;

pub use normalizer::{normalize_reference, Rank, ReferenceToken};
pub use pattern::{CitationOrder, CitationPattern, ARTICLE_ID, ARTICLE_MARKER, REF_GROUP};
pub use scanner::{scan, CitationScanner, RawMatch};
pub use text::{normalize_paragraphs, normalize_text};

use crate::codes::CodeRegistry;
use crate::error::Result;

/// One cited article: the code short name and the canonical article token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub code: String,
    pub article: ReferenceToken,
}

impl Citation {
    #[must_use]
    pub fn new(code: impl Into<String>, article: ReferenceToken) -> Self {
        Self {
            code: code.into(),
            article,
        }
    }
}

/// Scanner and normalizer composed over one compiled pattern.
///
/// The pattern always covers every registered code, so each alias ends a
/// reference span. The code selection is applied to the scanned matches.
#[derive(Debug, Clone)]
pub struct CitationDetector {
    pattern: CitationPattern,
    selected: Option<BTreeSet<String>>,
}

impl CitationDetector {
    /// Build a detector for a code selection (empty = every code).
    ///
    /// Unknown short names in `selected` are rejected with `UnknownCode`.
    pub fn new<S: AsRef<str>>(
        registry: &CodeRegistry,
        selected: &[S],
        order: CitationOrder,
    ) -> Result<Self> {
        let selection: BTreeSet<String> = registry
            .select(selected)?
            .into_iter()
            .map(|code| code.short_name.clone())
            .collect();
        let every_code: [&str; 0] = [];

        Ok(Self {
            pattern: CitationPattern::build(registry, &every_code, order)?,
            selected: (!selected.is_empty()).then_some(selection),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &CitationPattern {
        &self.pattern
    }

    /// Whether citations of this code are kept.
    #[must_use]
    pub fn is_selected(&self, code: &str) -> bool {
        self.selected
            .as_ref()
            .is_none_or(|selection| selection.contains(code))
    }

    /// Lazily yield citations of an already normalized text, in document order.
    pub fn citations<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Result<Citation>> + 'a {
        scan(text, &self.pattern).flat_map(|raw| {
            let expanded: Vec<Result<Citation>> = match raw {
                Ok(raw) if !self.is_selected(&raw.code) => {
                    tracing::debug!(code = %raw.code, "Skipping citation of unselected code");
                    Vec::new()
                }
                Ok(raw) => normalize_reference(&raw.reference)
                    .into_iter()
                    .map(|article| Ok(Citation::new(raw.code.clone(), article)))
                    .collect(),
                Err(e) => vec![Err(e)],
            };
            expanded
        })
    }

    /// Collect every citation of a text.
    ///
    /// The text is normalized first; normalization is idempotent, so
    /// already normalized input is unaffected.
    pub fn detect(&self, text: &str) -> Result<Vec<Citation>> {
        let text = normalize_text(text);
        self.citations(&text).collect()
    }
}

/// Detect citations in a full text.
///
/// An empty selection means every registered code. A text without any
/// citation yields an empty vector.
///
/// # Examples
/// ```
/// use codeislow::codes::create_french_code_registry;
/// use codeislow::matching::{detect_citations, CitationOrder};
///
/// let registry = create_french_code_registry();
/// let found = detect_citations(
///     &registry,
///     "Vu les articles 1240 et 1241 du Code civil",
///     &["CCIV"],
///     CitationOrder::ArticleCode,
/// )
/// .unwrap();
///
/// let pairs: Vec<(String, String)> = found
///     .into_iter()
///     .map(|c| (c.code, c.article.to_string()))
///     .collect();
/// assert_eq!(pairs, vec![
///     ("CCIV".to_string(), "1240".to_string()),
///     ("CCIV".to_string(), "1241".to_string()),
/// ]);
/// ```
pub fn detect_citations<S: AsRef<str>>(
    registry: &CodeRegistry,
    full_text: &str,
    selected: &[S],
    order: CitationOrder,
) -> Result<Vec<Citation>> {
    CitationDetector::new(registry, selected, order)?.detect(full_text)
}

/// Detect citations and group the tokens by code.
pub fn detect_citations_grouped<S: AsRef<str>>(
    registry: &CodeRegistry,
    full_text: &str,
    selected: &[S],
    order: CitationOrder,
) -> Result<Vec<(String, Vec<ReferenceToken>)>> {
    let citations = detect_citations(registry, full_text, selected, order)?;
    Ok(group_by_code(&citations))
}

/// Group citations by code, keeping first-appearance order of codes and
/// document order of articles within each code.
pub fn group_by_code(citations: &[Citation]) -> Vec<(String, Vec<ReferenceToken>)> {
    let mut groups: Vec<(String, Vec<ReferenceToken>)> = Vec::new();
    for citation in citations {
        match groups.iter_mut().find(|(code, _)| *code == citation.code) {
            Some((_, articles)) => articles.push(citation.article.clone()),
            None => groups.push((citation.code.clone(), vec![citation.article.clone()])),
        }
    }
    groups
}
