//! Citation scanning over normalized text.

use std::ops::Range;

use regex::CaptureMatches;

use super::pattern::{CitationPattern, REF_GROUP};
use crate::error::{CodeislowError, Result};

/// One match of the citation pattern, before reference normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Short name of the code whose alias group fired.
    pub code: String,

    /// Reference span between the article marker and the code, trimmed.
    pub reference: String,

    /// Byte range of the whole match in the scanned text.
    pub span: Range<usize>,
}

/// Lazy, left-to-right iterator over the citations of a text.
///
/// Matches never overlap: once a span is consumed, scanning resumes right
/// after it. Create a new scanner to run over the same text again.
///
/// Exactly one code group fires per match: code groups are sibling
/// alternatives, and the regex engine refuses duplicate group names at
/// build time. The `AmbiguousCodeMatch` branch is unreachable with
/// patterns from [`CitationPattern::build`].
pub struct CitationScanner<'p, 't> {
    pattern: &'p CitationPattern,
    captures: CaptureMatches<'p, 't>,
    index: usize,
}

impl<'p, 't> CitationScanner<'p, 't> {
    #[must_use]
    pub fn new(pattern: &'p CitationPattern, text: &'t str) -> Self {
        Self {
            pattern,
            captures: pattern.regex().captures_iter(text),
            index: 0,
        }
    }
}

impl Iterator for CitationScanner<'_, '_> {
    type Item = Result<RawMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.captures.by_ref() {
            self.index += 1;
            let Some(whole) = caps.get(0) else {
                continue;
            };

            let fired: Vec<&str> = self
                .pattern
                .codes()
                .iter()
                .filter(|code| caps.name(&code.short_name).is_some())
                .map(|code| code.short_name.as_str())
                .collect();

            let code = match fired.as_slice() {
                [single] => (*single).to_string(),
                [] => {
                    tracing::debug!(index = self.index, "Match without code group, skipping");
                    continue;
                }
                _ => {
                    return Some(Err(CodeislowError::AmbiguousCodeMatch {
                        codes: fired.iter().map(|c| (*c).to_string()).collect(),
                    }));
                }
            };

            let reference = caps
                .name(REF_GROUP)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            tracing::debug!(
                index = self.index,
                code = %code,
                reference = %reference,
                "Citation match"
            );

            return Some(Ok(RawMatch {
                code,
                reference,
                span: whole.range(),
            }));
        }
        None
    }
}

/// Scan normalized text with a citation pattern.
pub fn scan<'p, 't>(text: &'t str, pattern: &'p CitationPattern) -> CitationScanner<'p, 't> {
    CitationScanner::new(pattern, text)
}
