//! Composition of the citation regex from the code registry.

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::codes::{Code, CodeRegistry};
use crate::error::{CodeislowError, Result};

/// Article marker: "article", "articles" or "art.".
pub const ARTICLE_MARKER: &str = r"(?P<art>Articles?|Art\.)";

/// A single article identifier, used when the code precedes the article.
///
/// Optional rank letter with its separator, then hyphenated digit groups
/// (e.g. "L. 121-1", "R-4127", "1240").
pub const ARTICLE_ID: &str = r"(?:[LRAD](?:\.\s?|\s|-)?)?\d+(?:-\d+)*";

/// Name of the capture group holding the reference span.
pub const REF_GROUP: &str = "ref";

/// Which of the two surface forms a citation takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationOrder {
    /// "article 1240 du Code civil".
    #[default]
    ArticleCode,

    /// "Code civil, article 1240". Recognizes a single article per match.
    CodeArticle,
}

impl CitationOrder {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArticleCode => "article_code",
            Self::CodeArticle => "code_article",
        }
    }
}

impl FromStr for CitationOrder {
    type Err = CodeislowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "article_code" => Ok(Self::ArticleCode),
            "code_article" => Ok(Self::CodeArticle),
            other => Err(CodeislowError::InvalidOrder(other.to_string())),
        }
    }
}

impl fmt::Display for CitationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled citation regex plus the codes its named groups stand for.
///
/// Built per request and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CitationPattern {
    regex: Regex,
    codes: Vec<Code>,
    order: CitationOrder,
}

impl CitationPattern {
    /// Build the pattern for a code selection and citation order.
    ///
    /// An empty selection recognizes every registered code. The selection
    /// is sorted internally, so its order never changes the result.
    ///
    /// # Examples
    /// ```
    /// use codeislow::codes::create_french_code_registry;
    /// use codeislow::matching::{CitationOrder, CitationPattern};
    ///
    /// let registry = create_french_code_registry();
    /// let pattern = CitationPattern::build(&registry, &["CCIV"], CitationOrder::ArticleCode).unwrap();
    /// assert!(pattern.regex().is_match("l'article 1240 du code civil"));
    /// ```
    pub fn build<S: AsRef<str>>(
        registry: &CodeRegistry,
        selected: &[S],
        order: CitationOrder,
    ) -> Result<Self> {
        let codes: Vec<Code> = registry.select(selected)?.into_iter().cloned().collect();
        let alternation = registry.filter_alias_patterns(selected)?;

        let source = match order {
            CitationOrder::ArticleCode => {
                format!("{ARTICLE_MARKER}(?P<{REF_GROUP}>.*?){alternation}")
            }
            CitationOrder::CodeArticle => format!(
                r"{alternation},?\s+(?:(?:en|dans)\s+son\s+)?{ARTICLE_MARKER}\s*(?P<{REF_GROUP}>{ARTICLE_ID})"
            ),
        };

        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        tracing::debug!(
            order = %order,
            codes = codes.len(),
            "Built citation pattern"
        );

        Ok(Self {
            regex,
            codes,
            order,
        })
    }

    /// Parse the order flag and build in one step.
    pub fn build_with_order_name<S: AsRef<str>>(
        registry: &CodeRegistry,
        selected: &[S],
        order: &str,
    ) -> Result<Self> {
        Self::build(registry, selected, order.parse()?)
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Codes whose named groups appear in the pattern, sorted by short name.
    #[must_use]
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    #[must_use]
    pub fn order(&self) -> CitationOrder {
        self.order
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
