//! Types for the code registry.

use serde::Serialize;

/// A body of French statutory law.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    /// Stable key, also used as the regex capture group name (e.g. "CCIV").
    pub short_name: String,

    /// Display form (e.g. "Code civil"), as spelled by Legifrance.
    pub long_name: String,

    /// Regex fragment matching every textual alias of the code.
    ///
    /// The fragment carries no capture group of its own; the pattern
    /// builder wraps it in a named group keyed by `short_name`.
    #[serde(skip)]
    pub alias_pattern: String,
}

impl Code {
    /// Create a new code.
    #[must_use]
    pub fn new(
        short_name: impl Into<String>,
        long_name: impl Into<String>,
        alias_pattern: impl Into<String>,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            long_name: long_name.into(),
            alias_pattern: alias_pattern.into(),
        }
    }

    /// Alias fragment wrapped in a named capture group.
    ///
    /// # Examples
    /// ```
    /// use codeislow::codes::Code;
    ///
    /// let code = Code::new("CJA", "Code de justice administrative", r"CJA");
    /// assert_eq!(code.named_pattern(), "(?P<CJA>CJA)");
    /// ```
    #[must_use]
    pub fn named_pattern(&self) -> String {
        format!("(?P<{}>{})", self.short_name, self.alias_pattern)
    }
}
