//! Code registry with deterministic, sorted iteration.

use std::collections::BTreeMap;

use regex::Regex;

use super::types::Code;
use crate::error::{CodeislowError, Result};

/// Immutable-after-construction registry of codes, keyed by short name.
///
/// Iteration is always in ascending lexical order of `short_name`, so every
/// pattern built from the same selection is byte-identical.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    codes: BTreeMap<String, Code>,
}

impl CodeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Register a code, replacing any previous entry with the same short name.
    pub fn register(&mut self, code: Code) {
        self.codes.insert(code.short_name.clone(), code);
    }

    /// Get a code by short name.
    #[must_use]
    pub fn get(&self, short_name: &str) -> Option<&Code> {
        self.codes.get(short_name)
    }

    /// All codes, sorted by short name.
    pub fn codes(&self) -> impl Iterator<Item = &Code> {
        self.codes.values()
    }

    /// All short names, sorted.
    pub fn short_names(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Full name for a short code.
    ///
    /// A name that is already a registered long name is returned as-is, so
    /// callers holding either form get the display name back.
    #[must_use]
    pub fn full_name_of(&self, name: &str) -> Option<&str> {
        if let Some(code) = self.codes.get(name) {
            return Some(&code.long_name);
        }
        self.find_by_long_name(name).map(|c| c.long_name.as_str())
    }

    /// Short code for a full name.
    #[must_use]
    pub fn short_code_of(&self, full_name: &str) -> Option<&str> {
        self.find_by_long_name(full_name)
            .map(|c| c.short_name.as_str())
    }

    /// Alias regex fragment for a short code.
    #[must_use]
    pub fn alias_pattern_of(&self, short_name: &str) -> Option<&str> {
        self.codes.get(short_name).map(|c| c.alias_pattern.as_str())
    }

    /// Resolve a code name given in either form to `(long_name, short_name)`.
    ///
    /// # Examples
    /// ```
    /// use codeislow::codes::create_french_code_registry;
    ///
    /// let registry = create_french_code_registry();
    /// assert_eq!(registry.long_and_short_of("CCIV"), Some(("Code civil", "CCIV")));
    /// assert_eq!(registry.long_and_short_of("Code civil"), Some(("Code civil", "CCIV")));
    /// assert_eq!(registry.long_and_short_of("Code Napoléon"), None);
    /// ```
    #[must_use]
    pub fn long_and_short_of(&self, name: &str) -> Option<(&str, &str)> {
        self.codes
            .get(name)
            .or_else(|| self.find_by_long_name(name))
            .map(|c| (c.long_name.as_str(), c.short_name.as_str()))
    }

    /// Select codes by short name, sorted and deduplicated.
    ///
    /// An empty selection means "no restriction" and returns every code.
    /// Unknown short names are a configuration error.
    pub fn select<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<&Code>> {
        if selected.is_empty() {
            return Ok(self.codes.values().collect());
        }

        let mut picked: BTreeMap<&str, &Code> = BTreeMap::new();
        for name in selected {
            let name = name.as_ref();
            let code = self
                .codes
                .get(name)
                .ok_or_else(|| CodeislowError::UnknownCode(name.to_string()))?;
            picked.insert(&code.short_name, code);
        }
        Ok(picked.into_values().collect())
    }

    /// Alternation of the named alias fragments of the selected codes.
    ///
    /// Codes are alternated in ascending order of short name regardless of
    /// the order of `selected`.
    pub fn filter_alias_patterns<S: AsRef<str>>(&self, selected: &[S]) -> Result<String> {
        let alternatives: Vec<String> = self
            .select(selected)?
            .into_iter()
            .map(Code::named_pattern)
            .collect();
        Ok(format!("(?:{})", alternatives.join("|")))
    }

    /// `(short_name, long_name)` pairs of the selected codes, sorted.
    pub fn filter_reference<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<(&str, &str)>> {
        Ok(self
            .select(selected)?
            .into_iter()
            .map(|c| (c.short_name.as_str(), c.long_name.as_str()))
            .collect())
    }

    /// Check that every entry can take part in a composed pattern.
    ///
    /// Short names must be usable as capture group names and alias
    /// fragments must compile on their own.
    pub fn validate(&self) -> Result<()> {
        for code in self.codes.values() {
            let valid_name = code
                .short_name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && code
                    .short_name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid_name {
                return Err(CodeislowError::Config(format!(
                    "short name '{}' cannot be used as a capture group name",
                    code.short_name
                )));
            }
            if code.long_name.trim().is_empty() {
                return Err(CodeislowError::Config(format!(
                    "code '{}' has an empty long name",
                    code.short_name
                )));
            }
            Regex::new(&code.alias_pattern)?;
        }
        Ok(())
    }

    fn find_by_long_name(&self, long_name: &str) -> Option<&Code> {
        self.codes.values().find(|c| c.long_name == long_name)
    }
}
