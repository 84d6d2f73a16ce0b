//! Error types for codeislow.
//!
//! A single `CodeislowError` covers the three failure families the pipeline
//! knows about: caller configuration mistakes, collaborator failures
//! (document extraction, Legifrance lookups) and output serialization.
//! Data absence (no citation, unknown article) is never an error.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the codeislow library.
#[derive(Debug, Error)]
pub enum CodeislowError {
    /// Citation order flag is not one of the recognized values.
    #[error("Invalid citation order: '{0}'. Expected 'article_code' or 'code_article'")]
    InvalidOrder(String),

    /// Year offset is not a non-negative integer.
    #[error("Invalid year offset: '{0}'. Expected a non-negative integer")]
    InvalidYearOffset(String),

    /// Short code is not part of the code registry.
    #[error("Unknown code: '{0}'. Run `codeislow codes` for the supported list")]
    UnknownCode(String),

    /// More than one code group captured on the same match.
    #[error("Ambiguous code match: {} captured the same span", .codes.join(", "))]
    AmbiguousCodeMatch { codes: Vec<String> },

    /// Composed citation pattern failed to compile.
    #[error("Invalid citation pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Other configuration problem (environment, CLI arguments).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document type is not handled by any extractor.
    #[error("Unsupported document extension: '{0}'. Accepted: odt, docx, pdf, txt, md")]
    UnsupportedExtension(String),

    /// Document path does not exist.
    #[error("Document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// Extractor could not read the document body.
    #[error("Failed to extract text from {}: {message}", .path.display())]
    Extraction { path: PathBuf, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Office document archive could not be read.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// No API credentials configured.
    #[error("No credentials: API_KEY and/or API_SECRET are not set. Register an application at https://piste.gouv.fr/")]
    MissingCredentials,

    /// Authentication server rejected the credentials.
    #[error("Invalid credentials: authentication server answered {status}")]
    InvalidCredentials { status: u16 },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Lookup service answered with a non-success status.
    #[error("Lookup failed with status {status}: {message}")]
    LookupFailed { status: u16, message: String },

    /// Transient failures persisted across every attempt.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl CodeislowError {
    /// Whether the error comes from caller configuration rather than a collaborator.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidOrder(_)
                | Self::InvalidYearOffset(_)
                | Self::UnknownCode(_)
                | Self::AmbiguousCodeMatch { .. }
                | Self::Pattern(_)
                | Self::Config(_)
        )
    }
}

/// Result type alias for codeislow operations.
pub type Result<T> = std::result::Result<T, CodeislowError>;
