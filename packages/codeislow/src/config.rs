//! Configuration constants and validation functions.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CodeislowError, Result};

/// Root URL of the Legifrance API (PISTE sandbox).
pub const LEGIFRANCE_API_URL: &str =
    "https://sandbox-api.piste.gouv.fr/dila/legifrance-beta/lf-engine-app";

/// OAuth token endpoint for the Legifrance API.
pub const LEGIFRANCE_TOKEN_URL: &str = "https://sandbox-oauth.piste.gouv.fr/api/oauth/token";

/// Public URL prefix for a consolidated code article.
pub const LEGIFRANCE_ARTICLE_URL: &str = "https://www.legifrance.gouv.fr/codes/article_lc";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default number of years looked back when classifying an article.
pub const DEFAULT_YEARS_BEFORE: u32 = 3;

/// Default number of years looked ahead when classifying an article.
pub const DEFAULT_YEARS_AFTER: u32 = 3;

/// Document extensions the parser accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["odt", "docx", "pdf", "txt", "md"];

/// Text wrap width for terminal output.
pub const TEXT_WRAP_WIDTH: usize = 80;

/// Legifrance article identifier: LEGIARTI followed by 12 digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LEGIARTI\d{12}$").expect("valid regex"));

/// Validate a year offset for the validity window.
///
/// # Examples
/// ```
/// use codeislow::config::validate_year_offset;
///
/// assert_eq!(validate_year_offset(3).unwrap(), 3);
/// assert!(validate_year_offset(-1).is_err());
/// ```
pub fn validate_year_offset(years: i64) -> Result<u32> {
    u32::try_from(years).map_err(|_| CodeislowError::InvalidYearOffset(years.to_string()))
}

/// Parse a textual year offset (from CLI or environment).
pub fn parse_year_offset(value: &str) -> Result<u32> {
    let years: i64 = value
        .trim()
        .parse()
        .map_err(|_| CodeislowError::InvalidYearOffset(value.to_string()))?;
    validate_year_offset(years)
}

/// Split a comma-separated list of short codes.
///
/// Whitespace around entries is ignored, entries are upper-cased and
/// empty entries dropped. Membership is checked by the registry.
///
/// # Examples
/// ```
/// use codeislow::config::split_code_list;
///
/// assert_eq!(split_code_list("cciv, CPP,"), vec!["CCIV", "CPP"]);
/// assert!(split_code_list("").is_empty());
/// ```
pub fn split_code_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether a string looks like a Legifrance article identifier.
#[must_use]
pub fn is_article_id(id: &str) -> bool {
    ARTICLE_ID_PATTERN.is_match(id)
}

/// Build the public Legifrance URL for an article identifier.
///
/// # Examples
/// ```
/// use codeislow::config::article_url;
///
/// assert_eq!(
///     article_url("LEGIARTI000032041571"),
///     "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000032041571"
/// );
/// ```
pub fn article_url(article_id: &str) -> String {
    format!("{LEGIFRANCE_ARTICLE_URL}/{article_id}")
}

/// Connection settings for the Legifrance API.
///
/// NOTE: `Debug` is implemented by hand so the secret never reaches logs.
#[derive(Clone)]
pub struct LegifranceConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: String,
    pub token_url: String,
    pub timeout_secs: u64,
}

impl LegifranceConfig {
    /// Read settings from the environment, loading a `.env` file if present.
    ///
    /// Credentials are optional at this stage: their absence surfaces as
    /// `MissingCredentials` on the first lookup, so detection-only runs
    /// never need them.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let timeout_secs = match std::env::var("LEGIFRANCE_TIMEOUT_SECS") {
            Ok(v) => v.trim().parse().map_err(|_| {
                CodeislowError::Config(format!("LEGIFRANCE_TIMEOUT_SECS is not a number: {v}"))
            })?,
            Err(_) => HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            client_id: non_empty_var("API_KEY"),
            client_secret: non_empty_var("API_SECRET"),
            api_url: non_empty_var("LEGIFRANCE_API_URL")
                .unwrap_or_else(|| LEGIFRANCE_API_URL.to_string()),
            token_url: non_empty_var("LEGIFRANCE_TOKEN_URL")
                .unwrap_or_else(|| LEGIFRANCE_TOKEN_URL.to_string()),
            timeout_secs,
        })
    }

    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            api_url: LEGIFRANCE_API_URL.to_string(),
            token_url: LEGIFRANCE_TOKEN_URL.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Both credentials, or `MissingCredentials`.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(CodeislowError::MissingCredentials),
        }
    }
}

impl std::fmt::Debug for LegifranceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegifranceConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_year_offset() {
        assert_eq!(validate_year_offset(0).unwrap(), 0);
        assert_eq!(validate_year_offset(2).unwrap(), 2);
        assert!(validate_year_offset(-2).is_err());
        assert!(validate_year_offset(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_parse_year_offset() {
        assert_eq!(parse_year_offset(" 5 ").unwrap(), 5);
        assert!(matches!(
            parse_year_offset("2.5"),
            Err(CodeislowError::InvalidYearOffset(_))
        ));
        assert!(parse_year_offset("-3").is_err());
        assert!(parse_year_offset("three").is_err());
    }

    #[test]
    fn test_split_code_list() {
        assert_eq!(split_code_list("CJA,cpp , ccIV"), vec!["CJA", "CPP", "CCIV"]);
        assert!(split_code_list(" , ,").is_empty());
    }

    #[test]
    fn test_is_article_id() {
        assert!(is_article_id("LEGIARTI000006307920"));
        assert!(!is_article_id("LEGIARTI0000"));
        assert!(!is_article_id("JORFARTI000006307920"));
    }

    #[test]
    fn test_config_builders() {
        let config = LegifranceConfig::new("id", "secret")
            .with_api_url("http://localhost:1234/")
            .with_token_url("http://localhost:1234/token")
            .with_timeout_secs(5);

        assert_eq!(config.api_url, "http://localhost:1234");
        assert_eq!(config.token_url, "http://localhost:1234/token");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.credentials().unwrap(), ("id", "secret"));
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = LegifranceConfig::new("id", "secret");
        config.client_secret = None;
        assert!(matches!(
            config.credentials(),
            Err(CodeislowError::MissingCredentials)
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = LegifranceConfig::new("id", "top-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
