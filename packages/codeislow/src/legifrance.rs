//! Legifrance API client.
//!
//! Resolving a cited article takes three calls:
//!
//! 1. an OAuth2 client-credentials token request (cached per client),
//! 2. `search` on the `CODE_DATE` fond for the article number, restricted to
//!    the code's long name and to today's version,
//! 3. `consult/getArticle` on the first identifier found.
//!
//! An article the search does not find is `Ok(None)`, never an error.

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::codes::CodeRegistry;
use crate::config::{article_url, is_article_id, LegifranceConfig};
use crate::error::{CodeislowError, Result};
use crate::http::{create_client, ensure_success, send_with_retry, RetryPolicy};
use crate::validity::{date_from_epoch_millis, now_epoch_millis};

/// Anything able to turn a `(code, article)` pair into an article record.
///
/// The article checker only depends on this trait, so tests can swap the
/// HTTP client for an in-memory table.
pub trait ArticleLookup {
    /// Resolve a cited article; `Ok(None)` when it does not exist.
    fn resolve(&self, short_code: &str, article: &str) -> Result<Option<ArticleRecord>>;
}

/// Current version of an article as published by Legifrance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// Legifrance identifier (`LEGIARTI...`).
    pub id: String,
    /// Article number as Legifrance spells it.
    pub num: String,
    pub text: String,
    /// Legal state, e.g. `VIGUEUR` or `MODIFIE`.
    pub state: String,
    /// In force from.
    pub start: NaiveDate,
    /// In force until (2999-01-01 when open-ended).
    pub end: NaiveDate,
    pub version_count: usize,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    recherche: Recherche<'a>,
    fond: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Recherche<'a> {
    champs: Vec<Champ<'a>>,
    filtres: Vec<Filtre<'a>>,
    page_number: u32,
    page_size: u32,
    operateur: &'static str,
    sort: &'static str,
    type_pagination: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Champ<'a> {
    type_champ: &'static str,
    criteres: Vec<Critere<'a>>,
    operateur: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Critere<'a> {
    type_recherche: &'static str,
    valeur: &'a str,
    operateur: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Filtre<'a> {
    facette: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    valeurs: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    single_date: Option<i64>,
}

impl<'a> SearchRequest<'a> {
    fn article_in_code(article: &'a str, long_code: &'a str, at_millis: i64) -> Self {
        Self {
            recherche: Recherche {
                champs: vec![Champ {
                    type_champ: "NUM_ARTICLE",
                    criteres: vec![Critere {
                        type_recherche: "EXACTE",
                        valeur: article,
                        operateur: "ET",
                    }],
                    operateur: "ET",
                }],
                filtres: vec![
                    Filtre {
                        facette: "NOM_CODE",
                        valeurs: Some(vec![long_code]),
                        single_date: None,
                    },
                    Filtre {
                        facette: "DATE_VERSION",
                        valeurs: None,
                        single_date: Some(at_millis),
                    },
                ],
                page_number: 1,
                page_size: 10,
                operateur: "ET",
                sort: "PERTINENCE",
                type_pagination: "ARTICLE",
            },
            fond: "CODE_DATE",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    sections: Option<Vec<SearchSection>>,
}

#[derive(Debug, Deserialize)]
struct SearchSection {
    #[serde(default)]
    extracts: Option<Vec<SearchExtract>>,
}

#[derive(Debug, Deserialize)]
struct SearchExtract {
    id: String,
}

impl SearchResponse {
    fn first_article_id(self) -> Option<String> {
        self.results?
            .into_iter()
            .next()?
            .sections?
            .into_iter()
            .next()?
            .extracts?
            .into_iter()
            .next()
            .map(|extract| extract.id)
    }
}

#[derive(Debug, Serialize)]
struct GetArticleRequest<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GetArticleResponse {
    #[serde(default)]
    article: Option<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    id: String,
    #[serde(default)]
    num: Option<String>,
    #[serde(default)]
    texte: Option<String>,
    #[serde(default)]
    etat: Option<String>,
    date_debut: i64,
    date_fin: i64,
    #[serde(default)]
    article_versions: Option<Vec<serde_json::Value>>,
}

impl RawArticle {
    fn into_record(self) -> Result<ArticleRecord> {
        let start = date_from_epoch_millis(self.date_debut).ok_or_else(|| {
            CodeislowError::LookupFailed {
                status: 200,
                message: format!("invalid dateDebut {} for {}", self.date_debut, self.id),
            }
        })?;
        let end = date_from_epoch_millis(self.date_fin).ok_or_else(|| {
            CodeislowError::LookupFailed {
                status: 200,
                message: format!("invalid dateFin {} for {}", self.date_fin, self.id),
            }
        })?;

        Ok(ArticleRecord {
            url: article_url(&self.id),
            num: self.num.unwrap_or_default(),
            text: self.texte.unwrap_or_default(),
            state: self.etat.unwrap_or_default(),
            start,
            end,
            version_count: self.article_versions.map_or(0, |v| v.len()),
            id: self.id,
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking Legifrance client.
pub struct LegifranceClient {
    config: LegifranceConfig,
    registry: CodeRegistry,
    client: Client,
    retry: RetryPolicy,
    token: Mutex<Option<String>>,
}

impl std::fmt::Debug for LegifranceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegifranceClient")
            .field("config", &self.config)
            .field("codes", &self.registry.len())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl LegifranceClient {
    /// Create a client. Credentials are only checked on the first call.
    pub fn new(config: LegifranceConfig, registry: CodeRegistry) -> Result<Self> {
        let client = create_client(config.timeout_secs)?;
        Ok(Self {
            config,
            registry,
            client,
            retry: RetryPolicy::default(),
            token: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_url)
    }

    /// Bearer token, requested once and cached.
    pub fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let (client_id, client_secret) = self.config.credentials()?;
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", "openid"),
        ];

        tracing::debug!(url = %self.config.token_url, "Requesting access token");
        let response = send_with_retry(&self.retry, || {
            self.client.post(&self.config.token_url).form(&form)
        })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(CodeislowError::InvalidCredentials {
                status: status.as_u16(),
            });
        }
        let token: TokenResponse = ensure_success(response)?.json()?;

        *cached = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    /// Identifier of the current version of `article` in the code named
    /// `long_code`, if any.
    pub fn search_article_id(&self, long_code: &str, article: &str) -> Result<Option<String>> {
        let token = self.access_token()?;
        let body = SearchRequest::article_in_code(article, long_code, now_epoch_millis());
        let url = self.endpoint("search");

        let response = send_with_retry(&self.retry, || {
            self.client.post(&url).bearer_auth(&token).json(&body)
        })?;
        let found: SearchResponse = ensure_success(response)?.json()?;
        let id = found.first_article_id();

        if let Some(id) = id.as_deref() {
            if !is_article_id(id) {
                tracing::warn!(id = %id, article = %article, "Unexpected article identifier format");
            }
        }
        Ok(id)
    }

    /// Fetch an article by identifier; `None` when the answer carries no article.
    pub fn get_article(&self, article_id: &str) -> Result<Option<ArticleRecord>> {
        let token = self.access_token()?;
        let body = GetArticleRequest { id: article_id };
        let url = self.endpoint("consult/getArticle");

        let response = send_with_retry(&self.retry, || {
            self.client.post(&url).bearer_auth(&token).json(&body)
        })?;
        let payload: GetArticleResponse = ensure_success(response)?.json()?;
        payload.article.map(RawArticle::into_record).transpose()
    }
}

impl ArticleLookup for LegifranceClient {
    fn resolve(&self, short_code: &str, article: &str) -> Result<Option<ArticleRecord>> {
        let long_code = self
            .registry
            .full_name_of(short_code)
            .ok_or_else(|| CodeislowError::UnknownCode(short_code.to_string()))?;

        tracing::info!(code = %short_code, article = %article, "Looking up article");
        let Some(id) = self.search_article_id(long_code, article)? else {
            tracing::info!(code = %short_code, article = %article, "Article not found");
            return Ok(None);
        };
        self.get_article(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::create_french_code_registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_request_body() {
        let body = SearchRequest::article_in_code("L248-1", "Code de la consommation", 1_000);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["fond"], "CODE_DATE");
        assert_eq!(json["recherche"]["champs"][0]["typeChamp"], "NUM_ARTICLE");
        assert_eq!(
            json["recherche"]["champs"][0]["criteres"][0],
            serde_json::json!({"typeRecherche": "EXACTE", "valeur": "L248-1", "operateur": "ET"})
        );
        assert_eq!(
            json["recherche"]["filtres"],
            serde_json::json!([
                {"facette": "NOM_CODE", "valeurs": ["Code de la consommation"]},
                {"facette": "DATE_VERSION", "singleDate": 1000}
            ])
        );
        assert_eq!(json["recherche"]["pageSize"], 10);
        assert_eq!(json["recherche"]["typePagination"], "ARTICLE");
    }

    #[test]
    fn test_first_article_id() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "results": [{"sections": [{"extracts": [{"id": "LEGIARTI000032041571"}]}]}]
        }))
        .unwrap();
        assert_eq!(
            response.first_article_id().as_deref(),
            Some("LEGIARTI000032041571")
        );
    }

    #[test]
    fn test_first_article_id_missing() {
        for payload in [
            serde_json::json!({}),
            serde_json::json!({"results": null}),
            serde_json::json!({"results": []}),
            serde_json::json!({"results": [{"sections": []}]}),
            serde_json::json!({"results": [{"sections": [{"extracts": []}]}]}),
        ] {
            let response: SearchResponse = serde_json::from_value(payload).unwrap();
            assert_eq!(response.first_article_id(), None);
        }
    }

    #[test]
    fn test_raw_article_into_record() {
        let raw: RawArticle = serde_json::from_value(serde_json::json!({
            "id": "LEGIARTI000032041571",
            "num": "1240",
            "texte": "Tout fait quelconque de l'homme...",
            "etat": "VIGUEUR",
            "dateDebut": 1_475_280_000_000_i64,
            "dateFin": 32_472_144_000_000_i64,
            "articleVersions": [{}, {}]
        }))
        .unwrap();
        let record = raw.into_record().unwrap();

        assert_eq!(record.num, "1240");
        assert_eq!(record.start, NaiveDate::from_ymd_opt(2016, 10, 1).unwrap());
        assert_eq!(record.end, NaiveDate::from_ymd_opt(2999, 1, 1).unwrap());
        assert_eq!(record.version_count, 2);
        assert_eq!(
            record.url,
            "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000032041571"
        );
    }

    #[test]
    fn test_resolve_unknown_code() {
        let client = LegifranceClient::new(
            LegifranceConfig::new("id", "secret"),
            create_french_code_registry(),
        )
        .unwrap();
        assert!(matches!(
            client.resolve("NOPE", "1"),
            Err(CodeislowError::UnknownCode(_))
        ));
    }

    #[test]
    fn test_missing_credentials_before_any_request() {
        let mut config = LegifranceConfig::new("id", "secret");
        config.client_id = None;
        let client = LegifranceClient::new(config, create_french_code_registry()).unwrap();
        assert!(matches!(
            client.access_token(),
            Err(CodeislowError::MissingCredentials)
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = LegifranceClient::new(
            LegifranceConfig::new("id", "hunter2"),
            create_french_code_registry(),
        )
        .unwrap();
        assert!(!format!("{client:?}").contains("hunter2"));
    }
}
