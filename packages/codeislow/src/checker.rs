//! Article checks: lookup plus validity classification.

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::codes::CodeRegistry;
use crate::document::DocumentParser;
use crate::error::{CodeislowError, Result};
use crate::legifrance::{ArticleLookup, ArticleRecord};
use crate::matching::{detect_citations, Citation, CitationOrder};
use crate::validity::{Color, StatusCode, ValidityWindow, Verdict};

/// Result of checking one cited article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleReport {
    /// Short code, e.g. `CCIV`.
    pub code: String,
    pub code_full_name: String,
    /// Canonical article token, e.g. `L121-1`.
    pub article: String,
    pub status_code: StatusCode,
    pub message: String,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl ArticleReport {
    fn new(code: &str, code_full_name: &str, article: &str, verdict: Verdict) -> Self {
        Self {
            code: code.to_string(),
            code_full_name: code_full_name.to_string(),
            article: article.to_string(),
            status_code: verdict.status_code,
            message: verdict.message,
            color: verdict.color,
            id: None,
            url: None,
            text: None,
            start_date: None,
            end_date: None,
        }
    }

    fn with_record(mut self, record: ArticleRecord) -> Self {
        self.start_date = Some(record.start);
        self.end_date = Some(record.end);
        self.url = Some(record.url);
        self.text = Some(record.text);
        self.id = Some(record.id);
        self
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.status_code != StatusCode::NotFound
    }
}

/// Look up one article and classify it.
///
/// An article the lookup does not find is reported with status 404; lookup
/// failures (credentials, transport) are returned as errors.
///
/// # Arguments
/// * `registry` - Code registry used to resolve `code`
/// * `lookup` - Article lookup service
/// * `code` - Short code or long name of the code
/// * `article` - Normalized article token (e.g. "L121-1")
/// * `window` - Validity window in years
/// * `today` - Anchor date of the window
///
/// # Returns
/// The article report, with status 404 when the article is unknown
pub fn check_article<L: ArticleLookup + ?Sized>(
    registry: &CodeRegistry,
    lookup: &L,
    code: &str,
    article: &str,
    window: &ValidityWindow,
    today: NaiveDate,
) -> Result<ArticleReport> {
    let (long_name, short_name) = registry
        .long_and_short_of(code)
        .ok_or_else(|| CodeislowError::UnknownCode(code.to_string()))?;

    let report = match lookup.resolve(short_name, article)? {
        Some(record) => {
            let verdict = window.classify_at(record.start, record.end, today)?;
            ArticleReport::new(short_name, long_name, article, verdict).with_record(record)
        }
        None => ArticleReport::new(short_name, long_name, article, Verdict::not_found()),
    };

    tracing::debug!(
        code = %report.code,
        article = %report.article,
        status = %report.status_code,
        "Checked article"
    );
    Ok(report)
}

/// Pipeline from citations to reports, bound to one lookup and one window.
pub struct ArticleChecker<'a, L: ArticleLookup + ?Sized> {
    registry: &'a CodeRegistry,
    lookup: &'a L,
    window: ValidityWindow,
    today: NaiveDate,
}

impl<'a, L: ArticleLookup + ?Sized> ArticleChecker<'a, L> {
    /// Checker using the default window and the local date.
    pub fn new(registry: &'a CodeRegistry, lookup: &'a L) -> Self {
        Self {
            registry,
            lookup,
            window: ValidityWindow::default(),
            today: Local::now().date_naive(),
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: ValidityWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn check_article(&self, code: &str, article: &str) -> Result<ArticleReport> {
        check_article(self.registry, self.lookup, code, article, &self.window, self.today)
    }

    /// Check every distinct cited article, in first-citation order.
    pub fn check_citations(&self, citations: &[Citation]) -> Result<Vec<ArticleReport>> {
        self.check_citations_with(citations, |_, _| {})
    }

    /// Like `check_citations`, calling `progress(index, citation)` before each lookup.
    pub fn check_citations_with<F>(
        &self,
        citations: &[Citation],
        mut progress: F,
    ) -> Result<Vec<ArticleReport>>
    where
        F: FnMut(usize, &Citation),
    {
        let unique = distinct_citations(citations);
        let mut reports = Vec::with_capacity(unique.len());
        for (index, citation) in unique.iter().enumerate() {
            progress(index, citation);
            reports.push(self.check_article(&citation.code, citation.article.as_str())?);
        }
        Ok(reports)
    }

    /// Extract, detect and check a whole document.
    pub fn check_document<S: AsRef<str>>(
        &self,
        parser: &DocumentParser,
        path: &Path,
        selected: &[S],
        order: CitationOrder,
    ) -> Result<Vec<ArticleReport>> {
        let text = parser.full_text(path)?;
        let citations = detect_citations(self.registry, &text, selected, order)?;
        tracing::info!(
            path = %path.display(),
            citations = citations.len(),
            "Detected citations"
        );
        self.check_citations(&citations)
    }
}

/// Citations with repeats removed, first occurrence kept.
#[must_use]
pub fn distinct_citations(citations: &[Citation]) -> Vec<&Citation> {
    let mut seen: Vec<&Citation> = Vec::with_capacity(citations.len());
    for citation in citations {
        if !seen.contains(&citation) {
            seen.push(citation);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::create_french_code_registry;
    use crate::matching::ReferenceToken;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory lookup keyed by `(code, article)`.
    #[derive(Default)]
    struct TableLookup {
        articles: HashMap<(String, String), ArticleRecord>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl TableLookup {
        fn with(mut self, code: &str, article: &str, start: NaiveDate, end: NaiveDate) -> Self {
            let id = format!("LEGIARTI{:012}", self.articles.len() + 1);
            self.articles.insert(
                (code.to_string(), article.to_string()),
                ArticleRecord {
                    url: crate::config::article_url(&id),
                    id,
                    num: article.to_string(),
                    text: format!("Texte de l'article {article}"),
                    state: "VIGUEUR".to_string(),
                    start,
                    end,
                    version_count: 1,
                },
            );
            self
        }
    }

    impl ArticleLookup for TableLookup {
        fn resolve(&self, short_code: &str, article: &str) -> Result<Option<ArticleRecord>> {
            self.calls
                .borrow_mut()
                .push((short_code.to_string(), article.to_string()));
            Ok(self
                .articles
                .get(&(short_code.to_string(), article.to_string()))
                .cloned())
        }
    }

    struct FailingLookup;

    impl ArticleLookup for FailingLookup {
        fn resolve(&self, _: &str, _: &str) -> Result<Option<ArticleRecord>> {
            Err(CodeislowError::InvalidCredentials { status: 401 })
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn citation(code: &str, article: &str) -> Citation {
        Citation::new(code, ReferenceToken::parse(article).unwrap())
    }

    #[test]
    fn test_check_article_found() {
        let registry = create_french_code_registry();
        let lookup = TableLookup::default().with("CCIV", "1240", date(2016, 10, 1), date(2999, 1, 1));
        let window = ValidityWindow::new(3, 3).unwrap();

        let report =
            check_article(&registry, &lookup, "CCIV", "1240", &window, date(2022, 11, 10)).unwrap();

        assert_eq!(report.code_full_name, "Code civil");
        assert_eq!(report.status_code, StatusCode::NoChange);
        assert_eq!(report.color, Color::Green);
        assert_eq!(report.start_date, Some(date(2016, 10, 1)));
        assert!(report.url.unwrap().ends_with("LEGIARTI000000000001"));
    }

    #[test]
    fn test_check_article_not_found_is_404() {
        let registry = create_french_code_registry();
        let lookup = TableLookup::default();
        let window = ValidityWindow::default();

        let report =
            check_article(&registry, &lookup, "CPEN", "9999", &window, date(2022, 11, 10)).unwrap();

        assert_eq!(report.status_code.as_u16(), 404);
        assert_eq!(report.color, Color::Red);
        assert_eq!(report.message, "Unavailable");
        assert!(!report.is_found());
        assert_eq!(report.url, None);
    }

    #[test]
    fn test_check_article_accepts_long_name() {
        let registry = create_french_code_registry();
        let lookup = TableLookup::default().with("CPEN", "121-3", date(2000, 1, 1), date(2999, 1, 1));
        let window = ValidityWindow::default();

        let report =
            check_article(&registry, &lookup, "Code pénal", "121-3", &window, date(2022, 11, 10))
                .unwrap();
        assert_eq!(report.code, "CPEN");
        assert!(report.is_found());
    }

    #[test]
    fn test_check_article_unknown_code() {
        let registry = create_french_code_registry();
        let result = check_article(
            &registry,
            &TableLookup::default(),
            "XYZ",
            "1",
            &ValidityWindow::default(),
            date(2022, 11, 10),
        );
        assert!(matches!(result, Err(CodeislowError::UnknownCode(_))));
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let registry = create_french_code_registry();
        let checker = ArticleChecker::new(&registry, &FailingLookup);
        assert!(matches!(
            checker.check_article("CCIV", "1240"),
            Err(CodeislowError::InvalidCredentials { status: 401 })
        ));
    }

    #[test]
    fn test_check_citations_dedupes_in_order() {
        let registry = create_french_code_registry();
        let lookup = TableLookup::default()
            .with("CCIV", "1240", date(2016, 10, 1), date(2999, 1, 1))
            .with("CCONSO", "L121-1", date(2022, 6, 1), date(2999, 1, 1));
        let checker = ArticleChecker::new(&registry, &lookup)
            .with_window(ValidityWindow::new(2, 2).unwrap())
            .with_today(date(2022, 11, 10));

        let citations = vec![
            citation("CCONSO", "L121-1"),
            citation("CCIV", "1240"),
            citation("CCONSO", "L121-1"),
            citation("CCIV", "1"),
        ];
        let reports = checker.check_citations(&citations).unwrap();

        let summary: Vec<(&str, &str, u16)> = reports
            .iter()
            .map(|r| (r.code.as_str(), r.article.as_str(), r.status_code.as_u16()))
            .collect();
        assert_eq!(
            summary,
            vec![("CCONSO", "L121-1", 301), ("CCIV", "1240", 204), ("CCIV", "1", 404)]
        );
        assert_eq!(lookup.calls.borrow().len(), 3);
    }

    #[test]
    fn test_progress_callback() {
        let registry = create_french_code_registry();
        let lookup = TableLookup::default();
        let checker = ArticleChecker::new(&registry, &lookup);
        let citations = vec![citation("CCIV", "1"), citation("CCIV", "2")];

        let mut seen = Vec::new();
        checker
            .check_citations_with(&citations, |i, c| seen.push((i, c.article.to_string())))
            .unwrap();
        assert_eq!(seen, vec![(0, "1".to_string()), (1, "2".to_string())]);
    }

    #[test]
    fn test_report_serialization_omits_missing_fields() {
        let report = ArticleReport::new("CCIV", "Code civil", "1", Verdict::not_found());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "CCIV",
                "code_full_name": "Code civil",
                "article": "1",
                "status_code": 404,
                "message": "Unavailable",
                "color": "red"
            })
        );
    }
}
