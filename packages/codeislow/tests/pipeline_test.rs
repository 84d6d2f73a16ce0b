//! End-to-end tests of the offline pipeline: extraction, detection,
//! checking against an in-memory lookup and report generation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use codeislow::checker::ArticleChecker;
use codeislow::codes::create_french_code_registry;
use codeislow::document::DocumentParser;
use codeislow::legifrance::{ArticleLookup, ArticleRecord};
use codeislow::matching::{detect_citations, detect_citations_grouped, CitationOrder};
use codeislow::report::{generate_report, ReportFormat};
use codeislow::validity::{StatusCode, ValidityWindow};
use codeislow::Result;
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Lookup serving a fixed set of articles.
struct FixedLookup(HashMap<(&'static str, &'static str), (NaiveDate, NaiveDate)>);

impl ArticleLookup for FixedLookup {
    fn resolve(&self, short_code: &str, article: &str) -> Result<Option<ArticleRecord>> {
        Ok(self
            .0
            .iter()
            .find(|((code, num), _)| *code == short_code && *num == article)
            .map(|((_, num), (start, end))| ArticleRecord {
                id: format!("LEGIARTI{:0>12}", num.replace(['L', '-'], "")),
                num: (*num).to_string(),
                text: format!("Texte de l'article {num}."),
                state: "VIGUEUR".to_string(),
                start: *start,
                end: *end,
                version_count: 1,
                url: format!("https://www.legifrance.gouv.fr/codes/article_lc/{num}"),
            }))
    }
}

fn fixed_lookup() -> FixedLookup {
    let mut articles = HashMap::new();
    articles.insert(("CCIV", "1240"), (date(2016, 10, 1), date(2999, 1, 1)));
    articles.insert(("CCIV", "1241"), (date(2016, 10, 1), date(2999, 1, 1)));
    articles.insert(("CCIV", "1242"), (date(2016, 10, 1), date(2999, 1, 1)));
    articles.insert(("CCONSO", "L121-1"), (date(2021, 12, 1), date(2999, 1, 1)));
    articles.insert(("CPRCIV", "700"), (date(2013, 1, 1), date(2023, 3, 1)));
    FixedLookup(articles)
}

#[test]
fn test_detect_fixture_citations() {
    let registry = create_french_code_registry();
    let text = DocumentParser::new()
        .full_text(&fixture("conclusions.txt"))
        .unwrap();
    let none: [&str; 0] = [];
    let citations = detect_citations(&registry, &text, &none, CitationOrder::ArticleCode).unwrap();

    let pairs: Vec<(&str, &str)> = citations
        .iter()
        .map(|c| (c.code.as_str(), c.article.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("CCIV", "1240"),
            ("CCIV", "1241"),
            ("CCIV", "1242"),
            ("CCONSO", "L121-1"),
            ("CCONSO", "L212-1-2"),
            ("CPRCIV", "700"),
            ("CCIV", "1240"),
        ]
    );
}

#[test]
fn test_grouped_fixture_citations() {
    let registry = create_french_code_registry();
    let text = DocumentParser::new()
        .full_text(&fixture("conclusions.txt"))
        .unwrap();
    let none: [&str; 0] = [];
    let grouped =
        detect_citations_grouped(&registry, &text, &none, CitationOrder::ArticleCode).unwrap();

    let summary: Vec<(String, Vec<String>)> = grouped
        .into_iter()
        .map(|(code, tokens)| (code, tokens.iter().map(ToString::to_string).collect()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                "CCIV".to_string(),
                vec!["1240".to_string(), "1241".to_string(), "1242".to_string(), "1240".to_string()]
            ),
            ("CCONSO".to_string(), vec!["L121-1".to_string(), "L212-1-2".to_string()]),
            ("CPRCIV".to_string(), vec!["700".to_string()]),
        ]
    );
}

#[test]
fn test_check_fixture_document() {
    let registry = create_french_code_registry();
    let lookup = fixed_lookup();
    let checker = ArticleChecker::new(&registry, &lookup)
        .with_window(ValidityWindow::new(2, 2).unwrap())
        .with_today(date(2022, 11, 10));

    let none: [&str; 0] = [];
    let reports = checker
        .check_document(
            &DocumentParser::new(),
            &fixture("conclusions.txt"),
            &none,
            CitationOrder::ArticleCode,
        )
        .unwrap();

    let statuses: Vec<(&str, &str, StatusCode)> = reports
        .iter()
        .map(|r| (r.code.as_str(), r.article.as_str(), r.status_code))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("CCIV", "1240", StatusCode::NoChange),
            ("CCIV", "1241", StatusCode::NoChange),
            ("CCIV", "1242", StatusCode::NoChange),
            ("CCONSO", "L121-1", StatusCode::Modified),
            ("CCONSO", "L212-1-2", StatusCode::NotFound),
            ("CPRCIV", "700", StatusCode::ExpiringSoon),
        ]
    );

    let yaml = generate_report(&reports, ReportFormat::Yaml).unwrap();
    assert!(yaml.contains("total: 6"));
    assert!(yaml.contains("Modified on 2021-12-01"));
    assert!(yaml.contains("Valid until 2023-03-01"));
}

#[test]
fn test_document_without_citation() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("lettre.txt");
    std::fs::write(&path, "Madame, Monsieur,\nVeuillez agréer nos salutations.\n").unwrap();

    let registry = create_french_code_registry();
    let lookup = fixed_lookup();
    let checker = ArticleChecker::new(&registry, &lookup);
    let none: [&str; 0] = [];
    let reports = checker
        .check_document(&DocumentParser::new(), &path, &none, CitationOrder::ArticleCode)
        .unwrap();
    assert!(reports.is_empty());
}
