//! Code is low - Find citations of French codes in legal documents and
//! check whether the cited articles recently changed or are about to.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use codeislow::codes::create_french_code_registry;
//! use codeislow::matching::{detect_citations, CitationOrder};
//! use codeislow::validity::ValidityWindow;
//!
//! let registry = create_french_code_registry();
//! let citations = detect_citations(
//!     &registry,
//!     "Vu l'article L. 248-1 du Code de la consommation",
//!     &["CCONSO"],
//!     CitationOrder::ArticleCode,
//! )
//! .unwrap();
//! assert_eq!(citations[0].article.as_str(), "L248-1");
//!
//! let window = ValidityWindow::new(2, 2).unwrap();
//! let today = NaiveDate::from_ymd_opt(2022, 11, 10).unwrap();
//! let verdict = window
//!     .classify_at(
//!         NaiveDate::from_ymd_opt(2022, 8, 4).unwrap(),
//!         NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
//!         today,
//!     )
//!     .unwrap();
//! assert_eq!(verdict.status_code.as_u16(), 301);
//! ```
//!
//! # Architecture
//!
//! - [`codes`]: Code registry (short name, long name, alias pattern)
//! - [`matching`]: Pattern builder, citation scanner, reference normalizer
//! - [`validity`]: Validity window and classifier
//! - [`document`]: Paragraph extraction from txt, md, pdf, docx and odt
//! - [`legifrance`]: Legifrance API client and the `ArticleLookup` trait
//! - [`checker`]: Lookup plus classification per cited article
//! - [`report`]: YAML, JSON and terminal rendering
//! - [`config`]: Constants, environment settings and validation
//! - [`http`]: HTTP client with retries
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod checker;
pub mod cli;
pub mod codes;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod legifrance;
pub mod matching;
pub mod report;
pub mod validity;

pub use checker::{check_article, ArticleChecker, ArticleReport};
pub use codes::{create_french_code_registry, Code, CodeRegistry};
pub use error::{CodeislowError, Result};
pub use legifrance::{ArticleLookup, ArticleRecord, LegifranceClient};
pub use matching::{detect_citations, Citation, CitationOrder, ReferenceToken};
pub use validity::{classify, StatusCode, ValidityWindow, Verdict};
