//! Command-line interface.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::checker::ArticleChecker;
use crate::codes::{create_french_code_registry, CodeRegistry};
use crate::config::{parse_year_offset, split_code_list, LegifranceConfig};
use crate::document::DocumentParser;
use crate::error::{CodeislowError, Result};
use crate::legifrance::LegifranceClient;
use crate::matching::{detect_citations, group_by_code, normalize_reference, CitationOrder};
use crate::report::{generate_report, save_report, ReportFormat};
use crate::validity::ValidityWindow;

/// Code is low - Find French code citations in a document and check them on Legifrance.
#[derive(Parser)]
#[command(name = "codeislow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the supported codes.
    Codes,

    /// Detect the articles cited in a document (no network access).
    Detect {
        /// Document to analyse (odt, docx, pdf, txt, md)
        file: PathBuf,

        /// Comma-separated short codes to look for (default: all)
        #[arg(short, long)]
        codes: Option<String>,

        /// Citation order: article_code or code_article
        #[arg(long, default_value = "article_code")]
        order: String,
    },

    /// Detect cited articles and check their validity on Legifrance.
    Check {
        /// Document to analyse (odt, docx, pdf, txt, md)
        file: PathBuf,

        /// Comma-separated short codes to look for (default: all)
        #[arg(short, long)]
        codes: Option<String>,

        /// Citation order: article_code or code_article
        #[arg(long, default_value = "article_code")]
        order: String,

        /// Years before today counting as a recent modification
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        past: String,

        /// Years after today counting as an upcoming expiry
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        future: String,

        /// Output format: table, yaml or json
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a single article.
    Article {
        /// Short code (e.g. CCIV) or full code name
        code: String,

        /// Article number (e.g. L121-1, "L. 121-1", 1240)
        article: String,

        /// Years before today counting as a recent modification
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        past: String,

        /// Years after today counting as an upcoming expiry
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        future: String,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let registry = create_french_code_registry();

    match cli.command {
        Commands::Codes => codes_command(&registry),
        Commands::Detect { file, codes, order } => {
            detect_command(&registry, &file, codes.as_deref(), &order)
        }
        Commands::Check {
            file,
            codes,
            order,
            past,
            future,
            format,
            output,
        } => check_command(
            &registry,
            &file,
            codes.as_deref(),
            &order,
            window_from_args(&past, &future)?,
            format.parse()?,
            output.as_deref(),
        ),
        Commands::Article {
            code,
            article,
            past,
            future,
        } => article_command(&registry, &code, &article, window_from_args(&past, &future)?),
    }
}

fn window_from_args(past: &str, future: &str) -> Result<ValidityWindow> {
    Ok(ValidityWindow {
        years_before: parse_year_offset(past)?,
        years_after: parse_year_offset(future)?,
    })
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn codes_command(registry: &CodeRegistry) -> Result<()> {
    for code in registry.codes() {
        println!("{:<8} {}", style(&code.short_name).cyan(), code.long_name);
    }
    Ok(())
}

fn detect_command(
    registry: &CodeRegistry,
    file: &Path,
    codes: Option<&str>,
    order: &str,
) -> Result<()> {
    let selected = codes.map(split_code_list).unwrap_or_default();
    let order: CitationOrder = order.parse()?;

    let text = DocumentParser::new().full_text(file)?;
    let citations = detect_citations(registry, &text, &selected, order)?;

    if citations.is_empty() {
        println!("{}", style("No citation found.").yellow());
        return Ok(());
    }

    for (code, articles) in group_by_code(&citations) {
        let long_name = registry.full_name_of(&code).unwrap_or(code.as_str());
        let list: Vec<&str> = articles.iter().map(|a| a.as_str()).collect();
        println!(
            "{} ({}): {}",
            style(long_name).bold(),
            style(&code).cyan(),
            list.join(", ")
        );
    }
    println!();
    println!("{} {}", style("Citations:").green().bold(), citations.len());
    Ok(())
}

fn check_command(
    registry: &CodeRegistry,
    file: &Path,
    codes: Option<&str>,
    order: &str,
    window: ValidityWindow,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let selected = codes.map(split_code_list).unwrap_or_default();
    let order: CitationOrder = order.parse()?;

    let text = DocumentParser::new().full_text(file)?;
    let citations = detect_citations(registry, &text, &selected, order)?;

    let client = LegifranceClient::new(LegifranceConfig::from_env()?, registry.clone())?;
    let checker = ArticleChecker::new(registry, &client).with_window(window);

    let pb = spinner();
    let reports = checker.check_citations_with(&citations, |_, citation| {
        pb.set_message(format!("Checking {} {}...", citation.code, citation.article));
    });
    pb.finish_and_clear();
    let reports = reports?;

    let rendered = generate_report(&reports, format)?;
    match output {
        Some(path) => {
            save_report(&rendered, path)?;
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn article_command(
    registry: &CodeRegistry,
    code: &str,
    article: &str,
    window: ValidityWindow,
) -> Result<()> {
    let token = normalize_reference(article)
        .into_iter()
        .next()
        .ok_or_else(|| CodeislowError::Config(format!("'{article}' is not an article number")))?;

    let client = LegifranceClient::new(LegifranceConfig::from_env()?, registry.clone())?;
    let checker = ArticleChecker::new(registry, &client).with_window(window);

    let pb = spinner();
    pb.set_message(format!("Checking {code} {token}..."));
    let report = checker.check_article(code, token.as_str());
    pb.finish_and_clear();

    print!("{}", generate_report(&[report?], ReportFormat::Table)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_detect() {
        let cli = Cli::parse_from(["codeislow", "detect", "memo.docx", "--codes", "CCIV,CPP"]);

        let Commands::Detect { file, codes, order } = cli.command else {
            panic!("expected detect");
        };
        assert_eq!(file, PathBuf::from("memo.docx"));
        assert_eq!(codes.as_deref(), Some("CCIV,CPP"));
        assert_eq!(order, "article_code");
    }

    #[test]
    fn test_cli_parse_check_defaults() {
        let cli = Cli::parse_from(["codeislow", "check", "memo.odt"]);

        let Commands::Check {
            past,
            future,
            format,
            output,
            ..
        } = cli.command
        else {
            panic!("expected check");
        };
        assert_eq!(past, "3");
        assert_eq!(future, "3");
        assert_eq!(format, "table");
        assert!(output.is_none());
    }

    #[test]
    fn test_cli_parse_negative_years_reach_validation() {
        let cli = Cli::parse_from(["codeislow", "article", "CCIV", "1240", "--past", "-2"]);

        let Commands::Article { past, future, .. } = cli.command else {
            panic!("expected article");
        };
        assert!(matches!(
            window_from_args(&past, &future),
            Err(CodeislowError::InvalidYearOffset(v)) if v == "-2"
        ));
    }

    #[test]
    fn test_window_from_args() {
        let window = window_from_args("2", "5").unwrap();
        assert_eq!(window.years_before, 2);
        assert_eq!(window.years_after, 5);
    }
}
