//! Rendering of article reports: YAML, JSON and a terminal table.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use console::{style, StyledObject};
use serde::Serialize;
use textwrap::{fill, Options};

use crate::checker::ArticleReport;
use crate::error::{CodeislowError, Result};
use crate::validity::{Color, StatusCode};

/// Output format of the `check` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

impl ReportFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = CodeislowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(CodeislowError::Config(format!(
                "unknown report format '{other}', expected table, yaml or json"
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of reports per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub no_change: usize,
    pub modified: usize,
    pub expiring: usize,
    pub not_found: usize,
}

impl ReportSummary {
    #[must_use]
    pub fn from_reports(reports: &[ArticleReport]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.status_code {
                StatusCode::NoChange => summary.no_change += 1,
                StatusCode::Modified => summary.modified += 1,
                StatusCode::ExpiringSoon => summary.expiring += 1,
                StatusCode::NotFound => summary.not_found += 1,
            }
        }
        summary
    }
}

#[derive(Serialize)]
struct ReportFile<'a> {
    summary: ReportSummary,
    articles: &'a [ArticleReport],
}

/// Serialize reports with a summary header. `Table` renders the terminal table.
pub fn generate_report(reports: &[ArticleReport], format: ReportFormat) -> Result<String> {
    let file = ReportFile {
        summary: ReportSummary::from_reports(reports),
        articles: reports,
    };
    match format {
        ReportFormat::Yaml => Ok(serde_yaml_ng::to_string(&file)?),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&file)?),
        ReportFormat::Table => Ok(render_table(reports, crate::config::TEXT_WRAP_WIDTH)),
    }
}

fn paint<D>(value: D, color: Color) -> StyledObject<D> {
    match color {
        Color::Green => style(value).green(),
        Color::Yellow => style(value).yellow(),
        // Terminals have no orange; magenta stays distinct from yellow.
        Color::Orange => style(value).magenta(),
        Color::Red => style(value).red(),
    }
}

/// Human-readable listing: one block per article, text wrapped at `width`.
pub fn render_table(reports: &[ArticleReport], width: usize) -> String {
    if reports.is_empty() {
        return "No citation found.\n".to_string();
    }

    let mut out = String::new();
    for report in reports {
        out.push_str(&format!(
            "{} {} art. {}  {}\n",
            paint(format!("[{}]", report.status_code), report.color).bold(),
            report.code_full_name,
            style(&report.article).cyan(),
            paint(&report.message, report.color),
        ));

        if let (Some(start), Some(end)) = (report.start_date, report.end_date) {
            out.push_str(&format!("    In force: {start} to {end}\n"));
        }
        if let Some(url) = report.url.as_deref() {
            out.push_str(&format!("    {}\n", style(url).dim()));
        }
        if let Some(text) = report.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let options = Options::new(width)
                .initial_indent("    ")
                .subsequent_indent("    ");
            out.push_str(&fill(text.trim(), options));
            out.push('\n');
        }
        out.push('\n');
    }

    let summary = ReportSummary::from_reports(reports);
    out.push_str(&format!(
        "{} articles: {} unchanged, {} modified, {} expiring, {} unavailable\n",
        summary.total, summary.no_change, summary.modified, summary.expiring, summary.not_found
    ));
    out
}

/// Write a rendered report.
///
/// # Arguments
/// * `content` - Rendered report
/// * `path` - Output file; its parent directory must already exist
pub fn save_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(CodeislowError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Output directory does not exist: {}", parent.display()),
            )));
        }
    }
    fs::write(path, content)?;
    tracing::info!(path = %path.display(), "Saved report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use console::strip_ansi_codes;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn found_report() -> ArticleReport {
        ArticleReport {
            code: "CCIV".to_string(),
            code_full_name: "Code civil".to_string(),
            article: "1240".to_string(),
            status_code: StatusCode::NoChange,
            message: "No change".to_string(),
            color: Color::Green,
            id: Some("LEGIARTI000032041571".to_string()),
            url: Some(
                "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000032041571".to_string(),
            ),
            text: Some(
                "Tout fait quelconque de l'homme, qui cause à autrui un dommage, oblige celui par \
                 la faute duquel il est arrivé à le réparer."
                    .to_string(),
            ),
            start_date: NaiveDate::from_ymd_opt(2016, 10, 1),
            end_date: NaiveDate::from_ymd_opt(2999, 1, 1),
        }
    }

    fn missing_report() -> ArticleReport {
        ArticleReport {
            code: "CPEN".to_string(),
            code_full_name: "Code pénal".to_string(),
            article: "9999".to_string(),
            status_code: StatusCode::NotFound,
            message: "Unavailable".to_string(),
            color: Color::Red,
            id: None,
            url: None,
            text: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("YAML".parse::<ReportFormat>().unwrap(), ReportFormat::Yaml);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("csv".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_summary_counts() {
        let summary = ReportSummary::from_reports(&[found_report(), missing_report()]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.modified, 0);
    }

    #[test]
    fn test_generate_json() {
        let json = generate_report(&[missing_report()], ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["articles"][0]["status_code"], 404);
        assert_eq!(value["articles"][0]["color"], "red");
        assert!(value["articles"][0].get("url").is_none());
    }

    #[test]
    fn test_generate_yaml() {
        let yaml = generate_report(&[found_report()], ReportFormat::Yaml).unwrap();

        assert!(yaml.contains("code: CCIV"));
        assert!(yaml.contains("status_code: 204"));
        assert!(yaml.contains("2016-10-01"));
        assert!(yaml.contains("no_change: 1"));
    }

    #[test]
    fn test_render_table() {
        let table = strip_ansi_codes(&render_table(&[found_report(), missing_report()], 40))
            .to_string();

        assert!(table.contains("[204] Code civil art. 1240  No change"));
        assert!(table.contains("    In force: 2016-10-01 to 2999-01-01"));
        assert!(table.contains("[404] Code pénal art. 9999  Unavailable"));
        assert!(table.contains("2 articles: 1 unchanged, 0 modified, 0 expiring, 1 unavailable"));
        for line in table.lines().filter(|l| l.starts_with("    Tout") || l.starts_with("    la")) {
            assert!(line.chars().count() <= 40, "{line}");
        }
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(render_table(&[], 80), "No citation found.\n");
    }

    #[test]
    fn test_save_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.yaml");
        save_report("articles: []\n", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "articles: []\n");
    }

    #[test]
    fn test_save_report_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.yaml");
        assert!(matches!(save_report("x", &path), Err(CodeislowError::Io(_))));
    }
}
