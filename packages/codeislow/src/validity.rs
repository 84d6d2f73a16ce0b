//! Validity classification of an article against a tolerance window.
//!
//! The window spans `years_before` years back and `years_after` years ahead
//! of today. An article is reported as recently modified, soon expiring or
//! stable across the window. A fourth verdict, not found, is produced by
//! the lookup orchestration when no article matches.

use std::fmt;

use chrono::{DateTime, Local, Months, NaiveDate};
use serde::{Serialize, Serializer};

use crate::config::{validate_year_offset, DEFAULT_YEARS_AFTER, DEFAULT_YEARS_BEFORE};
use crate::error::{CodeislowError, Result};

/// Outcome of a validity check, HTTP-inspired but unrelated to HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 204: stable across the whole window.
    NoChange,
    /// 301: modified inside the past half of the window.
    Modified,
    /// 302: current version ends inside the future half of the window.
    ExpiringSoon,
    /// 404: no matching article.
    NotFound,
}

impl StatusCode {
    #[must_use]
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::NoChange => 204,
            Self::Modified => 301,
            Self::ExpiringSoon => 302,
            Self::NotFound => 404,
        }
    }

    /// Display color shared by every renderer.
    #[must_use]
    pub fn color(&self) -> Color {
        match self {
            Self::NoChange => Color::Green,
            Self::Modified => Color::Yellow,
            Self::ExpiringSoon => Color::Orange,
            Self::NotFound => Color::Red,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Yellow,
    Orange,
    Red,
}

impl Color {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(status_code, message, color)` triple for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status_code: StatusCode,
    pub message: String,
    pub color: Color,
}

impl Verdict {
    fn new(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code,
            message,
            color: status_code.color(),
        }
    }

    #[must_use]
    pub fn no_change() -> Self {
        Self::new(StatusCode::NoChange, "No change".to_string())
    }

    #[must_use]
    pub fn modified(start: NaiveDate) -> Self {
        Self::new(
            StatusCode::Modified,
            format!("Modified on {}", start.format("%Y-%m-%d")),
        )
    }

    #[must_use]
    pub fn expiring(end: NaiveDate) -> Self {
        Self::new(
            StatusCode::ExpiringSoon,
            format!("Valid until {}", end.format("%Y-%m-%d")),
        )
    }

    /// Verdict for an article the lookup service could not find.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound, "Unavailable".to_string())
    }
}

/// Tolerance window in whole years around today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidityWindow {
    pub years_before: u32,
    pub years_after: u32,
}

impl Default for ValidityWindow {
    fn default() -> Self {
        Self {
            years_before: DEFAULT_YEARS_BEFORE,
            years_after: DEFAULT_YEARS_AFTER,
        }
    }
}

impl ValidityWindow {
    /// Build a window, rejecting negative offsets.
    ///
    /// # Examples
    /// ```
    /// use codeislow::validity::ValidityWindow;
    ///
    /// let window = ValidityWindow::new(2, 5).unwrap();
    /// assert_eq!(window.years_before, 2);
    /// assert!(ValidityWindow::new(-1, 5).is_err());
    /// ```
    pub fn new(years_before: i64, years_after: i64) -> Result<Self> {
        Ok(Self {
            years_before: validate_year_offset(years_before)?,
            years_after: validate_year_offset(years_after)?,
        })
    }

    /// `(past_boundary, future_boundary)` for a given day.
    ///
    /// Calendar arithmetic: Feb 29 shifted to a non-leap year lands on
    /// Feb 28.
    pub fn boundaries(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let past = today
            .checked_sub_months(years_as_months(self.years_before))
            .ok_or_else(|| CodeislowError::InvalidYearOffset(self.years_before.to_string()))?;
        let future = today
            .checked_add_months(years_as_months(self.years_after))
            .ok_or_else(|| CodeislowError::InvalidYearOffset(self.years_after.to_string()))?;
        Ok((past, future))
    }

    /// Classify against the local current date.
    pub fn classify(&self, start: NaiveDate, end: NaiveDate) -> Result<Verdict> {
        self.classify_at(start, end, Local::now().date_naive())
    }

    /// Classify against an explicit `today`.
    ///
    /// Rules are checked in order and the first one wins: a start after the
    /// past boundary is a modification, an end before the future boundary
    /// is an upcoming expiry, anything else is stable.
    pub fn classify_at(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Verdict> {
        let (past_boundary, future_boundary) = self.boundaries(today)?;

        let verdict = if start > past_boundary {
            Verdict::modified(start)
        } else if end < future_boundary {
            Verdict::expiring(end)
        } else {
            Verdict::no_change()
        };
        Ok(verdict)
    }
}

fn years_as_months(years: u32) -> Months {
    Months::new(years.saturating_mul(12))
}

/// Classify an article's force dates with raw year offsets.
///
/// Negative offsets are rejected with `InvalidYearOffset`.
///
/// # Arguments
/// * `start` - First day the article version is in force
/// * `end` - Last day the article version is in force
/// * `years_before` - Years before today counted as recent
/// * `years_after` - Years after today counted as soon
///
/// # Returns
/// A 301, 302 or 204 verdict against today's local date
pub fn classify(start: NaiveDate, end: NaiveDate, years_before: i64, years_after: i64) -> Result<Verdict> {
    ValidityWindow::new(years_before, years_after)?.classify(start, end)
}

/// Convert a Legifrance epoch-millisecond timestamp to a UTC date.
#[must_use]
pub fn date_from_epoch_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Current instant as epoch milliseconds, as Legifrance date filters expect.
#[must_use]
pub fn now_epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
