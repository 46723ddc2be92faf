//! The spreadsheet record model and sweep context.
//!
//! One `Record` per data row. Identity is the 1-based sheet row (header is
//! row 1, data starts at row 2) — there is no surrogate key. Ingestion maps
//! loosely-typed cells onto named fields once; everything downstream works
//! with trimmed strings.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde_json::Value;

use crate::timefmt;

/// Source date format for the completion date.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Header label of the write-back column, matched case-insensitively.
pub const STATUS_COLUMN: &str = "certificate sent";

/// One course-completion row.
#[derive(Debug, Clone)]
pub struct Record {
    /// 1-based sheet row this record came from.
    pub row: usize,
    pub name: String,
    pub course: String,
    pub month: String,
    /// Raw completion date, `MM/DD/YYYY`.
    pub date_of_completion: String,
    /// Scheduled time, normalized to `HH:MM` at ingestion.
    pub scheduled_time: String,
    pub email: String,
    /// Tri-state: "yes" / "no" / anything else counts as not-sent.
    pub certificate_sent: String,
}

impl Record {
    /// Build a record from a header row and one data row of raw cells.
    /// Missing columns yield empty fields.
    pub fn from_cells(row: usize, header: &[String], cells: &[Value]) -> Self {
        let field = |label: &str| -> String {
            find_column(header, label)
                .and_then(|col| cells.get(col - 1))
                .map(cell_text)
                .unwrap_or_default()
        };
        let scheduled_time = find_column(header, "scheduled time")
            .and_then(|col| cells.get(col - 1))
            .map(timefmt::normalize_value)
            .unwrap_or_default();

        Self {
            row,
            name: field("name"),
            course: field("course"),
            month: field("month"),
            date_of_completion: field("date of completion"),
            scheduled_time,
            email: field("email"),
            certificate_sent: field(STATUS_COLUMN),
        }
    }

    /// Whether the row is already marked as delivered.
    pub fn already_sent(&self) -> bool {
        self.certificate_sent.trim().eq_ignore_ascii_case("yes")
    }

    /// Whether every field the pipeline needs is present.
    pub fn is_complete(&self) -> bool {
        !(self.name.is_empty()
            || self.email.is_empty()
            || self.date_of_completion.is_empty()
            || self.scheduled_time.is_empty()
            || self.course.is_empty()
            || self.month.is_empty())
    }

    /// Strictly parse the completion date.
    pub fn completion_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_of_completion, DATE_FORMAT).ok()
    }

    /// Strictly parse the normalized scheduled time. `None` when
    /// normalization fell through to the raw cell text.
    pub fn scheduled_hhmm(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.scheduled_time, "%H:%M").ok()
    }
}

/// Date and time of the current sweep, derived from the configured timezone.
#[derive(Debug, Clone)]
pub struct SweepContext {
    pub current_date: NaiveDate,
    /// Zero-padded `HH:MM`, comparable lexicographically.
    pub current_time: String,
}

impl SweepContext {
    pub fn now(timezone: Tz) -> Self {
        let now = chrono::Utc::now().with_timezone(&timezone);
        Self {
            current_date: now.date_naive(),
            current_time: now.format("%H:%M").to_string(),
        }
    }
}

/// Locate the 1-based index of a header cell, case-insensitively.
pub fn find_column(header: &[String], label: &str) -> Option<usize> {
    header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(label))
        .map(|i| i + 1)
}

/// Render a raw cell as trimmed text.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
