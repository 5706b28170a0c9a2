//! Log line parsing for the two coexisting entry layouts.
//!
//! A timesheet log mixes two historical layouts:
//!
//! - current: `start, end, project[, sub-project...]`
//! - legacy:  `project, sub-project, start, end`
//!
//! The layout of a line is detected by trying to read its first field as a
//! date. Dates always use `dd/MM/yyyy`.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `chrono` pattern for `dd/MM/yyyy`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a `dd/MM/yyyy` date as midnight of that day.
pub fn parse_date(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map(|date| date.and_time(NaiveTime::MIN))
}

/// Field orderings a log line may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// `start, end, project[, sub-project...]`
    Current,
    /// `project, sub-project, start, end`
    Legacy,
}

impl Layout {
    /// Order in which layouts are offered a line. The first one that claims
    /// the line parses it.
    pub const DETECTION_ORDER: [Self; 2] = [Self::Current, Self::Legacy];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Legacy => "legacy",
        }
    }

    /// Number of comma-separated fields the layout splits a line into.
    const fn field_limit(self) -> usize {
        match self {
            Self::Current => 3,
            Self::Legacy => 4,
        }
    }

    /// Whether a (trimmed) line uses this layout.
    ///
    /// The legacy layout claims every line, so detection always succeeds.
    pub fn claims(self, line: &str) -> bool {
        match self {
            Self::Current => {
                let first = line.split(',').next().unwrap_or_default();
                parse_date(first.trim()).is_ok()
            }
            Self::Legacy => true,
        }
    }

    /// Returns the layout a line uses.
    pub fn detect(line: &str) -> Self {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|layout| layout.claims(line))
            .unwrap_or(Self::Legacy)
    }

    /// Extracts an entry from a line already claimed by this layout.
    pub fn parse(self, line: &str, scope: KeyScope) -> Result<ParsedEntry, ParseFailure> {
        let fields = split_fields(line, self.field_limit());
        let (start, end, key) = match (self, fields.as_slice()) {
            (Self::Current, &[start, end, remainder]) => (start, end, scope.apply(remainder)),
            // The sub-project never takes part in the key.
            (Self::Legacy, &[project, _sub_project, start, end]) => (start, end, project),
            _ => {
                return Err(ParseFailure::MissingFields {
                    layout: self,
                    expected: self.field_limit(),
                    found: fields.len(),
                });
            }
        };

        Ok(ParsedEntry {
            start: self.date_field(start)?,
            end: self.date_field(end)?,
            project_key: key.to_string(),
            layout: self,
        })
    }

    fn date_field(self, value: &str) -> Result<NaiveDateTime, ParseFailure> {
        parse_date(value).map_err(|_| ParseFailure::InvalidDate {
            layout: self,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of the current layout's remainder becomes the project key.
///
/// Legacy lines always key on their first field. Current lines key on
/// everything after the two dates, which may still carry sub-project
/// segments (`ProjectA, SubX`). `TopLevel` cuts that remainder at its first
/// comma so both layouts key on the top-level project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyScope {
    #[default]
    Remainder,
    TopLevel,
}

impl KeyScope {
    fn apply(self, remainder: &str) -> &str {
        match self {
            Self::Remainder => remainder,
            Self::TopLevel => remainder.split(',').next().unwrap_or(remainder).trim_end(),
        }
    }
}

/// A log line reduced to its interval and project key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub project_key: String,
    pub layout: Layout,
}

/// Why a line could not be read as an entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("{layout} layout expects {expected} fields, found {found}")]
    MissingFields {
        layout: Layout,
        expected: usize,
        found: usize,
    },

    #[error("{layout} layout: {value:?} is not a dd/MM/yyyy date")]
    InvalidDate { layout: Layout, value: String },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Parses one raw log line.
///
/// Surrounding whitespace is ignored, both around the line and around each
/// comma that separates fields.
pub fn parse_line(line: &str, scope: KeyScope) -> Result<ParsedEntry, ParseFailure> {
    let line = line.trim();
    Layout::detect(line).parse(line, scope)
}

/// Splits on commas into at most `limit` fields. The last field keeps any
/// further commas.
fn split_fields(line: &str, limit: usize) -> Vec<&str> {
    line.splitn(limit, ',').map(str::trim).collect()
}
