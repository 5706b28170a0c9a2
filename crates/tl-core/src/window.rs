//! Date windows and interval clipping.

use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::entry::DATE_FORMAT;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    #[error("window start {from} is after window end {to}")]
    Inverted {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
}

/// A half-open `[from, to)` range. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
}

impl Window {
    /// A window with no bounds on either side.
    pub const fn unbounded() -> Self {
        Self { from: None, to: None }
    }

    /// Creates a window, rejecting one whose start lies after its end.
    pub fn new(
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Self, WindowError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(WindowError::Inverted { from, to });
            }
        }
        Ok(Self { from, to })
    }

    /// Inclusive start, if bounded.
    pub const fn start(&self) -> Option<NaiveDateTime> {
        self.from
    }

    /// Exclusive end, if bounded.
    pub const fn end(&self) -> Option<NaiveDateTime> {
        self.to
    }

    pub const fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Bounds `[start, end]` to the window.
    ///
    /// Returns `None` when the bounded interval is inverted, which covers
    /// reverse entries and entries lying wholly outside the window.
    pub fn clip(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<ClippedInterval> {
        let start = match self.from {
            Some(from) if start < from => from,
            _ => start,
        };
        let end = match self.to {
            Some(to) if end > to => to,
            _ => end,
        };

        (start <= end).then_some(ClippedInterval { start, end })
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<NaiveDateTime>| {
            b.map_or_else(|| "*".to_string(), |dt| dt.format(DATE_FORMAT).to_string())
        };
        write!(f, "[{}, {})", bound(self.from), bound(self.to))
    }
}

/// An interval after clipping. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ClippedInterval {
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}
