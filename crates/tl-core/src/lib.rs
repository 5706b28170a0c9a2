//! Core log analysis for timelog.
//!
//! This crate turns a timesheet log into per-project totals:
//! - Entry parsing: detecting the layout of each line and reading its dates
//! - Windowing: clipping intervals to an optional `[from, to)` range
//! - Aggregation: summing clipped durations per project key
//! - Formatting: rendering totals as hours or shares of the total

mod aggregate;
mod analyze;
pub mod entry;
pub mod format;
mod window;

pub use aggregate::Aggregate;
pub use analyze::{
    AnalyzeError, AnalyzeOptions, Analysis, FailurePolicy, MalformedEntry, analyze_file,
    analyze_reader, analyze_str,
};
pub use entry::{KeyScope, Layout, ParseFailure, ParsedEntry, parse_date, parse_line};
pub use format::{FormatError, OutputMode, format_summary};
pub use window::{ClippedInterval, Window, WindowError};
