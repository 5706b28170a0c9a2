//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use tl_core::{Window, parse_date};

use crate::cli::PeriodArgs;

/// Pre-compiled regex for ISO week selection ("2024-W05", "2024W5", "2024wk05").
static ISO_WEEK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-?(?:[Ww][Kk]?)(\d{1,2})$").unwrap());

/// Named periods relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    LastWeek,
    Day,
    LastDay,
}

/// The window being analyzed and how an export of it is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A whole ISO week, Monday 00:00 to the next Monday 00:00.
    IsoWeek { year: i32, week: u32, window: Window },
    /// Any other window. Either side may be open.
    Range(Window),
}

impl Selection {
    pub const fn window(&self) -> Window {
        match self {
            Self::IsoWeek { window, .. } | Self::Range(window) => *window,
        }
    }

    /// Default export file name: `timesheet-2024wk05.txt` for a week,
    /// `timesheet-01012024-08012024.txt` for a range.
    pub fn file_name(&self) -> String {
        match self {
            Self::IsoWeek { year, week, .. } => format!("timesheet-{year}wk{week:02}.txt"),
            Self::Range(window) => {
                let bound = |b: Option<NaiveDateTime>| {
                    b.map_or_else(|| "open".to_string(), |dt| dt.format("%d%m%Y").to_string())
                };
                format!("timesheet-{}-{}.txt", bound(window.start()), bound(window.end()))
            }
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Selection covering ISO week `week` of `year`.
pub fn iso_week(year: i32, week: u32) -> Result<Selection> {
    let Some(monday) = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon) else {
        bail!("Invalid week: {year} has no ISO week {week}");
    };
    let window = Window::new(
        Some(midnight(monday)),
        Some(midnight(monday + Duration::days(7))),
    )?;
    Ok(Selection::IsoWeek { year, week, window })
}

/// Parse an ISO week such as "2024-W05".
pub fn parse_iso_week(s: &str) -> Result<Selection> {
    let Some(caps) = ISO_WEEK_RE.captures(s.trim()) else {
        bail!("Invalid week: {s}. Use YYYY-Www (e.g., 2024-W05)");
    };
    let year: i32 = caps[1].parse().context("failed to parse year")?;
    let week: u32 = caps[2].parse().context("failed to parse week number")?;
    iso_week(year, week)
}

/// Parse a command-line date (dd/MM/yyyy).
pub fn parse_cli_date(s: &str) -> Result<NaiveDateTime> {
    parse_date(s.trim()).with_context(|| format!("Invalid date: {s}. Use dd/MM/yyyy (e.g., 31/01/2024)"))
}

fn week_containing(date: NaiveDate) -> Result<Selection> {
    let iso = date.iso_week();
    iso_week(iso.year(), iso.week())
}

fn single_day(date: NaiveDate) -> Result<Selection> {
    let window = Window::new(
        Some(midnight(date)),
        Some(midnight(date + Duration::days(1))),
    )?;
    Ok(Selection::Range(window))
}

/// Get the selection for a named period, using `today` as reference.
pub fn period_selection(period: Period, today: NaiveDate) -> Result<Selection> {
    match period {
        Period::Week => week_containing(today),
        Period::LastWeek => week_containing(today - Duration::days(7)),
        Period::Day => single_day(today),
        Period::LastDay => single_day(today - Duration::days(1)),
    }
}

/// Resolve the period flags of a command into a selection.
pub fn resolve_selection(args: &PeriodArgs, today: NaiveDate) -> Result<Selection> {
    if let Some(week) = &args.week {
        return parse_iso_week(week);
    }

    let period = if args.this_week {
        Some(Period::Week)
    } else if args.last_week {
        Some(Period::LastWeek)
    } else if args.today {
        Some(Period::Day)
    } else if args.yesterday {
        Some(Period::LastDay)
    } else {
        None
    };
    if let Some(period) = period {
        return period_selection(period, today);
    }

    let from = args.from.as_deref().map(parse_cli_date).transpose()?;
    let to = args.to.as_deref().map(parse_cli_date).transpose()?;
    let window = Window::new(from, to).context("--from must not be after --to")?;
    Ok(Selection::Range(window))
}
