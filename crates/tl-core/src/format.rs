//! Rendering of project totals as summary lines.

use thiserror::Error;

use crate::aggregate::Aggregate;

pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Shares below this are left out of a fractional overview.
const MIN_FRACTION: f64 = 0.004;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// A share of the total was requested but nothing was tracked.
    #[error("insufficient data: no time tracked in the selected period")]
    InsufficientData,
}

/// What the value column of a summary line holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Hours with two decimals.
    #[default]
    Absolute,
    /// Whole percent of the grand total.
    Relative,
    /// Share of the grand total with two decimals; negligible shares omitted.
    Fraction,
}

#[allow(clippy::cast_precision_loss)]
pub fn hours(millis: i64) -> f64 {
    millis as f64 / MILLIS_PER_HOUR as f64
}

#[allow(clippy::cast_precision_loss)]
fn share(millis: i64, total: i64) -> f64 {
    millis as f64 / total as f64
}

/// Whole percent of `total`, or `None` when `total` is zero.
#[allow(clippy::cast_possible_truncation)]
pub fn percent(millis: i64, total: i64) -> Option<i64> {
    (total > 0).then(|| (share(millis, total) * 100.0).round() as i64)
}

/// Renders one `"<team>, <value>, <project>"` line per project, in key order.
pub fn format_summary(
    aggregate: &Aggregate,
    mode: OutputMode,
    team: &str,
) -> Result<Vec<String>, FormatError> {
    let total = aggregate.grand_total();
    if mode != OutputMode::Absolute && total == 0 {
        return Err(FormatError::InsufficientData);
    }

    let lines = aggregate
        .iter()
        .filter_map(|(key, millis)| {
            let value = match mode {
                OutputMode::Absolute => format!("{:.2}", hours(millis)),
                OutputMode::Relative => format!("{}%", percent(millis, total)?),
                OutputMode::Fraction => {
                    let fraction = share(millis, total);
                    if fraction < MIN_FRACTION {
                        return None;
                    }
                    format!("{fraction:.2}")
                }
            };
            Some(format!("{team}, {value}, {key}"))
        })
        .collect();

    Ok(lines)
}
