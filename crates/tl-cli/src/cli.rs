//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tl_core::OutputMode;

/// Per-project time summaries from a timesheet log.
///
/// Reads a log of `start, end, project` (or legacy `project, sub-project,
/// start, end`) lines and totals the time spent on each project.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize tracked time per project.
    Report(ReportArgs),

    /// List log lines that cannot be parsed.
    Check {
        /// Log file to check (defaults to `log_path` from the config).
        log: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Log file to analyze (defaults to `log_path` from the config).
    pub log: Option<PathBuf>,

    #[command(flatten)]
    pub period: PeriodArgs,

    /// Show each project as a percentage of the total.
    #[arg(short, long, conflicts_with = "fraction")]
    pub relative: bool,

    /// Show each project as a share of the total, omitting negligible ones.
    #[arg(long)]
    pub fraction: bool,

    /// Output as JSON.
    #[arg(long, conflicts_with_all = ["output", "save"])]
    pub json: bool,

    /// Stop at the first malformed line instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Key entries on their top-level project only.
    #[arg(long)]
    pub top_level: bool,

    /// Write the summary lines to FILE.
    #[arg(short, long, value_name = "FILE", conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Write the summary lines to a file named after the period, in
    /// `export_dir`.
    #[arg(long)]
    pub save: bool,
}

impl ReportArgs {
    pub const fn mode(&self) -> OutputMode {
        if self.relative {
            OutputMode::Relative
        } else if self.fraction {
            OutputMode::Fraction
        } else {
            OutputMode::Absolute
        }
    }
}

/// Period selection. Without any of these the whole log is analyzed.
#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// First day to include (dd/MM/yyyy).
    #[arg(long, value_name = "DATE", conflicts_with = "preset")]
    pub from: Option<String>,

    /// First day to exclude (dd/MM/yyyy).
    #[arg(long, value_name = "DATE", conflicts_with = "preset")]
    pub to: Option<String>,

    /// ISO week, Monday to Monday (e.g., 2024-W05).
    #[arg(long, value_name = "YYYY-Www", group = "preset")]
    pub week: Option<String>,

    /// The current week.
    #[arg(long, group = "preset")]
    pub this_week: bool,

    /// The previous week.
    #[arg(long, group = "preset")]
    pub last_week: bool,

    /// Today only.
    #[arg(long, group = "preset")]
    pub today: bool,

    /// Yesterday only.
    #[arg(long, group = "preset")]
    pub yesterday: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tl").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_modes() {
        let Some(Commands::Report(args)) = parse(&["report", "--relative"]).unwrap().command else {
            panic!("expected report");
        };
        assert_eq!(args.mode(), OutputMode::Relative);

        let Some(Commands::Report(args)) = parse(&["report"]).unwrap().command else {
            panic!("expected report");
        };
        assert_eq!(args.mode(), OutputMode::Absolute);
    }

    #[test]
    fn test_presets_are_exclusive() {
        assert!(parse(&["report", "--this-week", "--last-week"]).is_err());
        assert!(parse(&["report", "--week", "2024-W05", "--from", "01/01/2024"]).is_err());
        assert!(parse(&["report", "--from", "01/01/2024", "--to", "08/01/2024"]).is_ok());
    }

    #[test]
    fn test_relative_conflicts_with_fraction() {
        assert!(parse(&["report", "--relative", "--fraction"]).is_err());
    }
}
