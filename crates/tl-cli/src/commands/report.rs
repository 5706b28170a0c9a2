//! Report command for per-project time summaries.
//!
//! This module implements `tl report` with period options (--from/--to,
//! --week, --this-week, --last-week, --today, --yesterday), value modes
//! (hours, --relative, --fraction) and outputs (lines, JSON, file export).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tl_core::format::{hours, percent};
use tl_core::{
    AnalyzeOptions, Analysis, FailurePolicy, KeyScope, MalformedEntry, OutputMode, analyze_file,
    format_summary,
};

use crate::Config;
use crate::cli::ReportArgs;
use crate::commands::util::{Selection, resolve_selection};

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub team: String,
    pub selection: Selection,
    pub mode: OutputMode,
    pub analysis: Analysis,
}

// ========== Report Generation ==========

/// Analyzes the log and adds configured projects that had no time.
pub fn generate_report_data(
    log_path: &Path,
    config: &Config,
    selection: Selection,
    mode: OutputMode,
    options: &AnalyzeOptions,
) -> Result<ReportData> {
    let mut analysis = analyze_file(log_path, options)
        .with_context(|| format!("failed to analyze {}", log_path.display()))?;
    analysis.aggregate.include_known(&config.projects);

    Ok(ReportData {
        team: config.team.clone(),
        selection,
        mode,
        analysis,
    })
}

/// Formats the summary lines plus a total row for hours.
pub fn format_report(data: &ReportData) -> Result<String> {
    let aggregate = &data.analysis.aggregate;
    let mut lines = format_summary(aggregate, data.mode, &data.team)?;
    if lines.is_empty() {
        return Ok(format!("No time tracked in {}.\n", data.selection.window()));
    }

    if data.mode == OutputMode::Absolute {
        lines.push(format!("TOTAL, {:.2}", hours(aggregate.grand_total())));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    Ok(output)
}

/// Writes the skipped lines so the log can be fixed.
fn report_malformed<W: Write>(writer: &mut W, malformed: &[MalformedEntry]) -> Result<()> {
    if malformed.is_empty() {
        return Ok(());
    }
    writeln!(writer, "Skipped {} malformed line(s):", malformed.len())?;
    for entry in malformed {
        writeln!(writer, "  {entry}")?;
    }
    Ok(())
}

// ========== File Export ==========

/// Writes the summary lines (without the total row) to `path`.
///
/// A period without tracked time produces an empty file.
pub fn export(path: &Path, data: &ReportData) -> Result<()> {
    let lines = format_summary(&data.analysis.aggregate, data.mode, &data.team)?;
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }

    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), lines = lines.len(), "exported summary");
    Ok(())
}

fn export_path(args: &ReportArgs, config: &Config, selection: &Selection) -> Option<PathBuf> {
    if let Some(path) = &args.output {
        return Some(path.clone());
    }
    args.save.then(|| config.export_dir.join(selection.file_name()))
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub team: String,
    pub period: JsonPeriod,
    pub projects: Vec<JsonProject>,
    pub total_ms: i64,
    pub malformed: Vec<JsonMalformed>,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonProject {
    pub project: String,
    pub time_ms: i64,
    pub hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct JsonMalformed {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let aggregate = &data.analysis.aggregate;
    let total = aggregate.grand_total();
    let window = data.selection.window();
    let date = |dt: chrono::NaiveDateTime| dt.format("%Y-%m-%d").to_string();

    let report = JsonReport {
        team: data.team.clone(),
        period: JsonPeriod {
            from: window.start().map(date),
            to: window.end().map(date),
        },
        projects: aggregate
            .iter()
            .map(|(project, time_ms)| JsonProject {
                project: project.to_string(),
                time_ms,
                hours: hours(time_ms),
                percent: percent(time_ms, total),
            })
            .collect(),
        total_ms: total,
        malformed: data
            .analysis
            .malformed
            .iter()
            .map(|entry| JsonMalformed {
                line: entry.line_number,
                text: entry.text.clone(),
                reason: entry.reason.to_string(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
///
/// Summary output goes to `out`, skipped lines to `err`.
pub fn run<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    config: &Config,
    args: &ReportArgs,
    today: NaiveDate,
) -> Result<()> {
    let selection = resolve_selection(&args.period, today)?;
    let options = AnalyzeOptions {
        window: selection.window(),
        key_scope: if args.top_level {
            KeyScope::TopLevel
        } else {
            config.key_scope
        },
        on_malformed: if args.strict {
            FailurePolicy::Abort
        } else {
            config.on_malformed
        },
    };
    let log_path = args.log.as_deref().unwrap_or(&config.log_path);
    tracing::debug!(log = %log_path.display(), window = %options.window, "generating report");

    let data = generate_report_data(log_path, config, selection, args.mode(), &options)?;
    report_malformed(err, &data.analysis.malformed)?;

    if let Some(path) = export_path(args, config, &data.selection) {
        export(&path, &data)?;
        writeln!(out, "Saved to: {}", path.display())?;
    } else if args.json {
        writeln!(out, "{}", format_report_json(&data)?)?;
    } else {
        write!(out, "{}", format_report(&data)?)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;
    use insta::assert_snapshot;
    use tempfile::TempDir;

    use crate::{Cli, Commands};

    const LOG: &str = "\
01/01/2024,03/01/2024,ProjectA
ProjectB,SubX,02/01/2024,03/01/2024
08/01/2024,09/01/2024,ProjectA, Review
garbage,data
";

    /// Jan 10, 2024 is a Wednesday in ISO week 2.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn setup() -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("timesheet.log");
        fs::write(&log_path, LOG).unwrap();
        let config = Config {
            log_path,
            team: "core".to_string(),
            projects: Vec::new(),
            key_scope: KeyScope::Remainder,
            on_malformed: FailurePolicy::Collect,
            export_dir: temp.path().to_path_buf(),
        };
        (temp, config)
    }

    fn report_args(args: &[&str]) -> ReportArgs {
        let argv = ["tl", "report"].into_iter().chain(args.iter().copied());
        match Cli::parse_from(argv).command {
            Some(Commands::Report(args)) => args,
            other => panic!("expected report command, got {other:?}"),
        }
    }

    fn run_report(config: &Config, args: &[&str]) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        run(&mut out, &mut err, config, &report_args(args), today()).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_report_whole_log_in_hours() {
        let (_temp, config) = setup();
        let (out, err) = run_report(&config, &[]);

        assert_snapshot!(out, @r"
        core, 48.00, ProjectA
        core, 24.00, ProjectA, Review
        core, 24.00, ProjectB
        TOTAL, 96.00
        ");
        assert_snapshot!(err, @r#"
        Skipped 1 malformed line(s):
          line 4: "garbage,data" (legacy layout expects 4 fields, found 2)
        "#);
    }

    #[test]
    fn test_report_relative() {
        let (_temp, config) = setup();
        let (out, _err) = run_report(&config, &["--relative"]);

        assert_snapshot!(out, @r"
        core, 50%, ProjectA
        core, 25%, ProjectA, Review
        core, 25%, ProjectB
        ");
    }

    #[test]
    fn test_report_last_week_clips_entries() {
        let (_temp, config) = setup();
        let (out, _err) = run_report(&config, &["--last-week"]);

        // The Review entry starts on the window's exclusive end
        assert_snapshot!(out, @r"
        core, 48.00, ProjectA
        core, 0.00, ProjectA, Review
        core, 24.00, ProjectB
        TOTAL, 72.00
        ");
    }

    #[test]
    fn test_report_custom_window() {
        let (_temp, config) = setup();
        let (out, _err) = run_report(&config, &["--from", "02/01/2024", "--to", "03/01/2024"]);

        assert_snapshot!(out, @r"
        core, 24.00, ProjectA
        core, 24.00, ProjectB
        TOTAL, 48.00
        ");
    }

    #[test]
    fn test_report_top_level_keys() {
        let (_temp, config) = setup();
        let (out, _err) = run_report(&config, &["--top-level"]);

        assert_snapshot!(out, @r"
        core, 72.00, ProjectA
        core, 24.00, ProjectB
        TOTAL, 96.00
        ");
    }

    #[test]
    fn test_report_lists_known_projects() {
        let (_temp, mut config) = setup();
        config.projects = vec!["ProjectB".to_string(), "ProjectC".to_string()];
        let (out, _err) = run_report(&config, &["--this-week", "--top-level"]);

        assert_snapshot!(out, @r"
        core, 24.00, ProjectA
        core, 0.00, ProjectB
        core, 0.00, ProjectC
        TOTAL, 24.00
        ");
    }

    #[test]
    fn test_report_empty_period() {
        let (_temp, config) = setup();
        let (out, _err) = run_report(&config, &["--week", "2024-W10"]);

        assert_snapshot!(out, @"No time tracked in [04/03/2024, 11/03/2024).");
    }

    #[test]
    fn test_relative_without_tracked_time_is_insufficient() {
        let (_temp, config) = setup();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let args = report_args(&["--relative", "--from", "01/06/2024"]);

        let error = run(&mut out, &mut err, &config, &args, today()).unwrap_err();
        assert!(
            error.to_string().contains("insufficient data"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn test_strict_aborts_on_malformed_line() {
        let (_temp, config) = setup();
        let mut out = Vec::new();
        let mut err = Vec::new();

        let error = run(&mut out, &mut err, &config, &report_args(&["--strict"]), today())
            .unwrap_err();

        let message = format!("{error:#}");
        assert!(message.contains("line 4"), "unexpected error: {message}");
        assert!(message.contains("garbage,data"), "unexpected error: {message}");
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_log_fails() {
        let (temp, config) = setup();
        let missing = temp.path().join("missing.log");
        let mut out = Vec::new();
        let mut err = Vec::new();

        let args = report_args(&[missing.to_str().unwrap()]);
        let error = run(&mut out, &mut err, &config, &args, today()).unwrap_err();

        assert!(format!("{error:#}").contains("failed to read log file"));
    }

    #[test]
    fn test_save_uses_week_file_name() {
        let (temp, config) = setup();
        let (out, _err) = run_report(&config, &["--last-week", "--fraction", "--save"]);

        let path = temp.path().join("timesheet-2024wk01.txt");
        assert_eq!(out, format!("Saved to: {}\n", path.display()));
        assert_snapshot!(fs::read_to_string(&path).unwrap(), @r"
        core, 0.67, ProjectA
        core, 0.33, ProjectB
        ");
    }

    #[test]
    fn test_output_writes_given_file() {
        let (temp, config) = setup();
        let path = temp.path().join("summary.txt");
        run_report(&config, &["--output", path.to_str().unwrap()]);

        // No total row in exported files
        assert_snapshot!(fs::read_to_string(&path).unwrap(), @r"
        core, 48.00, ProjectA
        core, 24.00, ProjectA, Review
        core, 24.00, ProjectB
        ");
    }

    #[test]
    fn test_output_for_empty_period_is_empty_file() {
        let (temp, config) = setup();
        let path = temp.path().join("summary.txt");
        let (out, _err) = run_report(
            &config,
            &["--week", "2024-W10", "--output", path.to_str().unwrap()],
        );

        assert_eq!(out, format!("Saved to: {}\n", path.display()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_report_json_output() {
        let (_temp, config) = setup();
        let (out, _err) = run_report(&config, &["--json", "--last-week", "--top-level"]);

        assert_snapshot!(out, @r#"
        {
          "team": "core",
          "period": {
            "from": "2024-01-01",
            "to": "2024-01-08"
          },
          "projects": [
            {
              "project": "ProjectA",
              "time_ms": 172800000,
              "hours": 48.0,
              "percent": 67
            },
            {
              "project": "ProjectB",
              "time_ms": 86400000,
              "hours": 24.0,
              "percent": 33
            }
          ],
          "total_ms": 259200000,
          "malformed": [
            {
              "line": 4,
              "text": "garbage,data",
              "reason": "legacy layout expects 4 fields, found 2"
            }
          ]
        }
        "#);
    }
}
