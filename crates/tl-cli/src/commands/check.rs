//! Check command for finding log lines that cannot be parsed.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tl_core::{AnalyzeOptions, analyze_file};

/// Runs the check command. Fails if any line is malformed.
pub fn run<W: Write>(writer: &mut W, log_path: &Path) -> Result<()> {
    let analysis = analyze_file(log_path, &AnalyzeOptions::default())
        .with_context(|| format!("failed to check {}", log_path.display()))?;

    if analysis.is_clean() {
        writeln!(
            writer,
            "{}: {} project(s), no malformed lines.",
            log_path.display(),
            analysis.aggregate.len()
        )?;
        return Ok(());
    }

    for entry in &analysis.malformed {
        writeln!(writer, "{entry}")?;
    }
    bail!(
        "{} malformed line(s) in {}",
        analysis.malformed.len(),
        log_path.display()
    )
}
