//! Whole-log analysis: parse, clip and total every line of a timesheet.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::Aggregate;
use crate::entry::{KeyScope, ParseFailure, parse_line};
use crate::window::Window;

/// What to do when a line cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the line and keep going.
    #[default]
    Collect,
    /// Stop the run at the first malformed line.
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub window: Window,
    pub key_scope: KeyScope,
    pub on_malformed: FailurePolicy,
}

/// A log line that could not be parsed, with its 1-based position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line_number}: \"{text}\" ({reason})")]
pub struct MalformedEntry {
    pub line_number: usize,
    pub text: String,
    pub reason: ParseFailure,
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to read log file {}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read log")]
    Read(#[source] io::Error),

    #[error("could not process log entry on {0}")]
    Malformed(MalformedEntry),
}

/// Result of a run: the totals plus every line that was skipped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub aggregate: Aggregate,
    pub malformed: Vec<MalformedEntry>,
}

impl Analysis {
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Analyzes the log file at `path`.
pub fn analyze_file(path: &Path, options: &AnalyzeOptions) -> Result<Analysis, AnalyzeError> {
    let unreadable = |source| AnalyzeError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    let analysis = analyze_reader(BufReader::new(file), options).map_err(|err| match err {
        AnalyzeError::Read(source) => unreadable(source),
        other => other,
    })?;

    tracing::debug!(
        path = %path.display(),
        projects = analysis.aggregate.len(),
        malformed = analysis.malformed.len(),
        "analyzed log file"
    );
    Ok(analysis)
}

/// Analyzes a log read line by line from `reader`.
///
/// A line that is not valid UTF-8 is malformed like any other unparsable line.
pub fn analyze_reader<R: BufRead>(
    mut reader: R,
    options: &AnalyzeOptions,
) -> Result<Analysis, AnalyzeError> {
    let mut run = Run::new(options);
    let mut buf = Vec::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(AnalyzeError::Read)? == 0 {
            break;
        }
        line_number += 1;

        let bytes = strip_line_ending(&buf);
        match std::str::from_utf8(bytes) {
            Ok(text) => run.feed(line_number, text)?,
            Err(_) => run.reject(
                line_number,
                String::from_utf8_lossy(bytes).into_owned(),
                ParseFailure::InvalidUtf8,
            )?,
        }
    }
    Ok(run.finish())
}

/// Analyzes log contents already held in memory.
pub fn analyze_str(contents: &str, options: &AnalyzeOptions) -> Result<Analysis, AnalyzeError> {
    analyze_reader(contents.as_bytes(), options)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// State of a single pass over a log. Never shared between passes.
struct Run<'a> {
    options: &'a AnalyzeOptions,
    aggregate: Aggregate,
    malformed: Vec<MalformedEntry>,
}

impl<'a> Run<'a> {
    fn new(options: &'a AnalyzeOptions) -> Self {
        Self {
            options,
            aggregate: Aggregate::new(),
            malformed: Vec::new(),
        }
    }

    fn feed(&mut self, line_number: usize, text: &str) -> Result<(), AnalyzeError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let entry = match parse_line(text, self.options.key_scope) {
            Ok(entry) => entry,
            Err(reason) => return self.reject(line_number, text.to_string(), reason),
        };

        match self.options.window.clip(entry.start, entry.end) {
            Some(interval) => self
                .aggregate
                .accumulate(&entry.project_key, interval.duration_ms()),
            None => tracing::debug!(
                line_number,
                project = %entry.project_key,
                "entry is reversed or outside the window"
            ),
        }
        Ok(())
    }

    /// Applies the failure policy to a line that could not be parsed.
    fn reject(
        &mut self,
        line_number: usize,
        text: String,
        reason: ParseFailure,
    ) -> Result<(), AnalyzeError> {
        let malformed = MalformedEntry {
            line_number,
            text,
            reason,
        };
        match self.options.on_malformed {
            FailurePolicy::Abort => Err(AnalyzeError::Malformed(malformed)),
            FailurePolicy::Collect => {
                tracing::warn!(%malformed, "skipping malformed log entry");
                self.malformed.push(malformed);
                Ok(())
            }
        }
    }

    fn finish(self) -> Analysis {
        Analysis {
            aggregate: self.aggregate,
            malformed: self.malformed,
        }
    }
}
