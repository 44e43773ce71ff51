//! Line-oriented manifest parsing and file reading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

use super::specifier::RequirementSpec;

/// A logical manifest line: continuation lines joined, inline comment removed.
struct LogicalLine {
    number: usize,
    text: String,
}

/// Split manifest text into logical lines, dropping blanks and comments.
///
/// A trailing `\` joins the next physical line. Inline comments need
/// whitespace before the `#`.
fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (idx, raw) in text.lines().enumerate() {
        let (piece, continues) = match raw.trim_end().strip_suffix('\\') {
            Some(head) => (head, true),
            None => (raw, false),
        };

        let line = pending.get_or_insert_with(|| LogicalLine {
            number: idx + 1,
            text: String::new(),
        });
        line.text.push_str(piece);

        if continues {
            continue;
        }
        if let Some(line) = pending.take() {
            push_line(&mut lines, line);
        }
    }

    if let Some(line) = pending.take() {
        push_line(&mut lines, line);
    }

    lines
}

fn push_line(lines: &mut Vec<LogicalLine>, mut line: LogicalLine) {
    let text = strip_comment(&line.text).trim();
    if text.is_empty() {
        return;
    }
    line.text = text.to_string();
    lines.push(line);
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parse manifest text into requirement entries, in file order.
///
/// Fails on the first line that is not a valid specifier.
pub fn parse(text: &str) -> Result<Vec<RequirementSpec>, ManifestError> {
    logical_lines(text)
        .into_iter()
        .map(|line| {
            RequirementSpec::parse(&line.text).map_err(|reason| ManifestError::Parse {
                line: line.number,
                content: line.text.clone(),
                reason,
            })
        })
        .collect()
}

/// Parse manifest text, keeping good entries and collecting bad lines.
///
/// For callers that prefer skipping malformed lines over aborting.
pub fn parse_lenient(text: &str) -> (Vec<RequirementSpec>, Vec<ManifestError>) {
    let mut specs = Vec::new();
    let mut errors = Vec::new();

    for line in logical_lines(text) {
        match RequirementSpec::parse(&line.text) {
            Ok(spec) => specs.push(spec),
            Err(reason) => errors.push(ManifestError::Parse {
                line: line.number,
                content: line.text,
                reason,
            }),
        }
    }

    (specs, errors)
}

/// Reads a manifest file from disk. Every call re-reads the file.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    path: PathBuf,
}

impl ManifestReader {
    /// Create a reader for the manifest at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the manifest.
    pub fn read(&self) -> Result<Vec<RequirementSpec>, ManifestError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ManifestError::Read {
            path: self.path.clone(),
            source,
        })?;
        let specs = parse(&text)?;
        tracing::debug!(
            "Read {} requirement(s) from {}",
            specs.len(),
            self.path.display()
        );
        Ok(specs)
    }
}
