//! Turns the download script's free-text stdout into per-file status records.
//!
//! Recognised lines (after ANSI stripping and trimming, first match wins):
//! - `✓ Downloaded: <path>`
//! - `... Already exists: <path> ...`
//! - `✗ <message>`

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

const DOWNLOADED_MARKER: &str = "✓ Downloaded:";
const EXISTS_MARKER: &str = "Already exists:";
const ERROR_MARKER: &str = "✗";

lazy_static! {
    static ref ANSI_RE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Downloaded,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub file: String,
    pub status: FileState,
}

impl FileStatus {
    pub fn downloaded(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileState::Downloaded,
        }
    }

    pub fn exists(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileState::Exists,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub files: Vec<FileStatus>,
    pub errors: Vec<String>,
}

pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}

pub fn parse_output(stdout: &str) -> ParsedOutput {
    let cleaned = strip_ansi(stdout);
    let mut out = ParsedOutput::default();

    for line in cleaned.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix(DOWNLOADED_MARKER) {
            let file = rest.trim();
            if !file.is_empty() {
                out.files.push(FileStatus::downloaded(file));
            }
        } else if let Some(idx) = line.find(EXISTS_MARKER) {
            // no token after the marker: tolerated, line skipped
            if let Some(file) = line[idx + EXISTS_MARKER.len()..].split_whitespace().next() {
                out.files.push(FileStatus::exists(file));
            }
        } else if let Some(rest) = line.strip_prefix(ERROR_MARKER) {
            out.errors.push(rest.trim().to_string());
        }
    }

    out
}

/// Last `max_chars` characters of `text`, counted in code points so the
/// multi-byte `✓`/`✗` markers are never split.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    match text.char_indices().nth(total - max_chars) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}
