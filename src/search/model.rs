use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A named snapshot of a matched node, recorded during one match attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub text: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip)]
    pub byte_start: usize,
    #[serde(skip)]
    pub byte_end: usize,
}

/// One successful match of the root query against a node.
///
/// Byte offsets are carried for the rewrite planner but stay out of the
/// serialized output, which is `{file, line, column, kind, text, captures?}`.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub kind: String,
    pub text: String,
    #[serde(skip)]
    pub byte_start: usize,
    #[serde(skip)]
    pub byte_end: usize,
    /// `None` in summary mode: the key is omitted from output entirely,
    /// even when the query defines captures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captures: Option<BTreeMap<String, Capture>>,
}

/// How matched text is rendered into [`MatchResult::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// Up to 200 chars of matched text, `…` appended if longer.
    #[default]
    Full,
    /// First line only, up to 100 chars, `…` appended if longer.
    Compact,
    /// Empty text and no captures at all: a strict space-minimization
    /// contract, not merely "empty captures".
    Summary,
}

impl OutputMode {
    pub fn render(self, text: &str) -> String {
        match self {
            OutputMode::Full => truncate_chars(text, 200),
            OutputMode::Compact => {
                let first_line = text.lines().next().unwrap_or("");
                let mut rendered = truncate_chars(first_line, 100);
                // A dropped second line also warrants the ellipsis.
                if rendered == first_line && text.lines().nth(1).is_some() {
                    rendered.push('…');
                }
                rendered
            }
            OutputMode::Summary => String::new(),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push('…');
        out
    }
}

/// A per-file failure surfaced in the aggregate result instead of aborting
/// the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub file: PathBuf,
    pub reason: String,
}

/// Aggregate outcome of a multi-file search.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub matches: Vec<MatchResult>,
    /// Files actually visited; files skipped by truncation never count.
    pub total_files: usize,
    pub files_with_matches: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}
