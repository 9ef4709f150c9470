use crate::search::{Capture, MatchResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A planned byte-span replacement for one match.
///
/// Edits for one file are pairwise non-overlapping and applied strictly in
/// descending `byte_start` order; `original`/`replacement` double as the
/// `{before, after}` preview, so dry-run and apply share one computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEdit {
    pub byte_start: usize,
    pub byte_end: usize,
    pub original: String,
    pub replacement: String,
    /// 1-based line of the edited region, for reporting.
    pub line: usize,
}

/// Which region of a match an edit replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditScope {
    /// The whole matched node.
    WholeMatch,
    /// Only the named capture's span. Matches lacking the capture are
    /// skipped, not errors.
    Capture(String),
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

/// Interpolate `${name}` placeholders with capture text.
///
/// A placeholder whose name has no corresponding capture is left verbatim
/// in the output; that is the documented fallback, not an error.
pub fn interpolate(template: &str, captures: &BTreeMap<String, Capture>) -> String {
    placeholder_re()
        .replace_all(template, |m: &regex::Captures<'_>| {
            let name = &m[1];
            match captures.get(name) {
                Some(capture) => capture.text.clone(),
                None => m[0].to_string(),
            }
        })
        .into_owned()
}

/// Plan one edit per match, sorted descending by start offset.
///
/// `source` must be the buffer the matches were found in; the edit's
/// `original` is sliced from it, never from the (possibly truncated)
/// rendered match text.
pub fn plan_edits(
    source: &str,
    matches: &[MatchResult],
    template: &str,
    scope: &EditScope,
) -> Vec<RewriteEdit> {
    let empty = BTreeMap::new();
    let mut edits = Vec::with_capacity(matches.len());

    for m in matches {
        let captures = m.captures.as_ref().unwrap_or(&empty);

        let (byte_start, byte_end, line) = match scope {
            EditScope::WholeMatch => (m.byte_start, m.byte_end, m.line),
            EditScope::Capture(name) => match captures.get(name) {
                Some(c) => (c.byte_start, c.byte_end, c.line),
                None => continue,
            },
        };

        edits.push(RewriteEdit {
            byte_start,
            byte_end,
            original: source[byte_start..byte_end].to_string(),
            replacement: interpolate(template, captures),
            line,
        });
    }

    edits.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));
    edits
}

/// Companion edit: make sure an import line exists.
///
/// Idempotent by construction: if the trimmed line is already present the
/// plan is empty. Otherwise the line is inserted at a stable anchor (the
/// first `use` declaration, or the top of the file), independent of any
/// match-derived offsets.
pub fn ensure_import(source: &str, import_line: &str) -> Option<RewriteEdit> {
    let wanted = import_line.trim();
    if source.lines().any(|line| line.trim() == wanted) {
        return None;
    }

    let anchor = source
        .lines()
        .scan(0usize, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some((start, line))
        })
        .find(|(_, line)| line.trim_start().starts_with("use "))
        .map_or(0, |(start, _)| start);

    let line = source[..anchor].matches('\n').count() + 1;

    Some(RewriteEdit {
        byte_start: anchor,
        byte_end: anchor,
        original: String::new(),
        replacement: format!("{wanted}\n"),
        line,
    })
}
