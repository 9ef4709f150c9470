//! Multi-file orchestration.
//!
//! Files are resolved into a deterministic ordered list and processed
//! strictly sequentially; one shared budget enforces the global match limit
//! across the whole set. Each file's parsed tree is dropped as soon as the
//! file is done. A file that cannot be read or parsed is skipped and its
//! failure surfaced in the aggregate result.

use crate::query::QueryNode;
use crate::rewrite::{apply_edits, ensure_import, persist, plan_edits, EditScope, RewriteEdit};
use crate::search::{search_tree, FileError, MatchBudget, MatchResult, OutputMode, SearchResult};
use crate::tree::{SourceParser, TreeError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File-set resolution: extension includes and path-substring excludes.
///
/// The traversal itself is walkdir's; this only decides which entries make
/// the list. The list is sorted so runs are deterministic.
#[derive(Debug, Clone)]
pub struct FileSet {
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for FileSet {
    fn default() -> Self {
        Self {
            extensions: vec!["rs".to_string()],
            exclude: vec!["target".to_string()],
        }
    }
}

impl FileSet {
    /// Resolve a path into a concrete ordered file list.
    pub fn resolve(&self, path: &Path) -> Result<Vec<PathBuf>, TreeError> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry.map_err(|e| TreeError::Io {
                path: path.to_path_buf(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let ext = entry.path().extension().and_then(|s| s.to_str());
            if !ext.is_some_and(|e| self.extensions.iter().any(|want| want == e)) {
                continue;
            }
            if self.is_excluded(entry.path()) {
                continue;
            }

            files.push(entry.path().to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|c| {
            let component = c.as_os_str().to_string_lossy();
            self.exclude.iter().any(|pat| component == *pat)
        })
    }
}

/// Caller-facing search parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    pub mode: OutputMode,
    pub preset: Option<String>,
}

/// Search an ordered file list with one shared budget.
pub fn search_files(query: &QueryNode, files: &[PathBuf], options: &SearchOptions) -> SearchResult {
    let mut matches = Vec::new();
    let mut errors = Vec::new();
    let mut budget = MatchBudget::new(options.limit);
    let mut total_files = 0;
    let mut files_with_matches = 0;

    for file in files {
        if budget.exhausted() {
            // Remaining files are never visited.
            break;
        }
        total_files += 1;

        let found = match search_one(query, file, options.mode, &mut budget, &mut matches) {
            Ok(found) => found,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping file");
                errors.push(FileError {
                    file: file.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if found > 0 {
            files_with_matches += 1;
        }
    }

    SearchResult {
        matches,
        total_files,
        files_with_matches,
        truncated: budget.exhausted(),
        preset: options.preset.clone(),
        errors,
    }
}

fn search_one(
    query: &QueryNode,
    file: &Path,
    mode: OutputMode,
    budget: &mut MatchBudget,
    out: &mut Vec<MatchResult>,
) -> Result<usize, TreeError> {
    let source = fs::read_to_string(file).map_err(|e| TreeError::Io {
        path: file.to_path_buf(),
        source: e,
    })?;

    // Tree lives only for this file's search; dropped on return.
    let mut parser = SourceParser::new()?;
    let parsed = parser.parse(&source)?;

    Ok(search_tree(query, &parsed, file, mode, budget, out))
}

/// One change within a file rewrite, shared verbatim between dry-run and
/// apply reports.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeReport {
    pub line: usize,
    pub before: String,
    pub after: String,
}

/// Outcome of rewriting one file.
#[derive(Debug, Serialize)]
pub struct FileRewrite {
    pub file: PathBuf,
    pub changes: Vec<ChangeReport>,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Caller-facing rewrite parameters.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub template: String,
    pub scope: EditScope,
    pub dry_run: bool,
    pub limit: Option<usize>,
    /// Companion edit: ensure this import line exists in every file that
    /// received at least one rewrite.
    pub ensure_import: Option<String>,
}

/// Rewrite an ordered file list: per file, collect all matches, then plan
/// and apply. Collect-then-apply is never interleaved, and a failed file
/// (overlapping edits, verification mismatch, I/O) does not affect the
/// others.
pub fn rewrite_files(
    query: &QueryNode,
    files: &[PathBuf],
    options: &RewriteOptions,
) -> Vec<FileRewrite> {
    let mut budget = MatchBudget::new(options.limit);
    let mut reports = Vec::new();

    for file in files {
        if budget.exhausted() {
            break;
        }
        reports.push(rewrite_one(query, file, options, &mut budget));
    }

    reports
}

fn rewrite_one(
    query: &QueryNode,
    file: &Path,
    options: &RewriteOptions,
    budget: &mut MatchBudget,
) -> FileRewrite {
    let mut report = FileRewrite {
        file: file.to_path_buf(),
        changes: Vec::new(),
        applied: false,
        error: None,
    };

    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };

    // Phase 1: collect. Rewrites need untruncated capture text, so the
    // matcher always runs in full mode here regardless of display settings.
    let mut matches = Vec::new();
    {
        let mut parser = match SourceParser::new() {
            Ok(parser) => parser,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };
        let parsed = match parser.parse(&source) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.error = Some(e.to_string());
                return report;
            }
        };
        search_tree(query, &parsed, file, OutputMode::Full, budget, &mut matches);
    }

    if matches.is_empty() {
        return report;
    }

    // Phase 2: plan, then apply in one descending pass.
    let mut edits = plan_edits(&source, &matches, &options.template, &options.scope);
    if let Some(import_line) = &options.ensure_import {
        if !edits.is_empty() {
            if let Some(edit) = ensure_import(&source, import_line) {
                edits.push(edit);
                edits.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));
            }
        }
    }

    report.changes = edits
        .iter()
        .rev()
        .map(|e: &RewriteEdit| ChangeReport {
            line: e.line,
            before: e.original.clone(),
            after: e.replacement.clone(),
        })
        .collect();

    match apply_edits(&source, &edits) {
        Ok(rewritten) => {
            if options.dry_run {
                debug!(file = %file.display(), edits = edits.len(), "dry run, buffer discarded");
            } else if let Err(e) = persist(file, &rewritten) {
                report.error = Some(e.to_string());
                report.changes.clear();
                return report;
            } else {
                report.applied = true;
            }
        }
        Err(e) => {
            report.error = Some(e.to_string());
            report.changes.clear();
        }
    }

    report
}
