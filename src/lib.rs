//! astsed: structural search and rewrite for Rust source.
//!
//! A declarative JSON pattern over the syntax tree (kind constraints,
//! `$text` regexes, `$any` wildcards, `$capture` names, and nested property
//! constraints) is matched against every subtree of one or more files;
//! matches can then be rewritten with `${name}` capture-interpolated
//! templates.
//!
//! # Architecture
//!
//! Queries compile once into an immutable [`QueryNode`] tree; the matcher
//! walks each file in preorder and attempts a full match at every node,
//! bounded by a global [`MatchBudget`]. Rewrites are two-phase: all matches
//! for a file are collected first, then compiled into a descending-ordered
//! [`RewriteEdit`] list and applied in a single splice pass.
//!
//! # Safety
//!
//! - Edit lists with overlapping spans are rejected, never merged
//! - Every edit verifies its expected before-text before splicing
//! - Atomic file writes (tempfile + fsync + rename)
//! - UTF-8 validation of the rewritten buffer
//! - The `ensure_import` companion edit is idempotent
//!
//! # Example
//!
//! ```no_run
//! use astsed::batch::{search_files, FileSet, SearchOptions};
//! use astsed::query::compile_str;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let query = compile_str(r#"{"kind": "call_expression"}"#)?;
//! let files = FileSet::default().resolve(Path::new("src"))?;
//! let result = search_files(&query, &files, &SearchOptions::default());
//! println!("{} matches", result.matches.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod presets;
pub mod query;
pub mod rewrite;
pub mod search;
pub mod tree;

// Re-exports
pub use batch::{
    rewrite_files, search_files, ChangeReport, FileRewrite, FileSet, RewriteOptions, SearchOptions,
};
pub use query::{compile, compile_str, QueryError, QueryNode};
pub use rewrite::{
    apply_edits, ensure_import, interpolate, plan_edits, EditScope, RewriteEdit, RewriteError,
};
pub use search::{Capture, MatchBudget, MatchResult, OutputMode, SearchResult};
pub use tree::{ParsedSource, SourceParser, TreeError};
