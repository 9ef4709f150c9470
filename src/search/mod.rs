//! Matcher and traversal engine.
//!
//! Every node of a file's tree is visited in preorder and a full match of
//! the compiled query is attempted at each one. Failed attempts never prune
//! traversal, so nested and overlapping matches of the same pattern are
//! found. A shared [`MatchBudget`] bounds total matches across a whole
//! multi-file run.

pub mod matcher;
pub mod model;

pub use matcher::{match_node, search_tree, MatchBudget};
pub use model::{Capture, FileError, MatchResult, OutputMode, SearchResult};
