//! The query model: compiled representation of a structural search pattern.
//!
//! A query is a JSON-like object tree. Reserved keys are `kind`, `$any`,
//! `$text` and `$capture`; every other key names a grammar property and maps
//! to a nested query object. Compilation happens exactly once per search;
//! the resulting [`QueryNode`] tree is immutable and carries no engine logic.

pub mod compile;
pub mod errors;
pub mod model;

pub use compile::{compile, compile_str};
pub use errors::QueryError;
pub use model::QueryNode;
