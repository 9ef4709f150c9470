//! Grammar adapter over tree-sitter.
//!
//! The matcher never talks to tree-sitter directly; everything it needs from
//! the host grammar comes through this module: parsing, preorder node
//! iteration, kind/text/position access, and the field-name accessor that
//! resolves a query's nested property names to child nodes.

pub mod errors;
pub mod parser;

pub use errors::TreeError;
pub use parser::{accessor, kind_is_known, position, ParsedSource, SourceParser};
