//! Rewrite planning and text-edit application.
//!
//! Two-phase, never interleaved: the planner turns a file's matches plus a
//! capture-interpolated template into an immutable, descending-ordered edit
//! list; the applier then splices the buffer in one pass. Dry-run and apply
//! compute the same edits; only persistence differs.

pub mod applier;
pub mod errors;
pub mod planner;

pub use applier::{apply_edits, persist, Verification};
pub use errors::RewriteError;
pub use planner::{ensure_import, interpolate, plan_edits, EditScope, RewriteEdit};
