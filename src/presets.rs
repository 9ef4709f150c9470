//! Curated anti-pattern presets.
//!
//! A preset is pure data: a name plus a pattern that compiles into the same
//! [`QueryNode`](crate::query::QueryNode) a user-supplied query would. The
//! matcher never special-cases preset-derived queries.
//!
//! Compiled presets are cached thread-locally so repeated lookups in batch
//! workloads skip recompilation.

use crate::query::{self, QueryError, QueryNode};
use std::cell::RefCell;
use std::collections::HashMap;

/// A named, precompilable query pattern.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub pattern: &'static str,
}

/// The fixed catalog. Patterns use tree-sitter-rust kinds and field names.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "unwrap-call",
        description: "`.unwrap()` method calls",
        pattern: r#"{"kind": "call_expression", "function": {"kind": "field_expression", "field": {"kind": "field_identifier", "$text": "^unwrap$"}}}"#,
    },
    Preset {
        name: "expect-call",
        description: "`.expect(..)` method calls",
        pattern: r#"{"kind": "call_expression", "function": {"kind": "field_expression", "field": {"kind": "field_identifier", "$text": "^expect$"}}}"#,
    },
    Preset {
        name: "panic-macro",
        description: "`panic!` invocations",
        pattern: r#"{"kind": "macro_invocation", "macro": {"kind": "identifier", "$text": "^panic$"}}"#,
    },
    Preset {
        name: "todo-macro",
        description: "`todo!` and `unimplemented!` invocations",
        pattern: r#"{"kind": "macro_invocation", "macro": {"kind": "identifier", "$text": "^(todo|unimplemented)$"}}"#,
    },
    Preset {
        name: "dbg-macro",
        description: "leftover `dbg!` invocations",
        pattern: r#"{"kind": "macro_invocation", "macro": {"kind": "identifier", "$text": "^dbg$"}}"#,
    },
];

/// Look up a preset by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

thread_local! {
    static COMPILED: RefCell<HashMap<&'static str, QueryNode>> = RefCell::new(HashMap::new());
}

/// Get a preset's compiled query, compiling and caching on first use.
///
/// Returns `None` for an unknown preset name.
pub fn compiled(name: &str) -> Option<Result<QueryNode, QueryError>> {
    let preset = find(name)?;

    let cached = COMPILED.with(|cache| cache.borrow().get(preset.name).cloned());
    if let Some(query) = cached {
        return Some(Ok(query));
    }

    let result = query::compile_str(preset.pattern);
    if let Ok(query) = &result {
        COMPILED.with(|cache| {
            cache.borrow_mut().insert(preset.name, query.clone());
        });
    }
    Some(result)
}
