use regex::Regex;
use std::collections::BTreeMap;

/// One node of a compiled search pattern.
///
/// A node matches a candidate by conjunction of whichever constraints are
/// present, in fixed precedence: wildcard, kind, text, then nested
/// properties. `$any` short-circuits the kind and text checks (a capture on
/// the same node still fires), but nested property constraints still apply.
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// `$any` wildcard: matches any node.
    Wildcard {
        capture: Option<String>,
        children: BTreeMap<String, QueryNode>,
    },
    /// Constraint match: optional kind, optional text regex.
    ///
    /// `kind` is mandatory at the query root and optional below it. An
    /// unknown kind name is not an error; the node simply never matches.
    Match {
        kind: Option<String>,
        text: Option<Regex>,
        capture: Option<String>,
        children: BTreeMap<String, QueryNode>,
    },
}

impl QueryNode {
    pub fn capture(&self) -> Option<&str> {
        match self {
            QueryNode::Wildcard { capture, .. } | QueryNode::Match { capture, .. } => {
                capture.as_deref()
            }
        }
    }

    /// Nested property constraints, keyed by property name.
    ///
    /// BTreeMap so children are always matched in the same order, which
    /// makes the last-write-wins rule for duplicate capture names
    /// deterministic.
    pub fn children(&self) -> &BTreeMap<String, QueryNode> {
        match self {
            QueryNode::Wildcard { children, .. } | QueryNode::Match { children, .. } => children,
        }
    }
}
