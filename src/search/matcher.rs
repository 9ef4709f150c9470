use crate::query::QueryNode;
use crate::search::model::{Capture, MatchResult, OutputMode};
use crate::tree::{self, ParsedSource};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Explicit match-budget context threaded through traversal.
///
/// One budget is shared across every file of a multi-file operation; the
/// moment it is exhausted, the current file's walk and the caller's file
/// loop both stop.
#[derive(Debug)]
pub struct MatchBudget {
    limit: Option<usize>,
    used: usize,
}

impl MatchBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    pub fn record(&mut self) {
        self.used += 1;
    }

    pub fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.used >= limit)
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

/// Attempt a full match of `query` against `node`.
///
/// Captures are recorded into `captures` as soon as a node's local
/// constraints hold, before its children are checked; a later write under
/// the same name wins. The map is only meaningful to the caller when the
/// whole attempt succeeds.
pub fn match_node(
    query: &QueryNode,
    node: tree_sitter::Node<'_>,
    parsed: &ParsedSource<'_>,
    captures: &mut BTreeMap<String, Capture>,
) -> bool {
    match query {
        QueryNode::Wildcard { capture, children } => {
            record_capture(capture.as_deref(), node, parsed, captures);
            match_children(children, node, parsed, captures)
        }
        QueryNode::Match {
            kind,
            text,
            capture,
            children,
        } => {
            if let Some(kind) = kind {
                // Opaque string comparison; an unknown kind just never
                // equals any real node kind.
                if node.kind() != kind {
                    return false;
                }
            }

            if let Some(re) = text {
                if !re.is_match(parsed.node_text(node)) {
                    return false;
                }
            }

            record_capture(capture.as_deref(), node, parsed, captures);
            match_children(children, node, parsed, captures)
        }
    }
}

fn match_children(
    children: &BTreeMap<String, QueryNode>,
    node: tree_sitter::Node<'_>,
    parsed: &ParsedSource<'_>,
    captures: &mut BTreeMap<String, Capture>,
) -> bool {
    for (property, child_query) in children {
        let Some(child) = tree::accessor(node, property) else {
            // Missing property is a local match failure, not an error.
            return false;
        };
        if !match_node(child_query, child, parsed, captures) {
            return false;
        }
    }
    true
}

fn record_capture(
    name: Option<&str>,
    node: tree_sitter::Node<'_>,
    parsed: &ParsedSource<'_>,
    captures: &mut BTreeMap<String, Capture>,
) {
    if let Some(name) = name {
        let (line, column) = tree::position(node);
        captures.insert(
            name.to_string(),
            Capture {
                text: parsed.node_text(node).to_string(),
                line,
                column,
                byte_start: node.start_byte(),
                byte_end: node.end_byte(),
            },
        );
    }
}

/// Search one parsed file: preorder walk, one full match attempt per node.
///
/// Appends results to `out` and returns how many matches this file
/// produced. Stops the instant the budget is exhausted; remaining nodes are
/// never visited.
pub fn search_tree(
    query: &QueryNode,
    parsed: &ParsedSource<'_>,
    file: &Path,
    mode: OutputMode,
    budget: &mut MatchBudget,
    out: &mut Vec<MatchResult>,
) -> usize {
    let mut found = 0;

    for node in parsed.preorder() {
        if budget.exhausted() {
            break;
        }

        let mut captures = BTreeMap::new();
        if !match_node(query, node, parsed, &mut captures) {
            continue;
        }

        let (line, column) = tree::position(node);
        let text = parsed.node_text(node);

        out.push(MatchResult {
            file: file.to_path_buf(),
            line,
            column,
            kind: node.kind().to_string(),
            text: mode.render(text),
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            captures: match mode {
                OutputMode::Summary => None,
                _ => Some(captures),
            },
        });

        found += 1;
        budget.record();
    }

    debug!(file = %file.display(), found, "file searched");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile_str;
    use crate::tree::SourceParser;

    fn search_source(source: &str, pattern: &str, mode: OutputMode) -> Vec<MatchResult> {
        let mut parser = SourceParser::new().unwrap();
        let parsed = parser.parse(source).unwrap();
        let query = compile_str(pattern).unwrap();
        let mut budget = MatchBudget::new(None);
        let mut out = Vec::new();
        search_tree(&query, &parsed, Path::new("test.rs"), mode, &mut budget, &mut out);
        out
    }

    #[test]
    fn wildcard_matches_every_node() {
        let source = "fn main() { let x = 1; }";
        let mut parser = SourceParser::new().unwrap();
        let parsed = parser.parse(source).unwrap();

        let matches = search_source(source, r#"{"$any": true}"#, OutputMode::Compact);
        assert_eq!(matches.len(), parsed.node_count());
    }

    #[test]
    fn kind_query_finds_all_nested_occurrences() {
        // A call inside a call: failed or succeeded attempts never prune
        // traversal, so both levels match.
        let matches = search_source(
            "fn main() { outer(inner(1)); }",
            r#"{"kind": "call_expression"}"#,
            OutputMode::Full,
        );
        assert_eq!(matches.len(), 2);
        assert!(matches[0].text.contains("outer"));
        assert!(matches[1].text.contains("inner"));
    }

    #[test]
    fn text_constraint_filters_matches() {
        let matches = search_source(
            "fn main() { foo(); bar(); foobar(); }",
            r#"{"kind": "identifier", "$text": "foo"}"#,
            OutputMode::Full,
        );
        // Substring semantics unless the pattern anchors itself.
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert!(m.text.contains("foo"));
        }

        let anchored = search_source(
            "fn main() { foo(); bar(); foobar(); }",
            r#"{"kind": "identifier", "$text": "^foo$"}"#,
            OutputMode::Full,
        );
        assert_eq!(anchored.len(), 1);
    }

    #[test]
    fn capture_on_wildcard_child() {
        let matches = search_source(
            "fn main() { let c = a + b; }",
            r#"{"kind": "binary_expression", "right": {"$any": true, "$capture": "rhs"}}"#,
            OutputMode::Full,
        );
        assert_eq!(matches.len(), 1);

        let captures = matches[0].captures.as_ref().unwrap();
        assert_eq!(captures["rhs"].text, "b");
        assert_eq!(captures["rhs"].line, 1);
    }

    #[test]
    fn missing_property_fails_locally_only() {
        // `1 + 2` has left/operator/right; an identifier does not. The
        // binary expression still matches while other nodes fail quietly.
        let matches = search_source(
            "fn main() { let x = 1 + 2; }",
            r#"{"kind": "binary_expression", "left": {"$any": true}}"#,
            OutputMode::Full,
        );
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn unknown_kind_yields_zero_matches() {
        let matches = search_source(
            "fn main() {}",
            r#"{"kind": "NoSuchKind"}"#,
            OutputMode::Full,
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn budget_stops_traversal_mid_file() {
        let source = "fn main() { a(); b(); c(); d(); }";
        let mut parser = SourceParser::new().unwrap();
        let parsed = parser.parse(source).unwrap();
        let query = compile_str(r#"{"kind": "call_expression"}"#).unwrap();

        let mut budget = MatchBudget::new(Some(2));
        let mut out = Vec::new();
        let found = search_tree(
            &query,
            &parsed,
            Path::new("test.rs"),
            OutputMode::Full,
            &mut budget,
            &mut out,
        );

        assert_eq!(found, 2);
        assert!(budget.exhausted());
    }

    #[test]
    fn summary_mode_drops_text_and_captures() {
        let matches = search_source(
            "fn main() { let c = a + b; }",
            r#"{"kind": "binary_expression", "right": {"$any": true, "$capture": "rhs"}}"#,
            OutputMode::Summary,
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "");
        assert!(matches[0].captures.is_none());
    }

    #[test]
    fn duplicate_capture_names_last_write_wins() {
        let matches = search_source(
            "fn main() { let c = a + b; }",
            r#"{"kind": "binary_expression",
               "left": {"$any": true, "$capture": "side"},
               "right": {"$any": true, "$capture": "side"}}"#,
            OutputMode::Full,
        );
        assert_eq!(matches.len(), 1);
        // Children match in BTreeMap key order: "left" then "right".
        let captures = matches[0].captures.as_ref().unwrap();
        assert_eq!(captures["side"].text, "b");
    }
}
