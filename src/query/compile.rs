use crate::query::errors::QueryError;
use crate::query::model::QueryNode;
use crate::tree;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Compile a JSON pattern string into a [`QueryNode`] tree.
pub fn compile_str(pattern: &str) -> Result<QueryNode, QueryError> {
    let value: Value = serde_json::from_str(pattern)?;
    compile(&value)
}

/// Compile a JSON value into a [`QueryNode`] tree.
///
/// Validation happens here, once, never per node visit: the root must have
/// a `kind` or be a `$any` wildcard, and every `$text` value must be a
/// valid regex. A `kind` the grammar does not know compiles fine (and is
/// logged); such a subtree legitimately matches nothing.
pub fn compile(value: &Value) -> Result<QueryNode, QueryError> {
    let node = compile_node(value)?;

    match &node {
        QueryNode::Wildcard { .. } => Ok(node),
        QueryNode::Match { kind: Some(_), .. } => Ok(node),
        QueryNode::Match { kind: None, .. } => Err(QueryError::MissingKind),
    }
}

fn compile_node(value: &Value) -> Result<QueryNode, QueryError> {
    let map = value.as_object().ok_or_else(|| QueryError::NotAnObject {
        found: json_type_name(value).to_string(),
    })?;

    let mut kind = None;
    let mut text = None;
    let mut wildcard = false;
    let mut capture = None;
    let mut children = BTreeMap::new();

    for (key, val) in map {
        match key.as_str() {
            "kind" => {
                let k = expect_str(key, val)?;
                if !tree::kind_is_known(k) {
                    warn!(kind = k, "kind not known to the grammar; this query subtree will never match");
                }
                kind = Some(k.to_string());
            }
            "$any" => {
                wildcard = val.as_bool().ok_or(QueryError::InvalidKeyType {
                    key: key.clone(),
                    expected: "boolean",
                })?;
            }
            "$text" => {
                let pattern = expect_str(key, val)?;
                let re = Regex::new(pattern).map_err(|e| QueryError::InvalidTextRegex {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })?;
                text = Some(re);
            }
            "$capture" => {
                capture = Some(expect_str(key, val)?.to_string());
            }
            property => {
                children.insert(property.to_string(), compile_node(val)?);
            }
        }
    }

    if wildcard {
        // Wildcard ignores kind/$text on the same node; drop them here so
        // the matcher never has to re-check the special case.
        Ok(QueryNode::Wildcard { capture, children })
    } else {
        Ok(QueryNode::Match {
            kind,
            text,
            capture,
            children,
        })
    }
}

fn expect_str<'v>(key: &str, val: &'v Value) -> Result<&'v str, QueryError> {
    val.as_str().ok_or(QueryError::InvalidKeyType {
        key: key.to_string(),
        expected: "string",
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_kind_with_nested_properties() {
        let q = compile_str(
            r#"{"kind": "call_expression", "function": {"kind": "identifier", "$text": "^foo$"}}"#,
        )
        .unwrap();

        match &q {
            QueryNode::Match { kind, children, .. } => {
                assert_eq!(kind.as_deref(), Some("call_expression"));
                assert!(children.contains_key("function"));
            }
            QueryNode::Wildcard { .. } => panic!("expected kind match"),
        }
    }

    #[test]
    fn compile_wildcard_root() {
        let q = compile_str(r#"{"$any": true, "$capture": "node"}"#).unwrap();
        assert!(matches!(q, QueryNode::Wildcard { .. }));
        assert_eq!(q.capture(), Some("node"));
    }

    #[test]
    fn wildcard_overrides_kind_and_text() {
        // Documented special case: $any short-circuits kind/$text on the
        // same node.
        let q = compile_str(r#"{"$any": true, "kind": "identifier", "$text": "x"}"#).unwrap();
        assert!(matches!(q, QueryNode::Wildcard { .. }));
    }

    #[test]
    fn root_without_kind_or_wildcard_is_rejected() {
        let err = compile_str(r#"{"$text": "foo"}"#).unwrap_err();
        assert!(matches!(err, QueryError::MissingKind));
    }

    #[test]
    fn nested_node_may_omit_kind() {
        let q = compile_str(r#"{"kind": "call_expression", "function": {"$text": "unwrap"}}"#);
        assert!(q.is_ok());
    }

    #[test]
    fn malformed_text_regex_fails_at_compile() {
        let err =
            compile_str(r#"{"kind": "identifier", "$text": "(unclosed"}"#).unwrap_err();
        assert!(matches!(err, QueryError::InvalidTextRegex { .. }));
    }

    #[test]
    fn unknown_kind_compiles() {
        // Non-fatal: the query is valid, it just can never match.
        let q = compile_str(r#"{"kind": "NoSuchKind"}"#);
        assert!(q.is_ok());
    }

    #[test]
    fn non_object_pattern_is_rejected() {
        assert!(matches!(
            compile_str("[1, 2]").unwrap_err(),
            QueryError::NotAnObject { .. }
        ));
        assert!(compile_str("not json").is_err());
    }
}
