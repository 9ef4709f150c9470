use crate::tree::errors::TreeError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Parser, Tree, TreeCursor};

/// Tree-sitter parser wrapper for Rust source code.
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    pub fn new() -> Result<Self, TreeError> {
        let mut parser = Parser::new();
        let ts_lang = SupportLang::Rust.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse<'a>(&mut self, source: &'a str) -> Result<ParsedSource<'a>, TreeError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(TreeError::ParseFailed)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
///
/// Dropped as soon as the file's search (and rewrite, if any) completes, so
/// peak memory on large file sets is bounded by one tree at a time.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// Preorder (parent-before-children, depth-first) iterator over every
    /// node in the tree, the root included. Restartable: each call walks
    /// from the root again.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            cursor: self.tree.root_node().walk(),
            done: false,
        }
    }

    /// Total node count, named and anonymous alike.
    pub fn node_count(&self) -> usize {
        self.preorder().count()
    }
}

/// Cursor-driven preorder walk over a parsed tree.
pub struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();

        // Advance: first child, else next sibling, climbing until one exists.
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }

        Some(node)
    }
}

/// 1-based (line, column) of a node's start.
pub fn position(node: Node<'_>) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}

/// Resolve a logical property name to a child node.
///
/// Property names map onto tree-sitter field names (`function`, `left`,
/// `operator`, `right`, ...), so the recognized set is exactly the grammar's
/// field table. Returns `None` when the node has no such field.
pub fn accessor<'t>(node: Node<'t>, property: &str) -> Option<Node<'t>> {
    node.child_by_field_name(property)
}

/// Whether the grammar knows a node kind by this name.
///
/// Queries naming an unknown kind still compile; they just never match.
pub fn kind_is_known(kind: &str) -> bool {
    let lang = SupportLang::Rust.get_ts_language();
    lang.id_for_node_kind(kind, true) != 0 || lang.id_for_node_kind(kind, false) != 0
}
