//! Tree-sitter parsing front end.
//!
//! Produces a span-tracked syntax tree from a Python source fragment. Invalid
//! syntax fails here, upstream of the normalizer.

use forma_error::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

use crate::source::SourceMap;

/// A parsed source fragment: the syntax tree plus the source map it indexes.
///
/// The tree borrows nothing from the caller; both the tree and the text are
/// owned, so a `ParsedSource` can outlive the input buffer.
#[derive(Debug)]
pub struct ParsedSource {
    tree: Tree,
    src: SourceMap,
}

impl ParsedSource {
    /// Parse a source fragment into a span-tracked tree.
    ///
    /// The fragment must already be dedented (see [`crate::source::dedent`])
    /// and syntactically valid; any error node in the parse makes the whole
    /// fragment fail with `SyntaxError`.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let src = SourceMap::new(source);

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| {
                Error::parse_failed("failed to load python grammar")
                    .with_operation("parse::parse")
                    .set_source(e)
            })?;

        let tree = parser.parse(src.text(), None).ok_or_else(|| {
            Error::parse_failed("parser produced no tree").with_operation("parse::parse")
        })?;

        if tree.root_node().has_error() {
            let node = first_error_node(tree.root_node());
            let mut err = Error::syntax_error("source fragment contains invalid syntax")
                .with_operation("parse::parse");
            if let Some(node) = node {
                err = err
                    .with_context("line", (node.start_position().row + 1).to_string())
                    .with_context("column", node.start_position().column.to_string());
            }
            return Err(err);
        }

        tracing::debug!(bytes = src.len(), "parsed source fragment");
        Ok(Self { tree, src })
    }

    /// Root node of the parsed tree (kind `module`).
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source map backing this tree's spans.
    pub fn source(&self) -> &SourceMap {
        &self.src
    }
}

/// Locate the first ERROR or missing node, depth first.
fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error_node(child) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_fragment() {
        let parsed = ParsedSource::parse("x = 1\n").unwrap();
        assert_eq!(parsed.root().kind(), "module");
        assert!(!parsed.root().has_error());
    }

    #[test]
    fn test_parse_invalid_fragment_fails() {
        let err = ParsedSource::parse("def oops(:\n").unwrap_err();
        assert_eq!(err.kind(), forma_error::ErrorKind::SyntaxError);
    }

    #[test]
    fn test_root_spans_whole_source() {
        let text = "def f():\n    return 2\n";
        let parsed = ParsedSource::parse(text).unwrap();
        assert_eq!(parsed.root().start_byte(), 0);
        assert_eq!(parsed.root().end_byte(), text.len());
    }
}
