//! Comment extraction.
//!
//! Comments are not part of the structural tree; they are collected in a
//! separate pass as a parallel record stream, ordered by position in the
//! token stream. Traversal uses an explicit worklist so pathologically deep
//! input cannot exhaust the stack.

use forma_error::Result;
use serde_json::{json, Value};
use tree_sitter::Node;

use crate::parse::ParsedSource;
use crate::source::{SourceMap, Span};

/// Collect every comment token in the fragment, in source order.
pub fn collect_comments(parsed: &ParsedSource) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    let mut stack = vec![parsed.root()];

    while let Some(node) = stack.pop() {
        if node.kind() == "comment" {
            out.push(comment_record(parsed.source(), node)?);
            continue;
        }
        // push children in reverse so the pop order is source order
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }

    Ok(out)
}

/// One comment record: kind, literal text, byte span, and line/column span.
fn comment_record(src: &SourceMap, node: Node<'_>) -> Result<Value> {
    let span = Span::of(&node);
    let text = src.snippet(span)?;
    let start = node.start_position();
    let end = node.end_position();

    Ok(json!({
        "ast_type": "comment",
        "value": text,
        "start": span.start,
        "end": span.end,
        "loc": {
            "start": { "line": start.row + 1, "column": start.column },
            "end": { "line": end.row + 1, "column": end.column },
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParsedSource;

    #[test]
    fn test_single_comment() {
        let parsed = ParsedSource::parse("x = 1  # hello\n").unwrap();
        let comments = collect_comments(&parsed).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["ast_type"], "comment");
        assert_eq!(comments[0]["value"], "# hello");
        assert_eq!(comments[0]["loc"]["start"]["line"], 1);
    }

    #[test]
    fn test_comments_in_source_order() {
        let source = "# first\nx = 1\n# second\ny = 2  # third\n";
        let parsed = ParsedSource::parse(source).unwrap();
        let comments = collect_comments(&parsed).unwrap();
        let texts: Vec<&str> = comments
            .iter()
            .map(|c| c["value"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["# first", "# second", "# third"]);
    }

    #[test]
    fn test_comment_span_matches_source() {
        let source = "x = 1  # tail\n";
        let parsed = ParsedSource::parse(source).unwrap();
        let comments = collect_comments(&parsed).unwrap();
        let start = comments[0]["start"].as_u64().unwrap() as usize;
        let end = comments[0]["end"].as_u64().unwrap() as usize;
        assert_eq!(&source[start..end], "# tail");
    }

    #[test]
    fn test_no_comments() {
        let parsed = ParsedSource::parse("x = 1\n").unwrap();
        assert!(collect_comments(&parsed).unwrap().is_empty());
    }
}
