//! Source locator: verbatim source text plus byte-span extraction.

use forma_error::{Error, Result};
use tree_sitter::Node;

/// Byte span inside a source fragment. Start is inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covered by a syntax node's first and last lexical tokens.
    pub fn of(node: &Node<'_>) -> Self {
        Self::new(node.start_byte(), node.end_byte())
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check that `other` lies entirely inside this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Owns the verbatim text of a single source fragment and resolves spans back
/// to the exact substrings they cover.
///
/// One `SourceMap` is scoped to one normalization pass; it is never mutated
/// after construction.
#[derive(Debug, Clone)]
pub struct SourceMap {
    text: String,
}

impl SourceMap {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The complete source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The exact substring covered by `span`.
    ///
    /// Fails loudly with `SourceUnavailable` when the span is inverted, out of
    /// range, or does not fall on character boundaries; spans are never
    /// fabricated or clamped.
    pub fn snippet(&self, span: Span) -> Result<&str> {
        if span.start > span.end || span.end > self.text.len() {
            return Err(Error::source_unavailable(format!(
                "span [{}, {}) outside source of {} bytes",
                span.start,
                span.end,
                self.text.len()
            ))
            .with_operation("source::snippet")
            .with_context("start", span.start.to_string())
            .with_context("end", span.end.to_string()));
        }
        self.text.get(span.start..span.end).ok_or_else(|| {
            Error::source_unavailable(format!(
                "span [{}, {}) does not fall on character boundaries",
                span.start, span.end
            ))
            .with_operation("source::snippet")
        })
    }

    /// The substring covered by a syntax node.
    pub fn node_text(&self, node: &Node<'_>) -> Result<&str> {
        self.snippet(Span::of(node))
    }
}

/// Strip the common leading indentation from every non-blank line.
///
/// Constructor fragments are lifted out of an enclosing class body, so they
/// arrive indented; the parser requires them flush-left.
pub fn dedent(source: &str) -> String {
    let margin = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    if margin == 0 {
        return source.to_string();
    }

    let mut out = String::with_capacity(source.len());
    for (i, line) in source.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(&line[margin..]);
    }
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}
