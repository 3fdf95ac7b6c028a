//! forma-core: the blueprint DSL compiler core.
//!
//! Pipeline: a constructor-style source fragment is dedented and parsed into a
//! span-tracked syntax tree, the tree is normalized into a plain JSON mapping
//! where every node carries its kind tag, source span, and verbatim source
//! text, comments are collected as a parallel record stream, and the whole
//! document is serialized to canonical JSON (sorted keys, byte-stable).

pub mod comments;
pub mod doc;
pub mod emit;
pub mod literal;
pub mod normalize;
pub mod parse;
pub mod source;

pub use comments::collect_comments;
pub use doc::NormalizedDocument;
pub use emit::value_to_json;
pub use forma_error::{Error, ErrorKind, Result};
pub use literal::NumericLiteral;
pub use normalize::{HandlerRegistry, Normalizer, KIND_KEY};
pub use parse::ParsedSource;
pub use source::{dedent, SourceMap, Span};
pub use tree_sitter::{Node, Parser, Point, Tree};
