//! AST normalizer: recursive descent from a span-tracked syntax tree to a
//! plain nested mapping/sequence structure.
//!
//! Dispatch is an explicit registry mapping a node kind (and optionally a
//! (kind, field) pair) to a handler function; unregistered kinds fall back to
//! the default handler. The fallback is deliberate - an unknown kind is not an
//! error, it just gets the generic treatment.

use std::collections::HashMap;

use forma_error::{Error, Result};
use serde_json::{Map, Value};
use tracing::debug;
use tree_sitter::Node;

use crate::comments::collect_comments;
use crate::doc::NormalizedDocument;
use crate::literal::{self, NumericLiteral};
use crate::parse::ParsedSource;
use crate::source::{SourceMap, Span};

/// Reserved key carrying each node's syntactic kind tag. No handler may emit
/// a field under this name; a collision is an internal-consistency defect.
pub const KIND_KEY: &str = "ast_type";

/// Grammar fields that may legally be absent; missing ones normalize to JSON
/// null instead of being dropped.
const OPTIONAL_FIELDS: &[(&str, &str)] = &[
    ("function_definition", "return_type"),
    ("class_definition", "superclasses"),
    ("assignment", "type"),
    ("typed_parameter", "type"),
];

/// Handler signature: normalize one node into a JSON value.
pub type NodeHandler = for<'t> fn(&Normalizer<'t>, Node<'t>) -> Result<Value>;

/// Explicit dispatch table for the normalizer.
///
/// Keyed by node kind, with optional per-(kind, field) overrides consulted
/// before the child's own kind handler. Lookup falls back to the default
/// handler when nothing is registered.
pub struct HandlerRegistry {
    nodes: HashMap<&'static str, NodeHandler>,
    fields: HashMap<(&'static str, &'static str), NodeHandler>,
}

impl HandlerRegistry {
    /// An empty registry; every node gets the default treatment.
    pub fn empty() -> Self {
        Self {
            nodes: HashMap::new(),
            fields: HashMap::new(),
        }
    }

    /// The built-in table covering the literal special cases the output
    /// format requires.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register_node("integer", handle_number);
        reg.register_node("float", handle_number);
        reg.register_node("binary_operator", handle_binary_operator);
        reg.register_node("identifier", handle_identifier);
        reg.register_node("true", handle_constant);
        reg.register_node("false", handle_constant);
        reg.register_node("none", handle_constant);
        reg.register_node("string", handle_string);
        reg.register_node("module", handle_body);
        reg.register_node("block", handle_body);
        reg.register_node("expression_statement", handle_expression_statement);
        reg
    }

    /// Register (or replace) the handler for a node kind.
    pub fn register_node(&mut self, kind: &'static str, handler: NodeHandler) {
        self.nodes.insert(kind, handler);
    }

    /// Register a handler for one field of one node kind, overriding the
    /// child's own kind handler in that position.
    pub fn register_field(&mut self, kind: &'static str, field: &'static str, handler: NodeHandler) {
        self.fields.insert((kind, field), handler);
    }

    fn node(&self, kind: &str) -> Option<NodeHandler> {
        self.nodes.get(kind).copied()
    }

    fn field(&self, kind: &str, field: &str) -> Option<NodeHandler> {
        self.fields.get(&(kind, field)).copied()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Converts one parsed tree into a normalized document.
///
/// Pure and synchronous: the only state is a borrow of the parse result for
/// the single fragment being processed, so independent fragments can be
/// normalized concurrently by the caller.
pub struct Normalizer<'t> {
    parsed: &'t ParsedSource,
    registry: HandlerRegistry,
}

impl<'t> Normalizer<'t> {
    pub fn new(parsed: &'t ParsedSource) -> Self {
        Self {
            parsed,
            registry: HandlerRegistry::builtin(),
        }
    }

    /// Use a caller-supplied registry (extension point for blueprint tooling).
    pub fn with_registry(parsed: &'t ParsedSource, registry: HandlerRegistry) -> Self {
        Self { parsed, registry }
    }

    pub fn source(&self) -> &'t SourceMap {
        self.parsed.source()
    }

    /// Normalize the whole fragment: root tree plus the parallel comment
    /// stream.
    pub fn normalize(&self) -> Result<NormalizedDocument> {
        let root = self.normalize_node(self.parsed.root())?;
        let comments = collect_comments(self.parsed)?;
        debug!(comments = comments.len(), "normalized source fragment");
        Ok(NormalizedDocument { root, comments })
    }

    /// Normalize one node: registered handler if any, default otherwise.
    pub fn normalize_node(&self, node: Node<'t>) -> Result<Value> {
        match self.registry.node(node.kind()) {
            Some(handler) => handler(self, node),
            None => self.default_node(node),
        }
    }

    fn normalize_field(&self, parent: Node<'t>, field: &str, child: Node<'t>) -> Result<Value> {
        match self.registry.field(parent.kind(), field) {
            Some(handler) => handler(self, child),
            None => self.normalize_node(child),
        }
    }

    /// Default handler: kind tag, then every declared child under its grammar
    /// field name (repeated fields become arrays, field-less named children
    /// group under `children`), then position metadata, span, and source
    /// text. Fields backed by anonymous tokens, like `operator`, carry the
    /// token's verbatim text so no declared field is ever dropped.
    pub fn default_node(&self, node: Node<'t>) -> Result<Value> {
        let mut map = tagged(node.kind());
        let mut loose = Vec::new();

        for i in 0..node.child_count() {
            let Some(child) = node.child(i) else { continue };
            if child.kind() == "comment" {
                continue;
            }
            match node.field_name_for_child(i as u32) {
                Some(field) => {
                    let value = if child.is_named() {
                        self.normalize_field(node, field, child)?
                    } else {
                        Value::String(self.node_text(child)?.to_string())
                    };
                    push_field(&mut map, field, value)?;
                }
                None if child.is_named() => loose.push(self.normalize_node(child)?),
                None => {}
            }
        }

        for (kind, field) in OPTIONAL_FIELDS {
            if *kind == node.kind() && !map.contains_key(*field) {
                insert_field(&mut map, field, Value::Null)?;
            }
        }

        if !loose.is_empty() {
            insert_field(&mut map, "children", Value::Array(loose))?;
        }

        self.attach_span(&mut map, node)?;
        Ok(Value::Object(map))
    }

    /// Attach line/column anchors, byte offsets, and the verbatim source
    /// substring for the node.
    pub fn attach_span(&self, map: &mut Map<String, Value>, node: Node<'t>) -> Result<()> {
        let start = node.start_position();
        let end = node.end_position();
        insert_field(map, "lineno", Value::from(start.row + 1))?;
        insert_field(map, "col_offset", Value::from(start.column))?;
        insert_field(map, "end_lineno", Value::from(end.row + 1))?;
        insert_field(map, "end_col_offset", Value::from(end.column))?;

        let span = Span::of(&node);
        insert_field(map, "start", Value::from(span.start))?;
        insert_field(map, "end", Value::from(span.end))?;
        insert_field(
            map,
            "source",
            Value::String(self.source().snippet(span)?.to_string()),
        )?;
        Ok(())
    }

    /// The verbatim source text of a node.
    pub fn node_text(&self, node: Node<'t>) -> Result<&'t str> {
        self.source().node_text(&node)
    }

    /// Fold `numeric ± imaginary` into a single complex literal record, the
    /// shape a constant-folded complex literal takes. Returns None when the
    /// operator node is an ordinary binary expression.
    fn try_fold_complex(&self, node: Node<'t>) -> Result<Option<Value>> {
        let (Some(left), Some(op), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("operator"),
            node.child_by_field_name("right"),
        ) else {
            return Ok(None);
        };

        let op_text = self.node_text(op)?;
        if op_text != "+" && op_text != "-" {
            return Ok(None);
        }
        if !matches!(left.kind(), "integer" | "float")
            || !matches!(right.kind(), "integer" | "float")
        {
            return Ok(None);
        }
        let right_text = self.node_text(right)?;
        let Some(imag_magnitude) = literal::strip_imaginary_suffix(right_text) else {
            return Ok(None);
        };
        let left_text = self.node_text(left)?;
        if literal::strip_imaginary_suffix(left_text).is_some() {
            return Ok(None);
        }

        let real = literal::float_repr(left_text)?;
        let mut imag = literal::float_repr(imag_magnitude)?;
        if op_text == "-" {
            imag = literal::float_negate(&imag);
        }

        let mut map = Map::new();
        NumericLiteral::Complex { real, imag }.write_fields(&mut map);
        self.attach_span(&mut map, node)?;
        Ok(Some(Value::Object(map)))
    }
}

/// Fresh node mapping carrying only the kind tag.
fn tagged(kind: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(KIND_KEY.to_string(), Value::String(kind.to_string()));
    map
}

/// Insert a field, guarding the reserved kind-tag key. A collision means the
/// handler table itself is defective, so normalization aborts.
fn insert_field(map: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    if key == KIND_KEY {
        return Err(Error::internal_consistency(format!(
            "handler emitted a field named '{}', colliding with the kind tag",
            KIND_KEY
        ))
        .with_operation("normalize::insert_field"));
    }
    map.insert(key.to_string(), value);
    Ok(())
}

/// Insert a grammar field, promoting repeated fields to arrays in child
/// order.
fn push_field(map: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    if key == KIND_KEY {
        return Err(Error::internal_consistency(format!(
            "grammar field named '{}' collides with the kind tag",
            KIND_KEY
        ))
        .with_operation("normalize::push_field"));
    }
    match map.get_mut(key) {
        None => {
            map.insert(key.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
    Ok(())
}

/// Numeric literal node: tag with its subkind and carry values as strings.
fn handle_number<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    let lit = NumericLiteral::classify(n.node_text(node)?)?;
    let mut map = Map::new();
    lit.write_fields(&mut map);
    n.attach_span(&mut map, node)?;
    Ok(Value::Object(map))
}

/// Binary operator: fold complex literals, otherwise default treatment.
fn handle_binary_operator<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    if let Some(folded) = n.try_fold_complex(node)? {
        return Ok(folded);
    }
    n.default_node(node)
}

/// Identifiers normalize to their text unchanged - a plain string, no
/// re-encoding and no wrapping map.
fn handle_identifier<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    Ok(Value::String(n.node_text(node)?.to_string()))
}

/// Constant literals (True/False/None) carry their repr as a string so they
/// stay distinguishable from parsed numeric literals yet remain JSON-safe.
fn handle_constant<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    let mut map = tagged("constant");
    insert_field(
        &mut map,
        "value",
        Value::String(n.node_text(node)?.to_string()),
    )?;
    n.attach_span(&mut map, node)?;
    Ok(Value::Object(map))
}

/// String literal: byte strings render as the repr of their decoded bytes,
/// text strings pass their content through unchanged. Strings carrying
/// interpolations are not flattened to a single `s` value; they keep their
/// full subtree via the default handler.
fn handle_string<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    let mut prefix = "";
    let mut content = String::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        match child.kind() {
            "string_start" => prefix = n.node_text(child)?,
            "string_content" | "escape_sequence" => content.push_str(n.node_text(child)?),
            "interpolation" => return n.default_node(node),
            _ => {}
        }
    }

    let is_bytes = prefix.chars().any(|c| c == 'b' || c == 'B');
    let mut map = if is_bytes {
        let decoded = literal::decode_bytes_literal(&content)?;
        let mut map = tagged("bytes");
        insert_field(&mut map, "s", Value::String(literal::bytes_repr(&decoded)))?;
        map
    } else {
        let mut map = tagged("string");
        insert_field(&mut map, "s", Value::String(content))?;
        map
    };
    n.attach_span(&mut map, node)?;
    Ok(Value::Object(map))
}

/// Statement containers (module, block): statements have no grammar field
/// name, so they group under `body` in source order.
fn handle_body<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    let mut map = tagged(node.kind());
    let mut body = Vec::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        if !child.is_named() || child.kind() == "comment" {
            continue;
        }
        body.push(n.normalize_node(child)?);
    }
    insert_field(&mut map, "body", Value::Array(body))?;
    n.attach_span(&mut map, node)?;
    Ok(Value::Object(map))
}

/// Expression statement: a single wrapped expression sits under `value`.
fn handle_expression_statement<'t>(n: &Normalizer<'t>, node: Node<'t>) -> Result<Value> {
    let mut map = tagged(node.kind());
    let mut exprs = Vec::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        if !child.is_named() || child.kind() == "comment" {
            continue;
        }
        exprs.push(n.normalize_node(child)?);
    }
    if exprs.len() == 1 {
        let value = exprs.pop().unwrap_or(Value::Null);
        insert_field(&mut map, "value", value)?;
    } else {
        insert_field(&mut map, "value", Value::Array(exprs))?;
    }
    n.attach_span(&mut map, node)?;
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParsedSource;

    fn normalize(source: &str) -> Value {
        let parsed = ParsedSource::parse(source).unwrap();
        Normalizer::new(&parsed).normalize().unwrap().root
    }

    fn first_statement(root: &Value) -> &Value {
        &root["body"][0]
    }

    #[test]
    fn test_int_literal_tagged() {
        let root = normalize("3\n");
        let num = &first_statement(&root)["value"];
        assert_eq!(num["ast_type"], "int");
        assert_eq!(num["n"], "3");
    }

    #[test]
    fn test_float_literal_tagged() {
        let root = normalize("3.5\n");
        let num = &first_statement(&root)["value"];
        assert_eq!(num["ast_type"], "float");
        assert_eq!(num["n"], "3.5");
    }

    #[test]
    fn test_complex_literal_folded() {
        let root = normalize("2+3j\n");
        let num = &first_statement(&root)["value"];
        assert_eq!(num["ast_type"], "complex");
        assert_eq!(num["n"], "2.0");
        assert_eq!(num["i"], "3.0");
    }

    #[test]
    fn test_negative_imaginary_folded() {
        let root = normalize("2-3j\n");
        let num = &first_statement(&root)["value"];
        assert_eq!(num["ast_type"], "complex");
        assert_eq!(num["i"], "-3.0");
    }

    #[test]
    fn test_plain_binary_operator_not_folded() {
        let root = normalize("2+3\n");
        let expr = &first_statement(&root)["value"];
        assert_eq!(expr["ast_type"], "binary_operator");
        assert_eq!(expr["left"]["ast_type"], "int");
        assert_eq!(expr["right"]["ast_type"], "int");
    }

    #[test]
    fn test_operator_field_distinguishes_expressions() {
        let add = normalize("2+9\n");
        let mul = normalize("2*9\n");
        let add_expr = &first_statement(&add)["value"];
        let mul_expr = &first_statement(&mul)["value"];
        assert_eq!(add_expr["operator"], "+");
        assert_eq!(mul_expr["operator"], "*");
        assert_ne!(add_expr["operator"], mul_expr["operator"]);
    }

    #[test]
    fn test_anonymous_token_fields_kept() {
        let root = normalize("x += 1\nnot x\ny < 2\n");
        let augmented = &root["body"][0]["value"];
        assert_eq!(augmented["ast_type"], "augmented_assignment");
        assert_eq!(augmented["operator"], "+=");
        let unary = &root["body"][1]["value"];
        assert_eq!(unary["ast_type"], "not_operator");
        let comparison = &root["body"][2]["value"];
        assert_eq!(comparison["ast_type"], "comparison_operator");
        assert_eq!(comparison["operators"], "<");
    }

    #[test]
    fn test_fstring_keeps_interpolation_subtree() {
        let root = normalize("s = f\"a{x}b\"\n");
        let string = &first_statement(&root)["value"]["right"];
        assert_eq!(string["ast_type"], "string");
        assert!(string.get("s").is_none());
        let children = string["children"].as_array().unwrap();
        assert!(children
            .iter()
            .any(|c| c["ast_type"] == "interpolation"));
    }

    #[test]
    fn test_plain_string_still_flattened() {
        let root = normalize("s = \"ab\"\n");
        let string = &first_statement(&root)["value"]["right"];
        assert_eq!(string["ast_type"], "string");
        assert_eq!(string["s"], "ab");
        assert!(string.get("children").is_none());
    }

    #[test]
    fn test_identifier_is_plain_string() {
        let root = normalize("x = 1\n");
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["ast_type"], "assignment");
        assert_eq!(assign["left"], "x");
    }

    #[test]
    fn test_constant_repr() {
        let root = normalize("flag = True\n");
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["right"]["ast_type"], "constant");
        assert_eq!(assign["right"]["value"], "True");
    }

    #[test]
    fn test_none_constant() {
        let root = normalize("x = None\n");
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["right"]["value"], "None");
    }

    #[test]
    fn test_string_passthrough() {
        let root = normalize("s = 'hello'\n");
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["right"]["ast_type"], "string");
        assert_eq!(assign["right"]["s"], "hello");
    }

    #[test]
    fn test_bytes_repr() {
        let root = normalize("s = b'ab\\n'\n");
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["right"]["ast_type"], "bytes");
        assert_eq!(assign["right"]["s"], "b'ab\\n'");
    }

    #[test]
    fn test_absent_optional_field_is_null() {
        let root = normalize("def f():\n    pass\n");
        let func = first_statement(&root);
        assert_eq!(func["ast_type"], "function_definition");
        assert!(func["return_type"].is_null());
    }

    #[test]
    fn test_present_optional_field_kept() {
        let root = normalize("def f() -> int:\n    pass\n");
        let func = first_statement(&root);
        assert_eq!(func["return_type"]["ast_type"], "type");
        assert_eq!(func["return_type"]["source"], "int");
    }

    #[test]
    fn test_unknown_kind_falls_back_to_default() {
        // lambda has no registered handler; the default handler applies
        let root = normalize("f = lambda v: v\n");
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["right"]["ast_type"], "lambda");
        assert!(assign["right"]["source"].is_string());
    }

    #[test]
    fn test_field_override_wins() {
        let parsed = ParsedSource::parse("x = 1\n").unwrap();
        let mut registry = HandlerRegistry::builtin();
        registry.register_field("assignment", "right", |_, _| {
            Ok(Value::String("redacted".to_string()))
        });
        let doc = Normalizer::with_registry(&parsed, registry)
            .normalize()
            .unwrap();
        let assign = &doc.root["body"][0]["value"];
        assert_eq!(assign["right"], "redacted");
    }

    #[test]
    fn test_insert_field_rejects_reserved_key() {
        let mut map = Map::new();
        let err = insert_field(&mut map, KIND_KEY, Value::Null).unwrap_err();
        assert_eq!(err.kind(), forma_error::ErrorKind::InternalConsistency);
    }

    #[test]
    fn test_source_attached_to_nodes() {
        let source = "x = 1\n";
        let root = normalize(source);
        assert_eq!(root["source"], source);
        let assign = &first_statement(&root)["value"];
        assert_eq!(assign["source"], "x = 1");
    }
}
