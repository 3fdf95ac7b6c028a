//! End-to-end properties of the normalize-and-serialize pipeline.

use forma_core::{dedent, Normalizer, ParsedSource};
use pretty_assertions::assert_eq;
use serde_json::Value;
use textwrap::dedent as tw_dedent;

fn normalize_json(source: &str, pretty: bool) -> String {
    let parsed = ParsedSource::parse(source).unwrap();
    let doc = Normalizer::new(&parsed).normalize().unwrap();
    doc.to_json(pretty).unwrap()
}

fn normalize_value(source: &str) -> Value {
    let json = normalize_json(source, false);
    serde_json::from_str(&json).unwrap()
}

#[test]
fn determinism_byte_identical_output() {
    let source = tw_dedent(
        "
        def deploy(self):
            self.count = 3  # replicas
            self.ratio = 3.5
        ",
    );
    let first = normalize_json(source.trim_start(), true);
    let second = normalize_json(source.trim_start(), true);
    assert_eq!(first, second);

    let compact_first = normalize_json(source.trim_start(), false);
    let compact_second = normalize_json(source.trim_start(), false);
    assert_eq!(compact_first, compact_second);
}

/// Every child node's span must lie within its parent's span.
fn check_containment(node: &Value) {
    let Some(map) = node.as_object() else { return };
    let (Some(start), Some(end)) = (
        map.get("start").and_then(Value::as_u64),
        map.get("end").and_then(Value::as_u64),
    ) else {
        return;
    };

    let mut walk = |child: &Value| {
        if let Some(child_map) = child.as_object() {
            if let (Some(cs), Some(ce)) = (
                child_map.get("start").and_then(Value::as_u64),
                child_map.get("end").and_then(Value::as_u64),
            ) {
                assert!(
                    start <= cs && ce <= end,
                    "child span [{cs}, {ce}) escapes parent span [{start}, {end})"
                );
            }
        }
        check_containment(child);
    };

    for (key, value) in map {
        if key == "comments" {
            continue;
        }
        match value {
            Value::Array(items) => items.iter().for_each(&mut walk),
            other => walk(other),
        }
    }
}

#[test]
fn span_containment() {
    let source = "def f(a, b):\n    if a:\n        return b + 1\n    return [a, b, None]\n";
    let root = normalize_value(source);
    check_containment(&root);
}

/// The `source` field of every node equals the exact substring between its
/// offsets.
fn check_fidelity(node: &Value, text: &str) {
    let Some(map) = node.as_object() else { return };
    if let (Some(start), Some(end), Some(src)) = (
        map.get("start").and_then(Value::as_u64),
        map.get("end").and_then(Value::as_u64),
        map.get("source").and_then(Value::as_str),
    ) {
        assert_eq!(&text[start as usize..end as usize], src);
    }
    for (key, value) in map {
        if key == "comments" {
            continue;
        }
        match value {
            Value::Array(items) => items.iter().for_each(|v| check_fidelity(v, text)),
            other => check_fidelity(other, text),
        }
    }
}

#[test]
fn source_fidelity() {
    let source = "class Widget:\n    def size(self):\n        return 2 * 21\n";
    let root = normalize_value(source);
    check_fidelity(&root, source);
}

#[test]
fn literal_round_trip_int() {
    let root = normalize_value("3\n");
    let num = &root["body"][0]["value"];
    assert_eq!(num["ast_type"], "int");
    assert_eq!(num["n"], "3");
}

#[test]
fn literal_round_trip_float() {
    let root = normalize_value("3.5\n");
    let num = &root["body"][0]["value"];
    assert_eq!(num["ast_type"], "float");
    assert_eq!(num["n"], "3.5");
}

#[test]
fn literal_round_trip_complex() {
    let root = normalize_value("2+3j\n");
    let num = &root["body"][0]["value"];
    assert_eq!(num["ast_type"], "complex");
    assert_eq!(num["n"], "2.0");
    assert_eq!(num["i"], "3.0");
}

#[test]
fn comment_isolation() {
    let source = "x = 1  # hello\n";
    let root = normalize_value(source);

    let comments = root["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert!(comments[0]["value"].as_str().unwrap().contains("hello"));

    // the comment never appears as a structural child
    fn assert_no_comment_nodes(node: &Value) {
        if let Some(map) = node.as_object() {
            for (key, value) in map {
                if key == "comments" {
                    continue;
                }
                if key == "ast_type" {
                    assert_ne!(value, "comment");
                }
                match value {
                    Value::Array(items) => items.iter().for_each(assert_no_comment_nodes),
                    other => assert_no_comment_nodes(other),
                }
            }
        }
    }
    assert_no_comment_nodes(&root);
}

#[test]
fn end_to_end_constructor_fragment() {
    let source = "def __init__(self): self.x = 1  # set x\n";
    let root = normalize_value(source);

    let func = &root["body"][0];
    assert_eq!(func["ast_type"], "function_definition");
    assert_eq!(func["name"], "__init__");

    let assign = &func["body"]["body"][0]["value"];
    assert_eq!(assign["ast_type"], "assignment");
    assert_eq!(assign["left"]["ast_type"], "attribute");
    assert_eq!(assign["left"]["object"], "self");
    assert_eq!(assign["left"]["attribute"], "x");

    let value = &assign["right"];
    assert_eq!(value["ast_type"], "int");
    assert_eq!(value["n"], "1");
    assert!(value["start"].is_u64());
    assert!(value["end"].is_u64());

    let comments = root["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["value"], "# set x");
}

#[test]
fn dedented_fragment_parses() {
    let indented = "    def __init__(self):\n        self.x = 1\n";
    let flush = dedent(indented);
    let root = normalize_value(&flush);
    assert_eq!(root["body"][0]["ast_type"], "function_definition");
}

#[test]
fn whitespace_variants_each_deterministic() {
    // token-identical variants with different spacing normalize
    // deterministically on their own terms
    for source in ["x=1\n", "x = 1\n", "x  =  1\n"] {
        assert_eq!(
            normalize_json(source, false),
            normalize_json(source, false)
        );
    }
}
