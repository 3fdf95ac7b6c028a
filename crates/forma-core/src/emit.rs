//! Canonical JSON emission.
//!
//! Keys are always sorted (the value map is BTree-backed) and separators are
//! fixed, so two passes over identical source produce byte-identical output.
//! Compact mode uses minimal separators; pretty mode indents with four
//! spaces.

use forma_error::{Error, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

/// Serialize a JSON value with the canonical layout.
pub fn value_to_json(value: &Value, pretty: bool) -> Result<String> {
    if !pretty {
        return serde_json::to_string(value).map_err(wrap);
    }

    let mut buf = Vec::with_capacity(4096);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(wrap)?;
    String::from_utf8(buf).map_err(|e| {
        Error::serialization_failed("serializer produced invalid UTF-8")
            .with_operation("emit::value_to_json")
            .set_source(e)
    })
}

fn wrap(err: serde_json::Error) -> Error {
    Error::serialization_failed(err.to_string())
        .with_operation("emit::value_to_json")
        .set_source(err)
}
