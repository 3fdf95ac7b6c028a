//! The normalized document: root node tree plus parallel comment records.

use forma_error::{Error, Result};
use serde_json::Value;

use crate::emit;

/// JSON-serializable output of one normalization pass.
///
/// The root node is the canonical structure; comments are supplementary
/// metadata for round-tripping, attached at the top level rather than
/// interleaved into the tree.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub root: Value,
    pub comments: Vec<Value>,
}

impl NormalizedDocument {
    /// Merge the root mapping and the `comments` array into one JSON value.
    pub fn to_value(&self) -> Result<Value> {
        let Value::Object(mut map) = self.root.clone() else {
            return Err(
                Error::internal_consistency("document root is not a mapping")
                    .with_operation("doc::to_value"),
            );
        };
        map.insert("comments".to_string(), Value::Array(self.comments.clone()));
        Ok(Value::Object(map))
    }

    /// Serialize to canonical JSON text. See [`crate::emit`] for the layout
    /// guarantees.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        emit::value_to_json(&self.to_value()?, pretty)
    }
}
