//! Literal subtype handling.
//!
//! Numeric literals keep their source-language distinction between integer,
//! float, and complex; a uniform numeric field would silently lose the
//! int/float split and can lose precision, so values travel as strings.

use forma_error::{Error, Result};
use serde_json::{Map, Value};

use crate::normalize::KIND_KEY;

/// A classified numeric literal. Values are kept as strings; complex numbers
/// carry real and imaginary parts separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericLiteral {
    Int(String),
    Float(String),
    Complex { real: String, imag: String },
}

impl NumericLiteral {
    /// Classify a numeric literal token by its source text.
    ///
    /// An imaginary suffix (`j`/`J`) produces a pure-imaginary complex value;
    /// binary `real ± imag` folding happens in the normalizer, not here.
    pub fn classify(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::parse_failed("empty numeric literal")
                .with_operation("literal::classify"));
        }

        if let Some(magnitude) = strip_imaginary_suffix(trimmed) {
            return Ok(NumericLiteral::Complex {
                real: "0.0".to_string(),
                imag: float_repr(magnitude)?,
            });
        }

        if is_float_text(trimmed) {
            Ok(NumericLiteral::Float(trimmed.to_string()))
        } else {
            Ok(NumericLiteral::Int(trimmed.to_string()))
        }
    }

    /// The subkind tag used as the node's `ast_type`.
    pub fn tag(&self) -> &'static str {
        match self {
            NumericLiteral::Int(_) => "int",
            NumericLiteral::Float(_) => "float",
            NumericLiteral::Complex { .. } => "complex",
        }
    }

    /// Emit the literal's value fields into a node mapping: `n` carries the
    /// value (real part for complex), `i` the imaginary part.
    pub fn write_fields(&self, map: &mut Map<String, Value>) {
        map.insert(KIND_KEY.to_string(), Value::String(self.tag().to_string()));
        match self {
            NumericLiteral::Int(n) | NumericLiteral::Float(n) => {
                map.insert("n".to_string(), Value::String(n.clone()));
            }
            NumericLiteral::Complex { real, imag } => {
                map.insert("n".to_string(), Value::String(real.clone()));
                map.insert("i".to_string(), Value::String(imag.clone()));
            }
        }
    }
}

/// Strip a trailing `j`/`J`, returning the magnitude text if present.
pub fn strip_imaginary_suffix(text: &str) -> Option<&str> {
    text.strip_suffix('j').or_else(|| text.strip_suffix('J'))
}

fn is_float_text(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
        return false;
    }
    lower.contains('.') || lower.contains('e')
}

/// Render a numeric token as a float string with an explicit decimal point
/// (`2` → `"2.0"`, `3.5` → `"3.5"`).
pub fn float_repr(text: &str) -> Result<String> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    let value: f64 = cleaned.parse().map_err(|e: std::num::ParseFloatError| {
        Error::new(
            forma_error::ErrorKind::EncodingError,
            format!("'{}' is not a valid numeric literal", text),
        )
        .with_operation("literal::float_repr")
        .set_source(e)
    })?;
    Ok(format!("{:?}", value))
}

/// Negate a float string produced by [`float_repr`].
pub fn float_negate(text: &str) -> String {
    if let Some(rest) = text.strip_prefix('-') {
        rest.to_string()
    } else {
        format!("-{}", text)
    }
}

/// Decode the inner text of a byte-string literal into raw bytes, interpreting
/// the common escape forms.
pub fn decode_bytes_literal(content: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(Error::new(
                forma_error::ErrorKind::EncodingError,
                "dangling escape at end of byte string",
            )
            .with_operation("literal::decode_bytes_literal"));
        };
        match esc {
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            '0' => out.push(0),
            '\\' => out.push(b'\\'),
            '\'' => out.push(b'\''),
            '"' => out.push(b'"'),
            'x' => {
                let hi = chars.next();
                let lo = chars.next();
                let (Some(hi), Some(lo)) = (hi, lo) else {
                    return Err(Error::new(
                        forma_error::ErrorKind::EncodingError,
                        "truncated \\x escape in byte string",
                    )
                    .with_operation("literal::decode_bytes_literal"));
                };
                let byte = u8::from_str_radix(&format!("{}{}", hi, lo), 16).map_err(|e| {
                    Error::new(
                        forma_error::ErrorKind::EncodingError,
                        format!("invalid \\x escape '\\x{}{}'", hi, lo),
                    )
                    .with_operation("literal::decode_bytes_literal")
                    .set_source(e)
                })?;
                out.push(byte);
            }
            other => {
                // unknown escapes pass through verbatim, as the tokenizer does
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    Ok(out)
}

/// Render raw bytes the way `str(bytes)` does: `b'...'` with printable ASCII
/// verbatim and everything else escaped.
pub fn bytes_repr(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('\'');
    out
}
