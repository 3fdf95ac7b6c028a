//! Error kinds for forma operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Categorizes errors so callers can match on the kind and decide how to
/// handle specific cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// The requested feature or operation is not supported
    Unsupported,

    /// Invalid argument passed to a function
    InvalidArgument,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Failed to parse a source fragment
    ParseFailed,

    /// Invalid syntax in the source fragment
    SyntaxError,

    /// Encoding error (invalid UTF-8, bad escape sequence, etc.)
    EncodingError,

    // =========================================================================
    // Entity model errors
    // =========================================================================
    /// A slot assignment violated the descriptor's declared type
    TypeMismatch,

    /// A field name is not declared in the entity's schema
    UnknownField,

    /// A required slot was never assigned
    MissingField,

    // =========================================================================
    // Normalizer errors
    // =========================================================================
    /// Source text or span index could not be obtained for a value
    SourceUnavailable,

    /// A handler emitted a field colliding with the reserved kind-tag key.
    /// Indicates a defect in the handler table, never bad input.
    InternalConsistency,

    /// Serialization of a normalized document failed
    SerializationFailed,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::IoFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::TypeMismatch.to_string(), "TypeMismatch");
        assert_eq!(
            ErrorKind::SourceUnavailable.to_string(),
            "SourceUnavailable"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(ErrorKind::IoFailed.is_retryable());
        assert!(!ErrorKind::TypeMismatch.is_retryable());
        assert!(!ErrorKind::InternalConsistency.is_retryable());
    }
}
