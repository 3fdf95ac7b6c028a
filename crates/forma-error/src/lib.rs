//! # forma-error
//!
//! Unified error handling for forma.
//!
//! ## Design
//!
//! - **ErrorKind**: know what went wrong (e.g. TypeMismatch, SourceUnavailable)
//! - **ErrorStatus**: decide how to handle it (Permanent, Temporary, Persistent)
//! - **Context**: locate the cause with key/value pairs
//! - **Source**: wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use forma_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::SyntaxError, "unexpected token")
//!         .with_operation("parse::parse_module")
//!         .with_context("line", "3"))
//! }
//! ```
//!
//! All library functions return `Result<T, forma_error::Error>`; external
//! errors are wrapped with `set_source(err)`.

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using forma Error
pub type Result<T> = std::result::Result<T, Error>;
