//! Error types for connection, query and decode failures.

use thiserror::Error;

/// Top-level error type returned by the session API.
#[derive(Error, Debug)]
pub enum Error {
    #[error("connection alias '{0}' already exists")]
    AliasConflict(String),

    #[error("connection alias '{0}' does not exist")]
    AliasNotFound(String),

    #[error("result alias '{0}' does not exist")]
    ResultNotFound(String),

    /// Transport or authentication failure reported by the driver.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The driver rejected a statement. The message is surfaced verbatim.
    #[error("query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("seek offset {offset} outside result of {rows} rows")]
    SeekOutOfRange { offset: usize, rows: usize },
}

/// Malformed wire text encountered while decoding a cell.
///
/// Decode failures are always reported; a malformed cell is never silently
/// skipped or replaced with a default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unterminated quote in {context}")]
    UnterminatedQuote { context: &'static str },

    #[error("missing '{expected}' separator in {context}")]
    MissingSeparator {
        expected: &'static str,
        context: &'static str,
    },

    #[error("unexpected {found} in {context}")]
    UnexpectedToken {
        found: String,
        context: &'static str,
    },

    /// A scalar coercion (integer, float, boolean, bytea, date/time) failed.
    #[error("invalid {kind} value '{text}'")]
    InvalidScalar { kind: &'static str, text: String },

    #[error("invalid json: {0}")]
    Json(String),
}
