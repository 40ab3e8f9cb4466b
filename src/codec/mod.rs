//! Text codecs for PostgreSQL wire literals.
//!
//! Pure functions, no connection required: array literals, hstore key/value
//! literals and the geometric formats. Decoders reject malformed input with a
//! [`crate::error::DecodeError`] rather than returning a partial result.

pub mod array;
pub mod geometry;
pub mod hstore;
