//! pg_marshal - typed access to PostgreSQL text-format results
//!
//! Wraps a PostgreSQL connection and turns the server's text-format wire
//! values into typed Rust values: hstore and arrays into structured
//! collections, geometric types into coordinate structs, timestamps into
//! `chrono` values, bytea into bytes. Connections and their results are
//! addressed by alias through a [`Session`] registry, and each result is a
//! forward-walking cursor with explicit seek.

pub mod catalog;
pub mod codec;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod session;
pub mod transform;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use crate::cursor::NamedResult;
pub use crate::driver::{ConnectParams, KeywordParams};
pub use crate::error::{DecodeError, Error};
pub use crate::session::Session;
pub use crate::value::{Cell, Hstore, Row};
