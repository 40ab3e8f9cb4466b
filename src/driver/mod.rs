//! Driver abstraction for the underlying database transport.
//!
//! The marshalling layer never speaks the wire protocol itself. Everything it
//! needs from a driver is captured by three traits: [`Driver`] opens
//! connections, [`DriverConnection`] runs statements, and [`RawResult`] exposes
//! field introspection and per-cell text access on a query result. The
//! `postgres`-backed implementation lives in [`postgres`]; tests substitute a
//! scripted double.

pub mod postgres;

use crate::error::Error;

/// Connection parameters: either a raw libpq-style connection string or
/// structured keywords rendered into one.
#[derive(Debug, Clone)]
pub enum ConnectParams {
    /// Passed to the driver verbatim, e.g. `"host=localhost user=app"`.
    Raw(String),
    Keywords(KeywordParams),
}

/// Structured connection keywords. Unset fields are omitted from the rendered
/// connection string.
#[derive(Debug, Clone, Default)]
pub struct KeywordParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub options: Option<String>,
}

impl ConnectParams {
    pub fn raw(s: impl Into<String>) -> Self {
        ConnectParams::Raw(s.into())
    }

    /// Render to the keyword/value connection-string form.
    pub fn to_connection_string(&self) -> String {
        match self {
            ConnectParams::Raw(s) => s.clone(),
            ConnectParams::Keywords(kw) => {
                let mut parts = Vec::new();
                if let Some(host) = &kw.host {
                    parts.push(format!("host='{host}'"));
                }
                if let Some(port) = kw.port {
                    parts.push(format!("port='{port}'"));
                }
                if let Some(dbname) = &kw.dbname {
                    parts.push(format!("dbname='{dbname}'"));
                }
                if let Some(user) = &kw.user {
                    parts.push(format!("user='{user}'"));
                }
                if let Some(password) = &kw.password {
                    parts.push(format!("password='{password}'"));
                }
                if let Some(options) = &kw.options {
                    parts.push(format!("options='{options}'"));
                }
                parts.join(" ")
            }
        }
    }
}

impl From<KeywordParams> for ConnectParams {
    fn from(kw: KeywordParams) -> Self {
        ConnectParams::Keywords(kw)
    }
}

/// Opens connections. Implemented by the real backend and by test doubles.
pub trait Driver {
    fn connect(&self, params: &ConnectParams) -> Result<Box<dyn DriverConnection>, Error>;
}

/// A live connection capable of running statements.
pub trait DriverConnection {
    /// Run a statement and return its raw result handle.
    fn query(&mut self, text: &str) -> Result<Box<dyn RawResult>, Error>;

    /// Run a statement whose result set is uninteresting (`BEGIN`, `COMMIT`,
    /// `ROLLBACK`).
    fn execute_raw(&mut self, text: &str) -> Result<(), Error>;

    /// Escape `text` for interpolation into a single-quoted SQL literal.
    fn escape(&self, text: &str) -> String;
}

/// A raw query result: column metadata plus per-cell text access.
///
/// Cell text carries the server's wire representation; SQL null is reported
/// through [`RawResult::is_null`], never through the text (an empty string is
/// a real value). The handle is released when the result is dropped.
pub trait RawResult {
    fn field_count(&self) -> usize;

    fn field_name(&self, col: usize) -> &str;

    /// The server type tag exactly as reported, array marker included
    /// (e.g. `_int4` for `int4[]`).
    fn field_type_tag(&self, col: usize) -> &str;

    fn is_null(&self, row: usize, col: usize) -> bool;

    /// Wire text of the cell. Empty for null cells; callers must consult
    /// [`RawResult::is_null`] first.
    fn get_text(&self, row: usize, col: usize) -> &str;

    fn row_count(&self) -> usize;

    fn affected_rows(&self) -> u64;

    /// Reposition the driver-level read pointer.
    fn seek(&mut self, row: usize) -> Result<(), Error>;
}
