//! Alias-addressed session registry.
//!
//! A [`Session`] owns every connection and, per connection, a table of named
//! in-flight results. It is an explicit object passed by the caller, not
//! ambient global state. Connections are keyed by a caller-chosen alias;
//! result aliases are case-normalized (lowercased) within their connection.
//!
//! Every connection runs inside an implicit transaction: `BEGIN` is issued on
//! open and re-issued after every successful `COMMIT`/`ROLLBACK`.
//!
//! No internal locking: a `Session` driven from multiple threads must be
//! serialized by the caller.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::cursor::NamedResult;
use crate::driver::{ConnectParams, Driver, DriverConnection};
use crate::error::Error;
use crate::value::Row;

pub struct Session {
    driver: Box<dyn Driver>,
    connections: HashMap<String, ConnectionEntry>,
}

struct ConnectionEntry {
    conn: Box<dyn DriverConnection>,
    results: HashMap<String, NamedResult>,
}

impl Session {
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            driver,
            connections: HashMap::new(),
        }
    }

    /// Session backed by the real PostgreSQL driver.
    pub fn postgres() -> Self {
        Self::new(Box::new(crate::driver::postgres::PostgresDriver))
    }

    /// With `Some(params)`: connect, open the implicit transaction and
    /// register the connection under `alias`; an already-bound alias is an
    /// [`Error::AliasConflict`], never a silent reuse. With `None`: assert an
    /// existing connection, failing with [`Error::AliasNotFound`].
    pub fn open(&mut self, alias: &str, params: Option<&ConnectParams>) -> Result<(), Error> {
        match params {
            None => {
                if self.connections.contains_key(alias) {
                    Ok(())
                } else {
                    Err(Error::AliasNotFound(alias.to_string()))
                }
            }
            Some(params) => {
                if self.connections.contains_key(alias) {
                    return Err(Error::AliasConflict(alias.to_string()));
                }
                let mut conn = self.driver.connect(params)?;
                conn.execute_raw("BEGIN")?;
                self.connections.insert(
                    alias.to_string(),
                    ConnectionEntry {
                        conn,
                        results: HashMap::new(),
                    },
                );
                info!(alias, "connection opened");
                Ok(())
            }
        }
    }

    /// Discard a connection and every named result it owns.
    pub fn close(&mut self, alias: &str) -> Result<(), Error> {
        self.connections
            .remove(alias)
            .map(|_| info!(alias, "connection closed"))
            .ok_or_else(|| Error::AliasNotFound(alias.to_string()))
    }

    /// Run a statement. With `Some(result_alias)` the raw result is stored
    /// under that alias, silently replacing any previous result registered
    /// there (call [`Session::free`] first for explicit cleanup). With
    /// `None` the result is discarded; use this for statements whose result
    /// set is uninteresting.
    pub fn execute(
        &mut self,
        alias: &str,
        result_alias: Option<&str>,
        query: &str,
    ) -> Result<(), Error> {
        let entry = self.entry_mut(alias)?;
        let raw = entry.conn.query(query)?;
        if let Some(result_alias) = result_alias.filter(|a| !a.is_empty()) {
            let key = normalize_alias(result_alias);
            debug!(alias, result_alias = %key, "result registered");
            entry.results.insert(key, NamedResult::new(raw, query));
        }
        Ok(())
    }

    /// Next row of a named result, or `None` once exhausted.
    pub fn fetch_one(&mut self, alias: &str, result_alias: &str) -> Result<Option<Row>, Error> {
        self.result_mut(alias, result_alias)?.fetch_one()
    }

    /// Every remaining row of a named result.
    pub fn fetch_all(&mut self, alias: &str, result_alias: &str) -> Result<Vec<Row>, Error> {
        self.result_mut(alias, result_alias)?.fetch_all()
    }

    pub fn row_count(&mut self, alias: &str, result_alias: &str) -> Result<usize, Error> {
        Ok(self.result_mut(alias, result_alias)?.row_count())
    }

    pub fn affected_rows(&mut self, alias: &str, result_alias: &str) -> Result<u64, Error> {
        Ok(self.result_mut(alias, result_alias)?.affected_rows())
    }

    pub fn seek(&mut self, alias: &str, result_alias: &str, offset: usize) -> Result<(), Error> {
        self.result_mut(alias, result_alias)?.seek(offset)
    }

    pub fn reset(&mut self, alias: &str, result_alias: &str) -> Result<(), Error> {
        self.result_mut(alias, result_alias)?.reset()
    }

    /// The statement that produced a named result, exactly as sent.
    pub fn last_query(&mut self, alias: &str, result_alias: &str) -> Result<String, Error> {
        Ok(self.result_mut(alias, result_alias)?.last_query().to_string())
    }

    /// Release a named result and its driver handle. Further operations
    /// against the alias fail with [`Error::ResultNotFound`].
    pub fn free(&mut self, alias: &str, result_alias: &str) -> Result<(), Error> {
        let entry = self.entry_mut(alias)?;
        let key = normalize_alias(result_alias);
        entry
            .results
            .remove(&key)
            .map(|_| debug!(alias, result_alias = %key, "result freed"))
            .ok_or_else(|| Error::ResultNotFound(result_alias.to_string()))
    }

    /// Commit the implicit transaction and open the next one. A failed
    /// `COMMIT` is surfaced as [`Error::Query`] and the transaction is left
    /// recoverable: no `BEGIN` is issued and the commit is not treated as
    /// having happened.
    pub fn commit(&mut self, alias: &str) -> Result<(), Error> {
        let entry = self.entry_mut(alias)?;
        entry.conn.execute_raw("COMMIT")?;
        entry.conn.execute_raw("BEGIN")?;
        debug!(alias, "transaction committed");
        Ok(())
    }

    /// Roll back the implicit transaction and open the next one.
    pub fn rollback(&mut self, alias: &str) -> Result<(), Error> {
        let entry = self.entry_mut(alias)?;
        entry.conn.execute_raw("ROLLBACK")?;
        entry.conn.execute_raw("BEGIN")?;
        debug!(alias, "transaction rolled back");
        Ok(())
    }

    /// Escape `text` via the driver's escape primitive.
    pub fn escape(&mut self, alias: &str, text: &str) -> Result<String, Error> {
        Ok(self.entry_mut(alias)?.conn.escape(text))
    }

    /// Server-side array decode: round-trip an array literal through
    /// `UNNEST`, letting the engine do the un-escaping, and collect one
    /// nullable element text per position. Braces and the `[]` type suffix
    /// are supplied if missing. The offline grammar in
    /// [`crate::codec::array`] is the connectionless alternative.
    pub fn array_decode(
        &mut self,
        alias: &str,
        literal: &str,
        elem_type: &str,
    ) -> Result<Vec<Option<String>>, Error> {
        let entry = self.entry_mut(alias)?;

        let mut wrapped = literal.to_string();
        if !wrapped.starts_with('{') {
            wrapped.insert(0, '{');
        }
        if !wrapped.ends_with('}') {
            wrapped.push('}');
        }
        let mut cast_type = elem_type.to_string();
        if !cast_type.ends_with("[]") {
            cast_type.push_str("[]");
        }

        let escaped = entry.conn.escape(&wrapped);
        let sql = format!("SELECT UNNEST('{escaped}'::{cast_type}) AS value");
        let raw = entry.conn.query(&sql)?;

        let mut elements = Vec::with_capacity(raw.row_count());
        for row in 0..raw.row_count() {
            if raw.is_null(row, 0) {
                elements.push(None);
            } else {
                elements.push(Some(raw.get_text(row, 0).to_string()));
            }
        }
        Ok(elements)
    }

    fn entry_mut(&mut self, alias: &str) -> Result<&mut ConnectionEntry, Error> {
        self.connections
            .get_mut(alias)
            .ok_or_else(|| Error::AliasNotFound(alias.to_string()))
    }

    fn result_mut(&mut self, alias: &str, result_alias: &str) -> Result<&mut NamedResult, Error> {
        let key = normalize_alias(result_alias);
        self.entry_mut(alias)?
            .results
            .get_mut(&key)
            .ok_or_else(|| Error::ResultNotFound(result_alias.to_string()))
    }
}

fn normalize_alias(alias: &str) -> String {
    alias.to_ascii_lowercase()
}
