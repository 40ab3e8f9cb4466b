//! PostgreSQL backend implementation over the `postgres` crate.
//!
//! Statements run through the simple-query (text) protocol so every cell
//! arrives in its wire text form. Column type tags are not reported on that
//! path, so each statement is first prepared to capture column names and
//! `pg_type` names (arrays come back with their leading `_` marker intact,
//! e.g. `_int4`). The full result is buffered into the raw handle, so cells
//! are addressed by index and `seek` never touches the server.

use postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::debug;

use super::{ConnectParams, Driver, DriverConnection, RawResult};
use crate::error::Error;

/// Factory for [`PostgresConnection`]s.
#[derive(Debug, Default)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn connect(&self, params: &ConnectParams) -> Result<Box<dyn DriverConnection>, Error> {
        let conn_string = params.to_connection_string();
        let client = Client::connect(&conn_string, NoTls)
            .map_err(|e| Error::Connection(e.to_string()))?;
        debug!("connected to PostgreSQL");
        Ok(Box::new(PostgresConnection { client }))
    }
}

pub struct PostgresConnection {
    client: Client,
}

impl DriverConnection for PostgresConnection {
    fn query(&mut self, text: &str) -> Result<Box<dyn RawResult>, Error> {
        // Prepare first: the simple-query path reports column names but not
        // type tags, and the field catalog needs both.
        let statement = self
            .client
            .prepare(text)
            .map_err(|e| Error::Query(e.to_string()))?;
        let columns: Vec<ColumnMeta> = statement
            .columns()
            .iter()
            .map(|c| ColumnMeta {
                name: c.name().to_string(),
                type_tag: c.type_().name().to_string(),
            })
            .collect();

        let messages = self
            .client
            .simple_query(text)
            .map_err(|e| Error::Query(e.to_string()))?;

        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        let mut affected = 0;
        for message in messages {
            match message {
                SimpleQueryMessage::Row(row) => {
                    let cells = (0..row.len())
                        .map(|i| row.get(i).map(str::to_string))
                        .collect();
                    rows.push(cells);
                }
                SimpleQueryMessage::CommandComplete(n) => affected = n,
                _ => {}
            }
        }

        debug!(rows = rows.len(), affected, "query executed");
        Ok(Box::new(PostgresRawResult {
            columns,
            rows,
            affected,
        }))
    }

    fn execute_raw(&mut self, text: &str) -> Result<(), Error> {
        self.client
            .batch_execute(text)
            .map_err(|e| Error::Query(e.to_string()))
    }

    /// Standard-conforming string escaping: single quotes are doubled.
    /// Input is assumed text-safe; control characters pass through unchanged.
    fn escape(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2);
        for c in text.chars() {
            if c == '\'' {
                result.push_str("''");
            } else {
                result.push(c);
            }
        }
        result
    }
}

#[derive(Debug, Clone)]
struct ColumnMeta {
    name: String,
    type_tag: String,
}

/// Fully buffered result of one simple-query round trip.
struct PostgresRawResult {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Option<String>>>,
    affected: u64,
}

impl RawResult for PostgresRawResult {
    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn field_name(&self, col: usize) -> &str {
        &self.columns[col].name
    }

    fn field_type_tag(&self, col: usize) -> &str {
        &self.columns[col].type_tag
    }

    fn is_null(&self, row: usize, col: usize) -> bool {
        self.rows[row][col].is_none()
    }

    fn get_text(&self, row: usize, col: usize) -> &str {
        self.rows[row][col].as_deref().unwrap_or("")
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn affected_rows(&self) -> u64 {
        self.affected
    }

    // Cells are addressed by row index in the buffer, so there is no
    // driver-level pointer to move.
    fn seek(&mut self, _row: usize) -> Result<(), Error> {
        Ok(())
    }
}
