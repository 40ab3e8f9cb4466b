//! Named result cursor state machine.
//!
//! A [`NamedResult`] owns a raw driver result and walks it forward:
//! `Fresh` (no catalog, position unset) → `Positioned(i)` (catalog built,
//! next unread row is `i`) → `Exhausted`. The position only moves forward
//! while active; once exhausted, only an explicit [`NamedResult::seek`] or
//! [`NamedResult::reset`] returns it to a definite index.
//!
//! Row and affected-row counts are computed on first access and memoized for
//! the life of the result; they never re-query the driver and survive seeks.
//!
//! Not safe for concurrent fetch/seek from multiple threads; callers
//! serialize access.

use tracing::trace;

use crate::catalog::{build_catalog, FieldDescriptor};
use crate::driver::RawResult;
use crate::error::Error;
use crate::transform::decode_cell;
use crate::value::{Cell, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Fresh,
    Positioned(usize),
    Exhausted,
}

pub struct NamedResult {
    raw: Box<dyn RawResult>,
    state: CursorState,
    catalog: Option<Vec<FieldDescriptor>>,
    row_count: Option<usize>,
    affected_rows: Option<u64>,
    last_query: String,
}

impl NamedResult {
    pub fn new(raw: Box<dyn RawResult>, query: impl Into<String>) -> Self {
        Self {
            raw,
            state: CursorState::Fresh,
            catalog: None,
            row_count: None,
            affected_rows: None,
            last_query: query.into(),
        }
    }

    /// The statement that produced this result, exactly as sent.
    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    /// Total rows in the result. Memoized on first access.
    pub fn row_count(&mut self) -> usize {
        match self.row_count {
            Some(n) => n,
            None => {
                let n = self.raw.row_count();
                self.row_count = Some(n);
                n
            }
        }
    }

    /// Rows affected by the statement. Memoized on first access.
    pub fn affected_rows(&mut self) -> u64 {
        match self.affected_rows {
            Some(n) => n,
            None => {
                let n = self.raw.affected_rows();
                self.affected_rows = Some(n);
                n
            }
        }
    }

    /// Decode and return the next unread row, or `None` once the result is
    /// exhausted. Exhaustion is not an error.
    pub fn fetch_one(&mut self) -> Result<Option<Row>, Error> {
        self.ensure_catalog()?;
        let total = self.row_count();

        let index = match self.state {
            CursorState::Exhausted => return Ok(None),
            CursorState::Positioned(i) => i,
            // ensure_catalog promotes Fresh to Positioned(0).
            CursorState::Fresh => 0,
        };
        if index >= total {
            trace!(index, total, "cursor exhausted");
            self.state = CursorState::Exhausted;
            return Ok(None);
        }

        let row = match &self.catalog {
            Some(catalog) => decode_row(self.raw.as_ref(), catalog, index)?,
            None => return Ok(None),
        };
        self.state = CursorState::Positioned(index + 1);
        Ok(Some(row))
    }

    /// Decode every remaining row.
    pub fn fetch_all(&mut self) -> Result<Vec<Row>, Error> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Jump to row `offset`. Out-of-range offsets are rejected, never
    /// clamped or wrapped. Catalog and memoized counts are untouched.
    pub fn seek(&mut self, offset: usize) -> Result<(), Error> {
        let total = self.row_count();
        if offset >= total {
            return Err(Error::SeekOutOfRange {
                offset,
                rows: total,
            });
        }
        self.raw.seek(offset)?;
        self.state = CursorState::Positioned(offset);
        Ok(())
    }

    /// Return to the first row.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.seek(0)
    }

    /// Build the field catalog if it has not been built yet. Introspection
    /// may advance the driver-level read position; `build_catalog` restores
    /// it as part of its contract.
    fn ensure_catalog(&mut self) -> Result<(), Error> {
        if self.catalog.is_some() {
            return Ok(());
        }
        let restore_row = match self.state {
            CursorState::Positioned(i) => i,
            _ => 0,
        };
        let catalog = build_catalog(self.raw.as_mut(), restore_row)?;
        trace!(fields = catalog.len(), "field catalog built");
        self.catalog = Some(catalog);
        if self.state == CursorState::Fresh {
            self.state = CursorState::Positioned(0);
        }
        Ok(())
    }
}

/// Decode one raw row through the catalog. Null cells short-circuit the
/// transform lookup entirely.
fn decode_row(
    raw: &dyn RawResult,
    catalog: &[FieldDescriptor],
    row: usize,
) -> Result<Row, Error> {
    let mut cells = Vec::with_capacity(catalog.len());
    for (col, field) in catalog.iter().enumerate() {
        let cell = if raw.is_null(row, col) {
            Cell::Null
        } else {
            decode_cell(raw.get_text(row, col), field)?
        };
        cells.push((field.name.clone(), cell));
    }
    Ok(Row::new(cells))
}
