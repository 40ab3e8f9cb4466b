//! Shared test doubles for the driver seam.
//!
//! `MockDriver` stands in for the PostgreSQL backend: query results are
//! scripted up front and every statement sent is recorded, so tests can
//! assert on transaction sequencing, memoization (via per-result call
//! counters) and corrective seeks without a live server.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::driver::{ConnectParams, Driver, DriverConnection, RawResult};
use crate::error::Error;

/// One scripted query result: column metadata, nullable cell texts, and an
/// affected-row count.
#[derive(Debug, Clone, Default)]
pub struct MockResult {
    pub columns: Vec<(String, String)>,
    pub rows: Vec<Vec<Option<String>>>,
    pub affected: u64,
}

impl MockResult {
    /// `(name, type tag)` pairs, tags exactly as a server would report them
    /// (array marker included).
    pub fn with_columns(columns: &[(&str, &str)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn row(mut self, cells: &[Option<&str>]) -> Self {
        self.rows
            .push(cells.iter().map(|c| c.map(str::to_string)).collect());
        self
    }

    pub fn affected(mut self, n: u64) -> Self {
        self.affected = n;
        self
    }
}

/// Driver-call counters for one raw result.
#[derive(Debug, Default)]
pub struct ResultStats {
    pub row_count_calls: Cell<u32>,
    pub affected_calls: Cell<u32>,
    pub seeks: RefCell<Vec<usize>>,
}

/// Shared script and recording for a whole mock session.
#[derive(Default)]
pub struct Script {
    responses: RefCell<VecDeque<Result<MockResult, String>>>,
    /// Every statement sent through the connection, queries and raw
    /// statements alike, in order.
    pub statements: RefCell<Vec<String>>,
    /// Stats handles for each raw result produced, in creation order.
    pub stats: RefCell<Vec<Rc<ResultStats>>>,
    /// Raw-statement failures: `(statement, message)`, each consumed once.
    raw_failures: RefCell<Vec<(String, String)>>,
    pub fail_connect: Cell<bool>,
}

impl Script {
    /// Script the next query's result.
    pub fn push(&self, result: MockResult) {
        self.responses.borrow_mut().push_back(Ok(result));
    }

    /// Script the next query to fail with `message`.
    pub fn push_error(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(message.to_string()));
    }

    /// Make the next occurrence of the raw statement `text` fail.
    pub fn fail_raw(&self, text: &str, message: &str) {
        self.raw_failures
            .borrow_mut()
            .push((text.to_string(), message.to_string()));
    }
}

pub struct MockDriver {
    script: Rc<Script>,
}

impl MockDriver {
    pub fn new() -> (Self, Rc<Script>) {
        let script = Rc::new(Script::default());
        (
            Self {
                script: Rc::clone(&script),
            },
            script,
        )
    }
}

impl Driver for MockDriver {
    fn connect(&self, _params: &ConnectParams) -> Result<Box<dyn DriverConnection>, Error> {
        if self.script.fail_connect.get() {
            return Err(Error::Connection("mock connect refused".to_string()));
        }
        Ok(Box::new(MockConnection {
            script: Rc::clone(&self.script),
        }))
    }
}

struct MockConnection {
    script: Rc<Script>,
}

impl DriverConnection for MockConnection {
    fn query(&mut self, text: &str) -> Result<Box<dyn RawResult>, Error> {
        self.script.statements.borrow_mut().push(text.to_string());
        let next = self.script.responses.borrow_mut().pop_front();
        let data = match next {
            Some(Ok(data)) => data,
            Some(Err(message)) => return Err(Error::Query(message)),
            None => MockResult::default(),
        };
        let stats = Rc::new(ResultStats::default());
        self.script.stats.borrow_mut().push(Rc::clone(&stats));
        Ok(Box::new(MockRawResult { data, stats }))
    }

    fn execute_raw(&mut self, text: &str) -> Result<(), Error> {
        self.script.statements.borrow_mut().push(text.to_string());
        let failure = {
            let mut failures = self.script.raw_failures.borrow_mut();
            failures
                .iter()
                .position(|(stmt, _)| stmt == text)
                .map(|idx| failures.remove(idx).1)
        };
        if let Some(message) = failure {
            return Err(Error::Query(message));
        }
        Ok(())
    }

    fn escape(&self, text: &str) -> String {
        text.replace('\'', "''")
    }
}

pub struct MockRawResult {
    data: MockResult,
    stats: Rc<ResultStats>,
}

impl MockRawResult {
    /// A raw result outside any session, with its stats handle. Used by the
    /// catalog and cursor tests.
    pub fn standalone(data: MockResult) -> (Self, Rc<ResultStats>) {
        let stats = Rc::new(ResultStats::default());
        (
            Self {
                data,
                stats: Rc::clone(&stats),
            },
            stats,
        )
    }
}

impl RawResult for MockRawResult {
    fn field_count(&self) -> usize {
        self.data.columns.len()
    }

    fn field_name(&self, col: usize) -> &str {
        &self.data.columns[col].0
    }

    fn field_type_tag(&self, col: usize) -> &str {
        &self.data.columns[col].1
    }

    fn is_null(&self, row: usize, col: usize) -> bool {
        self.data.rows[row][col].is_none()
    }

    fn get_text(&self, row: usize, col: usize) -> &str {
        self.data.rows[row][col].as_deref().unwrap_or("")
    }

    fn row_count(&self) -> usize {
        self.stats
            .row_count_calls
            .set(self.stats.row_count_calls.get() + 1);
        self.data.rows.len()
    }

    fn affected_rows(&self) -> u64 {
        self.stats
            .affected_calls
            .set(self.stats.affected_calls.get() + 1);
        self.data.affected
    }

    fn seek(&mut self, row: usize) -> Result<(), Error> {
        self.stats.seeks.borrow_mut().push(row);
        Ok(())
    }
}
