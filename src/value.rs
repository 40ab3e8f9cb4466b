//! Native value model for decoded query results.
//!
//! A fetched row is a name-ordered mapping from column name to [`Cell`], the
//! union of every shape a decoded PostgreSQL text value can take: scalars,
//! hstore maps, geometric records, JSON documents and arrays of any of these.
//! Cells are produced fresh on every fetch and never cached.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::codec::geometry::Geometry;

/// A single decoded cell.
///
/// `Null` is produced from the driver's per-cell null test, never by
/// inspecting the text: an empty string and SQL `NULL` are distinct values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Null,
    /// Untransformed text, character types and tags with no registered decoder.
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Decoded bytea contents.
    Bytes(Vec<u8>),
    /// `date` and `timestamp` (no zone on the wire).
    Timestamp(NaiveDateTime),
    /// `timestamptz` (trailing UTC offset on the wire).
    TimestampTz(DateTime<FixedOffset>),
    /// `time` and `timetz` (a trailing offset is accepted and dropped).
    Time(NaiveTime),
    Json(serde_json::Value),
    Map(Hstore),
    Geometry(Geometry),
    Array(Vec<Cell>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Extract as `&str` if the cell carries untransformed text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            Cell::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Hstore> {
        match self {
            Cell::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Cell]> {
        match self {
            Cell::Array(cells) => Some(cells),
            _ => None,
        }
    }

    /// Type name for error messages and introspection.
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Text(_) => "text",
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Bool(_) => "bool",
            Cell::Bytes(_) => "bytes",
            Cell::Timestamp(_) => "timestamp",
            Cell::TimestampTz(_) => "timestamptz",
            Cell::Time(_) => "time",
            Cell::Json(_) => "json",
            Cell::Map(_) => "map",
            Cell::Geometry(_) => "geometry",
            Cell::Array(_) => "array",
        }
    }
}

/// An order-preserving key/value mapping decoded from the hstore wire format.
///
/// Keys are text; a value is either text or SQL null. Insertion order is the
/// order the pairs appeared in the wire literal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Hstore(Vec<(String, Option<String>)>);

impl Hstore {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.push((key.into(), value));
    }

    /// Value for `key`, or `None` if the key is absent. A present key with a
    /// SQL null value yields `Some(None)`.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for Hstore {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<(String, Option<String>)>> for Hstore {
    fn from(pairs: Vec<(String, Option<String>)>) -> Self {
        Self(pairs)
    }
}

/// A decoded result row: column name → [`Cell`], in result column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row(Vec<(String, Cell)>);

impl Row {
    pub fn new(columns: Vec<(String, Cell)>) -> Self {
        Self(columns)
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.0.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<&str> for Row {
    type Output = Cell;

    fn index(&self, name: &str) -> &Cell {
        self.get(name)
            .unwrap_or_else(|| panic!("no column named '{name}' in row"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hstore_preserves_insertion_order() {
        let mut map = Hstore::new();
        map.insert("z", Some("1".to_string()));
        map.insert("a", None);
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_hstore_get_distinguishes_null_from_absent() {
        let mut map = Hstore::new();
        map.insert("present", None);
        assert_eq!(map.get("present"), Some(None));
        assert_eq!(map.get("absent"), None);
    }

    #[test]
    fn test_row_lookup_by_name() {
        let row = Row::new(vec![
            ("id".to_string(), Cell::Int(7)),
            ("name".to_string(), Cell::Text("x".to_string())),
        ]);
        assert_eq!(row.get("id"), Some(&Cell::Int(7)));
        assert_eq!(row["name"], Cell::Text("x".to_string()));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_cell_as_float_widens_int() {
        assert_eq!(Cell::Int(3).as_float(), Some(3.0));
        assert_eq!(Cell::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Cell::Text("3".into()).as_float(), None);
    }
}
