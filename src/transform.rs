//! Type-directed decode dispatch.
//!
//! [`transform_for`] is the closed, immutable mapping from a normalized
//! server type tag (array marker already stripped) to a decoder identity.
//! Unknown tags get [`Transform::None`] and their text passes through
//! unchanged; callers wanting numeric coercion for an unmapped tag must add a
//! table entry, the table is never inferred from cell content.
//!
//! SQL null never reaches this module: the driver's per-cell null test is
//! checked upstream and short-circuits decoding entirely.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::catalog::FieldDescriptor;
use crate::codec::array::{self, ArrayElem};
use crate::codec::geometry;
use crate::codec::hstore;
use crate::error::DecodeError;
use crate::value::Cell;

/// Decoder identity for one server type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Pass the wire text through unchanged.
    None,
    Hstore,
    Json,
    Boolean,
    Integer,
    Float,
    Text,
    Binary,
    DateTime,
    Time,
    GeoBox,
    GeoCircle,
    GeoSegment,
    GeoPath,
    GeoPoint,
    GeoPolygon,
}

/// The type transform table. Tags not listed decode as [`Transform::None`]:
/// xml, the network types (cidr/inet/macaddr), uuid, the range types,
/// interval and the text-search types all keep their wire text.
pub fn transform_for(tag: &str) -> Transform {
    match tag {
        "hstore" => Transform::Hstore,
        "json" | "jsonb" => Transform::Json,
        "bit" | "bytea" | "varbit" => Transform::Binary,
        "bool" => Transform::Boolean,
        "date" | "timestamp" | "timestamptz" => Transform::DateTime,
        "float4" | "float8" | "money" | "numeric" => Transform::Float,
        "int2" | "int4" | "int8" => Transform::Integer,
        "bpchar" | "text" | "varchar" => Transform::Text,
        "time" | "timetz" => Transform::Time,
        "box" => Transform::GeoBox,
        "circle" => Transform::GeoCircle,
        "lseg" | "line" => Transform::GeoSegment,
        "path" => Transform::GeoPath,
        "point" => Transform::GeoPoint,
        "polygon" => Transform::GeoPolygon,
        _ => Transform::None,
    }
}

/// Decode one non-null cell according to its field descriptor. Array-tagged
/// columns go through the array grammar first, then element-wise dispatch.
pub fn decode_cell(text: &str, field: &FieldDescriptor) -> Result<Cell, DecodeError> {
    if field.is_array {
        let elems = array::decode(text)?;
        Ok(Cell::Array(decode_elements(elems, field.transform)?))
    } else {
        decode_scalar(text, field.transform)
    }
}

fn decode_elements(elems: Vec<ArrayElem>, transform: Transform) -> Result<Vec<Cell>, DecodeError> {
    elems
        .into_iter()
        .map(|elem| match elem {
            ArrayElem::Null => Ok(Cell::Null),
            ArrayElem::Text(text) => decode_scalar(&text, transform),
            ArrayElem::Sub(inner) => Ok(Cell::Array(decode_elements(inner, transform)?)),
        })
        .collect()
}

/// Decode one non-null scalar wire text.
pub fn decode_scalar(text: &str, transform: Transform) -> Result<Cell, DecodeError> {
    match transform {
        Transform::None | Transform::Text => Ok(Cell::Text(text.to_string())),
        Transform::Integer => text
            .parse::<i64>()
            .map(Cell::Int)
            .map_err(|_| invalid("integer", text)),
        Transform::Float => text
            .parse::<f64>()
            .map(Cell::Float)
            .map_err(|_| invalid("float", text)),
        Transform::Boolean => match text {
            "t" | "true" => Ok(Cell::Bool(true)),
            "f" | "false" => Ok(Cell::Bool(false)),
            _ => Err(invalid("boolean", text)),
        },
        Transform::Binary => decode_bytea(text),
        Transform::Json => serde_json::from_str(text)
            .map(Cell::Json)
            .map_err(|e| DecodeError::Json(e.to_string())),
        Transform::Hstore => {
            // A brace-wrapped literal is an array of hstores.
            if hstore::is_array_literal(text) {
                let maps = hstore::decode_array(text)?;
                Ok(Cell::Array(maps.into_iter().map(Cell::Map).collect()))
            } else {
                Ok(Cell::Map(hstore::decode(text)?))
            }
        }
        Transform::DateTime => decode_datetime(text),
        Transform::Time => decode_time(text),
        Transform::GeoBox => Ok(Cell::Geometry(geometry::Geometry::Box(
            geometry::parse_box(text)?,
        ))),
        Transform::GeoCircle => Ok(Cell::Geometry(geometry::Geometry::Circle(
            geometry::parse_circle(text)?,
        ))),
        Transform::GeoSegment => Ok(Cell::Geometry(geometry::Geometry::Segment(
            geometry::parse_segment(text)?,
        ))),
        Transform::GeoPath => Ok(Cell::Geometry(geometry::Geometry::Path(
            geometry::parse_path(text)?,
        ))),
        Transform::GeoPoint => Ok(Cell::Geometry(geometry::Geometry::Point(
            geometry::parse_point(text)?,
        ))),
        Transform::GeoPolygon => Ok(Cell::Geometry(geometry::Geometry::Polygon(
            geometry::parse_polygon(text)?,
        ))),
    }
}

/// Bytea arrives in hex format: `\x` followed by hex digits.
fn decode_bytea(text: &str) -> Result<Cell, DecodeError> {
    let digits = text
        .strip_prefix("\\x")
        .ok_or_else(|| invalid("bytea", text))?;
    hex::decode(digits)
        .map(Cell::Bytes)
        .map_err(|_| invalid("bytea", text))
}

/// `date`, `timestamp` and `timestamptz` wire forms. A trailing UTC offset
/// (`-05`, `+05:30`) selects the zone-aware variant.
fn decode_datetime(text: &str) -> Result<Cell, DecodeError> {
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(Cell::TimestampTz(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Cell::Timestamp(dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Cell::Timestamp(date.and_time(NaiveTime::MIN)));
    }
    Err(invalid("timestamp", text))
}

/// `time` and `timetz`. The offset of a `timetz` value is dropped; the
/// local-time digits are what callers get.
fn decode_time(text: &str) -> Result<Cell, DecodeError> {
    if let Ok(t) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
        return Ok(Cell::Time(t));
    }
    if let Some(idx) = text.rfind(['+', '-']) {
        if let Ok(t) = NaiveTime::parse_from_str(&text[..idx], "%H:%M:%S%.f") {
            return Ok(Cell::Time(t));
        }
    }
    Err(invalid("time", text))
}

fn invalid(kind: &'static str, text: &str) -> DecodeError {
    DecodeError::InvalidScalar {
        kind,
        text: text.to_string(),
    }
}
