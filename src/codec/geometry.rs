//! Geometric literal parsers.
//!
//! Each parser strips the format's fixed punctuation and splits on commas.
//! Coordinates stay numeric text: precision is the caller's concern, not the
//! parser's.
//!
//! | Shape   | Wire pattern                          |
//! |---------|---------------------------------------|
//! | point   | `(x,y)`                               |
//! | box     | `((x1,y1),(x2,y2))`                   |
//! | circle  | `<(x,y),r>`                           |
//! | lseg    | `[(x1,y1),(x2,y2)]`                   |
//! | path    | `[(x1,y1),...]` open, `((x1,y1),...)` closed |
//! | polygon | `((x1,y1),(x2,y2),...)`               |

use serde::Serialize;

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoBox {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Circle {
    pub x: String,
    pub y: String,
    pub radius: String,
}

/// `lseg` and `line` share this shape; a line is the infinite extension of
/// the segment through its two points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub kind: PathKind,
    pub points: Vec<Point>,
}

/// Union of the geometric shapes a cell can decode to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Geometry {
    Point(Point),
    Box(GeoBox),
    Circle(Circle),
    Segment(Segment),
    Path(Path),
    Polygon(Vec<Point>),
}

/// `(1,2)` → point.
pub fn parse_point(text: &str) -> Result<Point, DecodeError> {
    let fields = split_fields(text, &['(', ')'], 2, "point literal")?;
    Ok(point(&fields[0], &fields[1]))
}

/// `((1,2),(3,4))` → box corners.
pub fn parse_box(text: &str) -> Result<GeoBox, DecodeError> {
    let fields = split_fields(text, &['(', ')'], 4, "box literal")?;
    Ok(GeoBox {
        from: point(&fields[0], &fields[1]),
        to: point(&fields[2], &fields[3]),
    })
}

/// `<(1,2),3>` → center and radius.
pub fn parse_circle(text: &str) -> Result<Circle, DecodeError> {
    let fields = split_fields(text, &['<', '>', '(', ')'], 3, "circle literal")?;
    Ok(Circle {
        x: fields[0].clone(),
        y: fields[1].clone(),
        radius: fields[2].clone(),
    })
}

/// `[(1,2),(3,4)]` → segment endpoints.
pub fn parse_segment(text: &str) -> Result<Segment, DecodeError> {
    let fields = split_fields(text, &['[', ']', '(', ')'], 4, "segment literal")?;
    Ok(Segment {
        from: point(&fields[0], &fields[1]),
        to: point(&fields[2], &fields[3]),
    })
}

/// Open (`[…]`) or closed path. The leading character decides the kind
/// before any point-splitting happens.
pub fn parse_path(text: &str) -> Result<Path, DecodeError> {
    let trimmed = text.trim();
    let (kind, inner) = if trimmed.starts_with('[') {
        (
            PathKind::Open,
            trimmed.trim_start_matches('[').trim_end_matches(']'),
        )
    } else {
        (PathKind::Closed, trimmed)
    };
    Ok(Path {
        kind,
        points: parse_point_list(inner, "path literal")?,
    })
}

/// `((1,2),(3,4),…)` → vertex sequence.
pub fn parse_polygon(text: &str) -> Result<Vec<Point>, DecodeError> {
    parse_point_list(text, "polygon literal")
}

fn point(x: &str, y: &str) -> Point {
    Point {
        x: x.to_string(),
        y: y.to_string(),
    }
}

/// Split a list of `(x,y)` pairs on the `),(` boundaries, then strip the
/// remaining parentheses per pair.
fn parse_point_list(text: &str, context: &'static str) -> Result<Vec<Point>, DecodeError> {
    let mut points = Vec::new();
    for part in text.split("),(") {
        let fields = split_fields(part, &['(', ')'], 2, context)?;
        points.push(point(&fields[0], &fields[1]));
    }
    Ok(points)
}

/// Strip the format's punctuation, split on commas, and require an exact
/// field count with no empty fields.
fn split_fields(
    text: &str,
    strip: &[char],
    expected: usize,
    context: &'static str,
) -> Result<Vec<String>, DecodeError> {
    let cleaned: String = text.chars().filter(|c| !strip.contains(c)).collect();
    let fields: Vec<String> = cleaned.split(',').map(|s| s.trim().to_string()).collect();
    if fields.len() != expected || fields.iter().any(|f| f.is_empty()) {
        return Err(DecodeError::UnexpectedToken {
            found: format!("'{text}'"),
            context,
        });
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pt(x: &str, y: &str) -> Point {
        Point {
            x: x.to_string(),
            y: y.to_string(),
        }
    }

    #[rstest]
    fn test_parse_point() {
        assert_eq!(parse_point("(1,2)").unwrap(), pt("1", "2"));
    }

    #[rstest]
    fn test_parse_point_keeps_decimal_text() {
        assert_eq!(
            parse_point("(1.5,-2.25)").unwrap(),
            pt("1.5", "-2.25")
        );
    }

    #[rstest]
    #[case("(1)")]
    #[case("(1,2,3)")]
    #[case("")]
    fn test_parse_point_rejects_wrong_arity(#[case] input: &str) {
        assert!(matches!(
            parse_point(input),
            Err(DecodeError::UnexpectedToken { .. })
        ));
    }

    #[rstest]
    fn test_parse_box() {
        assert_eq!(
            parse_box("((1,2),(3,4))").unwrap(),
            GeoBox {
                from: pt("1", "2"),
                to: pt("3", "4"),
            }
        );
    }

    #[rstest]
    fn test_parse_circle() {
        assert_eq!(
            parse_circle("<(1,2),3>").unwrap(),
            Circle {
                x: "1".to_string(),
                y: "2".to_string(),
                radius: "3".to_string(),
            }
        );
    }

    #[rstest]
    fn test_parse_segment() {
        assert_eq!(
            parse_segment("[(1,2),(3,4)]").unwrap(),
            Segment {
                from: pt("1", "2"),
                to: pt("3", "4"),
            }
        );
    }

    #[rstest]
    fn test_parse_path_open() {
        assert_eq!(
            parse_path("[(1,2),(3,4)]").unwrap(),
            Path {
                kind: PathKind::Open,
                points: vec![pt("1", "2"), pt("3", "4")],
            }
        );
    }

    #[rstest]
    fn test_parse_path_closed() {
        assert_eq!(
            parse_path("((1,2),(3,4),(5,6))").unwrap(),
            Path {
                kind: PathKind::Closed,
                points: vec![pt("1", "2"), pt("3", "4"), pt("5", "6")],
            }
        );
    }

    #[rstest]
    fn test_parse_polygon() {
        assert_eq!(
            parse_polygon("((0,0),(0,1),(1,1))").unwrap(),
            vec![pt("0", "0"), pt("0", "1"), pt("1", "1")]
        );
    }

    #[rstest]
    fn test_parse_polygon_rejects_malformed_pair() {
        assert!(matches!(
            parse_polygon("((0,0),(1))"),
            Err(DecodeError::UnexpectedToken { .. })
        ));
    }
}
