//! Hstore (key/value) literal codec.
//!
//! Wire syntax: `"key"=>"value", "key2"=>NULL`. Keys are always quoted; a
//! value is either quoted text or the bare token `NULL`. Backslash escapes
//! `\` and `"` inside quoted keys and values. A brace-wrapped literal is an
//! array of hstores rather than a single one.
//!
//! Malformed input (unterminated quote, missing `=>`) is a decode error,
//! never a silent partial result. Encoders assume text-safe input.

use crate::codec::array::{self, ArrayElem};
use crate::error::DecodeError;
use crate::value::Hstore;

/// Decode a single hstore literal into an ordered map.
pub fn decode(text: &str) -> Result<Hstore, DecodeError> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let mut map = Hstore::new();

    skip_spaces(&chars, &mut pos);
    while pos < chars.len() {
        let key = read_quoted(&chars, &mut pos, "hstore key")?;

        skip_spaces(&chars, &mut pos);
        if chars.get(pos) == Some(&'=') && chars.get(pos + 1) == Some(&'>') {
            pos += 2;
        } else {
            return Err(DecodeError::MissingSeparator {
                expected: "=>",
                context: "hstore pair",
            });
        }
        skip_spaces(&chars, &mut pos);

        let value = match chars.get(pos) {
            Some('"') => Some(read_quoted(&chars, &mut pos, "hstore value")?),
            Some('N') if chars[pos..].starts_with(&['N', 'U', 'L', 'L']) => {
                pos += 4;
                None
            }
            Some(c) => {
                return Err(DecodeError::UnexpectedToken {
                    found: format!("'{c}'"),
                    context: "hstore value",
                });
            }
            None => {
                return Err(DecodeError::UnexpectedToken {
                    found: "end of input".to_string(),
                    context: "hstore value",
                });
            }
        };
        map.insert(key, value);

        skip_spaces(&chars, &mut pos);
        match chars.get(pos) {
            None => break,
            Some(',') => {
                pos += 1;
                skip_spaces(&chars, &mut pos);
            }
            Some(c) => {
                return Err(DecodeError::UnexpectedToken {
                    found: format!("'{c}'"),
                    context: "hstore pair",
                });
            }
        }
    }

    Ok(map)
}

/// Decode a brace-wrapped array of hstore literals.
///
/// A null array position is rejected: the caller decides what a null map
/// means, this codec does not.
pub fn decode_array(text: &str) -> Result<Vec<Hstore>, DecodeError> {
    array::decode(text)?
        .into_iter()
        .map(|elem| match elem {
            ArrayElem::Text(segment) => decode(&segment),
            ArrayElem::Null => Err(DecodeError::UnexpectedToken {
                found: "NULL element".to_string(),
                context: "hstore array",
            }),
            ArrayElem::Sub(_) => Err(DecodeError::UnexpectedToken {
                found: "nested array".to_string(),
                context: "hstore array",
            }),
        })
        .collect()
}

/// Whether a literal is the brace-wrapped array-of-hstores form.
pub fn is_array_literal(text: &str) -> bool {
    text.starts_with('{') && text.ends_with('}')
}

/// Encode an ordered map as an hstore literal.
pub fn encode(map: &Hstore) -> String {
    let pairs: Vec<String> = map
        .iter()
        .map(|(key, value)| match value {
            None => format!("\"{}\"=>NULL", escape_part(key)),
            Some(v) => format!("\"{}\"=>\"{}\"", escape_part(key), escape_part(v)),
        })
        .collect();
    pairs.join(",")
}

/// Encode a sequence of maps as a brace-wrapped array of hstore literals.
pub fn encode_array(maps: &[Hstore]) -> String {
    let encoded: Vec<Option<String>> = maps.iter().map(|m| Some(encode(m))).collect();
    array::encode(&encoded)
}

// Backslashes first, then quotes.
fn escape_part(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn skip_spaces(chars: &[char], pos: &mut usize) {
    while chars.get(*pos) == Some(&' ') {
        *pos += 1;
    }
}

/// Quoted key or value: `\` escapes the next character, an unescaped `"`
/// terminates.
fn read_quoted(
    chars: &[char],
    pos: &mut usize,
    context: &'static str,
) -> Result<String, DecodeError> {
    match chars.get(*pos) {
        Some('"') => *pos += 1,
        Some(c) => {
            return Err(DecodeError::UnexpectedToken {
                found: format!("'{c}'"),
                context,
            });
        }
        None => {
            return Err(DecodeError::UnexpectedToken {
                found: "end of input".to_string(),
                context,
            });
        }
    }

    let mut value = String::new();
    loop {
        match chars.get(*pos) {
            None => return Err(DecodeError::UnterminatedQuote { context }),
            Some('\\') => {
                *pos += 1;
                match chars.get(*pos) {
                    Some(c) => {
                        value.push(*c);
                        *pos += 1;
                    }
                    None => return Err(DecodeError::UnterminatedQuote { context }),
                }
            }
            Some('"') => {
                *pos += 1;
                return Ok(value);
            }
            Some(c) => {
                value.push(*c);
                *pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn map(pairs: &[(&str, Option<&str>)]) -> Hstore {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[rstest]
    fn test_decode_basic_pairs() {
        let decoded = decode(r#""a"=>"1","b"=>NULL"#).unwrap();
        assert_eq!(decoded, map(&[("a", Some("1")), ("b", None)]));
    }

    #[rstest]
    fn test_decode_tolerates_space_after_comma() {
        let decoded = decode(r#""a"=>"1", "b"=>"2""#).unwrap();
        assert_eq!(decoded, map(&[("a", Some("1")), ("b", Some("2"))]));
    }

    #[rstest]
    fn test_decode_escaped_quote_and_backslash() {
        let decoded = decode(r#""k\"ey"=>"va\\lue""#).unwrap();
        assert_eq!(decoded, map(&[(r#"k"ey"#, Some(r"va\lue"))]));
    }

    #[rstest]
    fn test_decode_quoted_null_is_text() {
        let decoded = decode(r#""a"=>"NULL""#).unwrap();
        assert_eq!(decoded, map(&[("a", Some("NULL"))]));
    }

    #[rstest]
    fn test_decode_empty_input_is_empty_map() {
        assert_eq!(decode("").unwrap(), Hstore::new());
    }

    #[rstest]
    fn test_decode_value_with_comma_and_arrow() {
        let decoded = decode(r#""a"=>"x,y=>z""#).unwrap();
        assert_eq!(decoded, map(&[("a", Some("x,y=>z"))]));
    }

    #[rstest]
    fn test_decode_unterminated_value_quote() {
        assert_eq!(
            decode(r#""a"=>"oops"#),
            Err(DecodeError::UnterminatedQuote {
                context: "hstore value"
            })
        );
    }

    #[rstest]
    fn test_decode_missing_arrow() {
        assert_eq!(
            decode(r#""a""1""#),
            Err(DecodeError::MissingSeparator {
                expected: "=>",
                context: "hstore pair"
            })
        );
    }

    #[rstest]
    fn test_decode_unquoted_key_rejected() {
        assert!(matches!(
            decode(r#"a=>"1""#),
            Err(DecodeError::UnexpectedToken { .. })
        ));
    }

    #[rstest]
    fn test_decode_bare_value_rejected() {
        assert!(matches!(
            decode(r#""a"=>1"#),
            Err(DecodeError::UnexpectedToken { .. })
        ));
    }

    #[rstest]
    fn test_encode_quotes_pairs_and_null() {
        let encoded = encode(&map(&[("a", Some("1")), ("b", None)]));
        assert_eq!(encoded, r#""a"=>"1","b"=>NULL"#);
    }

    #[rstest]
    fn test_encode_escapes_backslash_then_quote() {
        let encoded = encode(&map(&[(r#"k"1"#, Some(r"a\b"))]));
        assert_eq!(encoded, r#""k\"1"=>"a\\b""#);
    }

    #[rstest]
    #[case(map(&[("a", Some("1")), ("b", None)]))]
    #[case(map(&[("needs \"quoting\"", Some("back\\slash")), ("empty", Some(""))]))]
    #[case(Hstore::new())]
    fn test_roundtrip(#[case] original: Hstore) {
        assert_eq!(decode(&encode(&original)).unwrap(), original);
    }

    #[rstest]
    fn test_array_roundtrip() {
        let maps = vec![map(&[("a", Some("1"))]), map(&[("b", None)])];
        let encoded = encode_array(&maps);
        assert!(is_array_literal(&encoded));
        assert_eq!(decode_array(&encoded).unwrap(), maps);
    }

    #[rstest]
    fn test_decode_array_rejects_null_element() {
        assert!(matches!(
            decode_array(r#"{NULL}"#),
            Err(DecodeError::UnexpectedToken { .. })
        ));
    }
}
