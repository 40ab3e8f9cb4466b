//! Array literal codec.
//!
//! Decodes the wire form (`{1,2,NULL,4}`, `{"a,b","c\"d"}`, `{{1,2},{3,4}}`)
//! without a server round trip: brace delimiters, comma separation, backslash
//! and doubled-quote escaping inside quoted elements, the bare `NULL` token
//! (distinct from the quoted string `"NULL"`) and nested sub-arrays.
//!
//! The encode direction quotes every non-null element, escaping `\` and `"`,
//! and emits nulls as the bare token `NULL`. Input is assumed text-safe;
//! control characters are not rejected.

use crate::error::DecodeError;

const CONTEXT: &str = "array literal";

/// One parsed element of an array literal. Element text is still in wire
/// form; the type-directed decoder turns it into a native value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElem {
    Null,
    Text(String),
    /// A nested sub-array (one dimension of a multi-dimensional array).
    Sub(Vec<ArrayElem>),
}

/// Decode a full array literal into its elements.
pub fn decode(text: &str) -> Result<Vec<ArrayElem>, DecodeError> {
    let chars: Vec<char> = text.trim().chars().collect();
    let mut pos = 0;
    let elems = parse_list(&chars, &mut pos)?;
    if pos != chars.len() {
        return Err(DecodeError::UnexpectedToken {
            found: format!("trailing '{}'", chars[pos]),
            context: CONTEXT,
        });
    }
    Ok(elems)
}

/// Encode a sequence of nullable element texts as an array literal.
pub fn encode<S: AsRef<str>>(elems: &[Option<S>]) -> String {
    let parts: Vec<String> = elems
        .iter()
        .map(|elem| match elem {
            None => "NULL".to_string(),
            Some(value) => {
                // Backslashes first, then quotes.
                let escaped = value
                    .as_ref()
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
        })
        .collect();
    format!("{{{}}}", parts.join(","))
}

fn parse_list(chars: &[char], pos: &mut usize) -> Result<Vec<ArrayElem>, DecodeError> {
    if chars.get(*pos) != Some(&'{') {
        return Err(DecodeError::MissingSeparator {
            expected: "{",
            context: CONTEXT,
        });
    }
    *pos += 1;

    let mut elems = Vec::new();
    if chars.get(*pos) == Some(&'}') {
        *pos += 1;
        return Ok(elems);
    }

    loop {
        match chars.get(*pos) {
            None => {
                return Err(DecodeError::MissingSeparator {
                    expected: "}",
                    context: CONTEXT,
                });
            }
            Some('{') => elems.push(ArrayElem::Sub(parse_list(chars, pos)?)),
            Some('"') => elems.push(ArrayElem::Text(parse_quoted(chars, pos)?)),
            Some(_) => elems.push(parse_bare(chars, pos)?),
        }

        match chars.get(*pos) {
            Some(',') => *pos += 1,
            Some('}') => {
                *pos += 1;
                return Ok(elems);
            }
            None => {
                return Err(DecodeError::MissingSeparator {
                    expected: "}",
                    context: CONTEXT,
                });
            }
            Some(c) => {
                return Err(DecodeError::UnexpectedToken {
                    found: format!("'{c}'"),
                    context: CONTEXT,
                });
            }
        }
    }
}

/// Quoted element. `\x` escapes the next character; `""` inside quotes is a
/// literal quote.
fn parse_quoted(chars: &[char], pos: &mut usize) -> Result<String, DecodeError> {
    *pos += 1; // opening quote
    let mut value = String::new();
    loop {
        match chars.get(*pos) {
            None => {
                return Err(DecodeError::UnterminatedQuote { context: CONTEXT });
            }
            Some('\\') => {
                *pos += 1;
                match chars.get(*pos) {
                    Some(c) => {
                        value.push(*c);
                        *pos += 1;
                    }
                    None => {
                        return Err(DecodeError::UnterminatedQuote { context: CONTEXT });
                    }
                }
            }
            Some('"') => {
                if chars.get(*pos + 1) == Some(&'"') {
                    value.push('"');
                    *pos += 2;
                } else {
                    *pos += 1;
                    return Ok(value);
                }
            }
            Some(c) => {
                value.push(*c);
                *pos += 1;
            }
        }
    }
}

/// Unquoted element, read up to the next separator. The bare token `NULL`
/// (and only that exact token) is the null sentinel.
fn parse_bare(chars: &[char], pos: &mut usize) -> Result<ArrayElem, DecodeError> {
    let mut value = String::new();
    while let Some(c) = chars.get(*pos) {
        if *c == ',' || *c == '}' {
            break;
        }
        value.push(*c);
        *pos += 1;
    }
    if value.is_empty() {
        return Err(DecodeError::UnexpectedToken {
            found: "empty element".to_string(),
            context: CONTEXT,
        });
    }
    if value == "NULL" {
        Ok(ArrayElem::Null)
    } else {
        Ok(ArrayElem::Text(value))
    }
}
