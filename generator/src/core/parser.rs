//! Extracts the JSON object from free-form model output

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ParseError;

/// Byte range of the first balanced `{ ... }` region in `raw`.
///
/// Braces inside string literals do not count, and a backslash escapes the
/// next character inside a string.
pub fn locate_object(raw: &str) -> Result<(usize, usize), ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok((start, end));
                }
            }
            _ => {}
        }
    }

    Err(ParseError::Unbalanced { start })
}

/// Slice the first balanced object out of `raw` and decode it strictly
pub fn parse(raw: &str) -> Result<Value, ParseError> {
    let (start, end) = locate_object(raw)?;
    serde_json::from_str(&raw[start..end]).map_err(|e| ParseError::InvalidJson { message: e.to_string() })
}

/// Deserialize a parsed object into a stage's typed output
pub fn into_shape<T: DeserializeOwned>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::Shape { message: e.to_string() })
}
