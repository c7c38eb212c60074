//! Classification of individual input lines.

use crate::error::{AuthError, DecodeError};

/// Header keys whose values arrive percent-encoded.
const ENCODED_KEYS: [&str; 2] = ["agent", "referer"];

/// A single `key: value` line after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    /// Lowercased, trimmed key.
    pub key: String,
    /// Trimmed value, percent-decoded for `agent` and `referer`.
    pub value: String,
}

/// The outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A header line.
    Header(HeaderLine),
    /// Any line without a colon. Ends the header block.
    Terminator,
}

impl ParsedLine {
    /// Whether this line ends the header block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, ParsedLine::Terminator)
    }
}

/// Parse a single line (without its line ending).
///
/// Only the first colon separates key from value, so values may contain
/// colons themselves. A line without any colon, blank or not, is a
/// [`ParsedLine::Terminator`].
///
/// # Errors
///
/// Returns [`AuthError::Decode`] if the key is `agent` or `referer` and the
/// value is not valid percent-encoded UTF-8.
pub fn parse_line(line: &str) -> Result<ParsedLine, AuthError> {
    let Some((key, value)) = line.split_once(':') else {
        return Ok(ParsedLine::Terminator);
    };

    let key = key.to_lowercase().trim().to_string();
    let value = value.trim();

    let value = if ENCODED_KEYS.contains(&key.as_str()) {
        decode_component(value).map_err(|source| AuthError::Decode {
            key: key.clone(),
            source,
        })?
    } else {
        value.to_string()
    };

    Ok(ParsedLine::Header(HeaderLine { key, value }))
}

/// Decode a percent-encoded URL component.
///
/// Every `%` must introduce two hexadecimal digits. `+` is left untouched.
pub fn decode_component(value: &str) -> Result<String, DecodeError> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while let Some(pos) = bytes[i..].iter().position(|&b| b == b'%') {
        let offset = i + pos;
        let escape = bytes.get(offset + 1..offset + 3);
        match escape {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                i = offset + 3;
            }
            _ => return Err(DecodeError::MalformedEscape { offset }),
        }
    }

    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}
