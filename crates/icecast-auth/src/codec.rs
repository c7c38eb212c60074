//! Auth callback codec implementation using tokio-util.
//!
//! This module provides [`AuthCodec`], which implements both the `Encoder` and
//! `Decoder` traits from tokio-util for the authentication sub-protocol.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::AuthError;
use crate::parse::{ParsedLine, parse_line};
use crate::response::Response;

/// Default maximum line length (64 KB).
const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Codec for the Icecast authentication callback.
///
/// Incoming data is a block of header lines ended by any line without a
/// colon:
/// ```text
/// Mountpoint: /live.mp3\n
/// User: alice\n
/// \n
/// ```
///
/// Lines may end in `\n`, `\r\n` or a lone `\r`. A final line with no line
/// ending is decoded once the input reaches EOF.
#[derive(Debug, Clone)]
pub struct AuthCodec {
    /// Maximum allowed line length in bytes, excluding the line ending.
    max_line_length: usize,
    /// Where to resume scanning for a line ending.
    next_index: usize,
}

impl AuthCodec {
    /// Create a new codec with default settings.
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a new codec with a custom maximum line length.
    ///
    /// Longer lines are rejected with [`AuthError::LineTooLong`].
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
        }
    }

    /// The longest line accepted, excluding the line ending.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Split the next complete line off the front of `src`.
    fn next_line(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<String>, AuthError> {
        let Some(pos) = src[self.next_index..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
        else {
            if src.len() > self.max_line_length {
                return Err(AuthError::LineTooLong {
                    len: src.len(),
                    max: self.max_line_length,
                });
            }
            self.next_index = src.len();
            return Ok(None);
        };

        let end = self.next_index + pos;
        let ending_len = match (src[end], src.get(end + 1)) {
            (b'\r', Some(b'\n')) => 2,
            // a trailing \r may still be followed by \n
            (b'\r', None) if !eof => {
                self.next_index = end;
                return Ok(None);
            }
            _ => 1,
        };

        if end > self.max_line_length {
            return Err(AuthError::LineTooLong {
                len: end,
                max: self.max_line_length,
            });
        }

        let line = src.split_to(end);
        src.advance(ending_len);
        self.next_index = 0;

        Ok(Some(into_string(&line)))
    }
}

impl Default for AuthCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for AuthCodec {
    type Item = ParsedLine;
    type Error = AuthError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.next_line(src, false)? {
            Some(line) => parse_line(&line).map(Some),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.next_line(src, true)? {
            return parse_line(&line).map(Some);
        }
        if src.is_empty() {
            return Ok(None);
        }

        // Unterminated final line
        let line = src.split_to(src.len());
        self.next_index = 0;
        let line = into_string(&line);
        parse_line(&line).map(Some)
    }
}

impl Encoder<Response> for AuthCodec {
    type Error = AuthError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst);
        Ok(())
    }
}

/// Invalid UTF-8 sequences become U+FFFD rather than failing the request.
fn into_string(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}
