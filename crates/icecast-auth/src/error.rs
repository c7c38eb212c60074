//! Error types for the authentication adapter.

use std::io;

/// Errors raised while percent-decoding a header value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A `%` was not followed by two hexadecimal digits.
    #[error("malformed percent escape at byte {offset}")]
    MalformedEscape {
        /// Byte offset of the offending `%` within the value.
        offset: usize,
    },

    /// The decoded bytes were not valid UTF-8.
    #[error("decoded value is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors that can occur while reading an authentication request or writing
/// a response.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An input line exceeded the configured maximum length.
    #[error("line length {len} exceeds maximum allowed {max}")]
    LineTooLong {
        /// The length seen so far.
        len: usize,
        /// The maximum allowed length.
        max: usize,
    },

    /// The value of a percent-encoded header could not be decoded.
    #[error("failed to decode value of {key:?} header: {source}")]
    Decode {
        /// The normalized header key.
        key: String,
        /// The underlying decode failure.
        #[source]
        source: DecodeError,
    },

    /// The input ended before the header block was terminated.
    #[error("input ended before the header block was terminated")]
    UnexpectedEof,

    /// The connection notification has already been handed out.
    #[error("connection notification already taken")]
    ConnectionTaken,

    /// The parse loop stopped without publishing a result.
    #[error("request reader stopped unexpectedly")]
    ReaderStopped,
}
