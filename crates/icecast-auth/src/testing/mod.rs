//! Testing utilities for the authentication adapter.
//!
//! This module provides helpers for testing code that uses [`AuthHandler`],
//! including an in-memory output sink and header block construction.
//!
//! [`AuthHandler`]: crate::AuthHandler

mod output;

pub use output::CapturedOutput;

/// Construct a header block as the media server would send it.
///
/// Lines are joined with `\n` and the block is closed with an empty line.
///
/// # Example
///
/// ```
/// use icecast_auth::testing::header_block;
///
/// let bytes = header_block(&["Mountpoint: /live.mp3", "User: alice"]);
/// assert_eq!(bytes, b"Mountpoint: /live.mp3\nUser: alice\n\n");
/// ```
pub fn header_block(lines: &[&str]) -> Vec<u8> {
    let mut block = String::new();
    for line in lines {
        block.push_str(line);
        block.push('\n');
    }
    block.push('\n');
    block.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_block() {
        assert_eq!(header_block(&[]), b"\n");
        assert_eq!(header_block(&["a: 1", "b: 2"]), b"a: 1\nb: 2\n\n");
    }
}
