//! Icecast authentication callback adapter using tokio.
//!
//! Icecast can delegate source authentication to an external process. It
//! writes the request as a block of `key: value` lines followed by an empty
//! line and reads back a short header-style answer. This crate handles both
//! sides of that exchange.
//!
//! # Architecture
//!
//! The crate is designed around the tokio-util codec pattern:
//!
//! - [`AuthCodec`] decodes input lines into [`ParsedLine`]s and encodes
//!   [`Response`]s
//! - [`RequestReader`] wraps an `AsyncRead` and collects lines into an
//!   [`AuthRequest`]
//! - [`ResponseWriter`] wraps an `AsyncWrite` to provide a `Sink` for responses
//! - [`AuthHandler`] runs the reader in the background and publishes the
//!   request exactly once
//!
//! # Usage
//!
//! ```ignore
//! use icecast_auth::AuthHandler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut handler = AuthHandler::stdio();
//!     let request = handler.connection().await?;
//!
//!     match (request.user(), request.pass()) {
//!         (Some("alice"), Some("secret")) => handler.accept().await?,
//!         (None, _) | (Some(""), _) => handler.require_credentials().await?,
//!         _ => handler.decline().await?,
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Scope
//!
//! Only the authentication handshake is handled here. Which streams back the
//! input and output, timeouts, and the decision itself belong to the caller.

mod codec;
mod error;
mod handler;
mod parse;
mod reader;
mod request;
mod response;
mod writer;

pub mod testing;

// Re-export main types
pub use codec::AuthCodec;
pub use error::{AuthError, DecodeError};
pub use handler::AuthHandler;
pub use parse::{HeaderLine, ParsedLine, decode_component, parse_line};
pub use reader::RequestReader;
pub use request::{AdapterState, AuthRequest, KNOWN_KEYS, RequestAccumulator};
pub use response::Response;
pub use writer::ResponseWriter;
