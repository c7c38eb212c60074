//! Authentication request reader.
//!
//! This module provides [`RequestReader`], a typed wrapper around a framed
//! async reader that produces a stream of parsed header lines and can drive
//! them into a complete [`AuthRequest`].

use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::AuthCodec;
use crate::error::AuthError;
use crate::parse::ParsedLine;
use crate::request::{AuthRequest, RequestAccumulator};

pin_project! {
    /// An async stream of parsed input lines.
    ///
    /// `RequestReader` wraps an [`AsyncRead`] source and decodes lines from
    /// the byte stream. It implements [`Stream`], and [`read_request`]
    /// collects lines up to the terminator.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use icecast_auth::RequestReader;
    ///
    /// let mut reader = RequestReader::new(tokio::io::stdin());
    /// let request = reader.read_request(chrono::Utc::now()).await?;
    /// println!("{:?}", request.mountpoint());
    /// ```
    ///
    /// [`read_request`]: RequestReader::read_request
    pub struct RequestReader<R> {
        #[pin]
        inner: FramedRead<R, AuthCodec>,
    }
}

impl<R> RequestReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a new reader from an async read source.
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, AuthCodec::new()),
        }
    }

    /// Create a new reader with a custom codec.
    ///
    /// This allows configuring options like maximum line length.
    pub fn with_codec(reader: R, codec: AuthCodec) -> Self {
        Self {
            inner: FramedRead::new(reader, codec),
        }
    }

    /// Read header lines until the first terminator and return the request.
    ///
    /// No line after the terminator is consumed from the decoded stream.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::UnexpectedEof`] if the input ends first, or
    /// with the first line error (I/O, framing or [`AuthError::Decode`]).
    pub async fn read_request(&mut self, date: DateTime<Utc>) -> Result<AuthRequest, AuthError> {
        let mut accumulator = RequestAccumulator::new(date);

        while let Some(line) = self.next().await {
            let line = line.inspect_err(|error| {
                tracing::warn!(%error, "failed to read authentication header");
            })?;

            match &line {
                ParsedLine::Header(header) => {
                    tracing::trace!(key = %header.key, "received header");
                }
                ParsedLine::Terminator => tracing::trace!("received terminator"),
            }

            if let Some(request) = accumulator.feed(line) {
                return Ok(request);
            }
        }

        Err(AuthError::UnexpectedEof)
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Consume the reader and return the underlying source.
    ///
    /// Bytes already buffered past the terminator are discarded.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R> Stream for RequestReader<R>
where
    R: AsyncRead + Unpin,
{
    type Item = Result<ParsedLine, AuthError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}
