//! Authentication response writer.
//!
//! This module provides [`ResponseWriter`], a typed wrapper around a framed
//! async writer for answering the media server.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Sink;
use pin_project_lite::pin_project;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

use crate::codec::AuthCodec;
use crate::error::AuthError;
use crate::response::Response;

pin_project! {
    /// An async sink for authentication responses.
    ///
    /// Every method writes one complete response and flushes it. Nothing
    /// stops a caller from answering more than once; each call simply
    /// appends another response to the output.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use icecast_auth::ResponseWriter;
    ///
    /// let mut writer = ResponseWriter::new(tokio::io::stdout());
    /// writer.accept_mount("/live-hq.mp3").await?;
    /// ```
    pub struct ResponseWriter<W> {
        #[pin]
        inner: FramedWrite<W, AuthCodec>,
    }
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a new response writer from an async write destination.
    pub fn new(writer: W) -> Self {
        Self {
            inner: FramedWrite::new(writer, AuthCodec::new()),
        }
    }

    /// Send a response to the media server.
    pub async fn send(&mut self, response: Response) -> Result<(), AuthError> {
        use futures::SinkExt;
        tracing::debug!(?response, "sending authentication response");
        SinkExt::send(&mut self.inner, response).await
    }

    /// Accept the client on the mount it asked for.
    pub async fn accept(&mut self) -> Result<(), AuthError> {
        self.send(Response::Accept { mount: None }).await
    }

    /// Accept the client but move it to `mount`.
    pub async fn accept_mount(&mut self, mount: impl Into<String>) -> Result<(), AuthError> {
        self.send(Response::Accept {
            mount: Some(mount.into()),
        })
        .await
    }

    /// Ask the client to authenticate (401).
    pub async fn require_credentials(&mut self) -> Result<(), AuthError> {
        self.send(Response::RequireCredentials).await
    }

    /// Redirect the client to `url`.
    pub async fn redirect(&mut self, url: impl Into<String>) -> Result<(), AuthError> {
        self.send(Response::Redirect { url: url.into() }).await
    }

    /// Refuse the client with `403 Forbidden`.
    pub async fn decline(&mut self) -> Result<(), AuthError> {
        self.send(Response::Decline { message: None }).await
    }

    /// Refuse the client with a 403 and a custom message.
    pub async fn decline_with(&mut self, message: impl Into<String>) -> Result<(), AuthError> {
        self.send(Response::Decline {
            message: Some(message.into()),
        })
        .await
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Consume the writer and return the underlying destination.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W> Sink<Response> for ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    type Error = AuthError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_ready(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: Response) -> Result<(), Self::Error> {
        self.project().inner.start_send(item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_close(cx)
    }
}
