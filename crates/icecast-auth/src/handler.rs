//! The authentication adapter.
//!
//! [`AuthHandler`] ties a [`RequestReader`] running in the background to a
//! [`ResponseWriter`] owned by the caller.

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite, Stdout};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::codec::AuthCodec;
use crate::error::AuthError;
use crate::reader::RequestReader;
use crate::request::AuthRequest;
use crate::writer::ResponseWriter;

type Connection = oneshot::Receiver<Result<AuthRequest, AuthError>>;

/// Handles one Icecast authentication callback.
///
/// Construction immediately starts reading header lines from the input on
/// the tokio runtime. The finished request is published once through
/// [`connection`](AuthHandler::connection); the response methods can be
/// used at any time and write straight to the output.
///
/// Must be created from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// let mut handler = AuthHandler::stdio();
/// let request = handler.connection().await?;
/// if request.user() == Some("admin") {
///     handler.accept().await?;
/// } else {
///     handler.decline().await?;
/// }
/// ```
pub struct AuthHandler<W> {
    date: DateTime<Utc>,
    connection: Option<Connection>,
    writer: ResponseWriter<W>,
    reader_task: JoinHandle<()>,
}

impl AuthHandler<Stdout> {
    /// Create a handler over the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<W> AuthHandler<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a handler and start reading from `input`.
    pub fn new<R>(input: R, output: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::with_codec(input, output, AuthCodec::new())
    }

    /// Create a handler that frames its input with a custom codec.
    pub fn with_codec<R>(input: R, output: W, codec: AuthCodec) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let date = Utc::now();
        let (tx, rx) = oneshot::channel();
        let reader = RequestReader::with_codec(input, codec);
        let reader_task = tokio::spawn(read_and_publish(reader, date, tx));
        tracing::debug!(%date, "started authentication handler");

        Self {
            date,
            connection: Some(rx),
            writer: ResponseWriter::new(output),
            reader_task,
        }
    }

    /// When the handler was created. This is also the request's date.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Wait for the header block to be complete.
    ///
    /// The request is handed out once; later calls fail with
    /// [`AuthError::ConnectionTaken`]. Reading errors, including
    /// [`AuthError::Decode`] and [`AuthError::UnexpectedEof`], are reported
    /// here instead of a request.
    pub async fn connection(&mut self) -> Result<AuthRequest, AuthError> {
        let connection = self.connection.take().ok_or(AuthError::ConnectionTaken)?;
        connection.await.map_err(|_| AuthError::ReaderStopped)?
    }

    /// Accept the client on the mount it asked for.
    pub async fn accept(&mut self) -> Result<(), AuthError> {
        self.writer.accept().await
    }

    /// Accept the client but move it to `mount`.
    pub async fn accept_mount(&mut self, mount: impl Into<String>) -> Result<(), AuthError> {
        self.writer.accept_mount(mount).await
    }

    /// Ask the client to authenticate (401).
    pub async fn require_credentials(&mut self) -> Result<(), AuthError> {
        self.writer.require_credentials().await
    }

    /// Redirect the client to `url`.
    pub async fn redirect(&mut self, url: impl Into<String>) -> Result<(), AuthError> {
        self.writer.redirect(url).await
    }

    /// Refuse the client with `403 Forbidden`.
    pub async fn decline(&mut self) -> Result<(), AuthError> {
        self.writer.decline().await
    }

    /// Refuse the client with a 403 and a custom message.
    pub async fn decline_with(&mut self, message: impl Into<String>) -> Result<(), AuthError> {
        self.writer.decline_with(message).await
    }

    /// The writer used for responses.
    pub fn writer(&mut self) -> &mut ResponseWriter<W> {
        &mut self.writer
    }
}

impl<W> Drop for AuthHandler<W> {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn read_and_publish<R>(
    mut reader: RequestReader<R>,
    date: DateTime<Utc>,
    tx: oneshot::Sender<Result<AuthRequest, AuthError>>,
) where
    R: AsyncRead + Unpin,
{
    let result = reader.read_request(date).await;
    drop(reader);

    // publish on a later scheduler turn, never from inside the read
    tokio::task::yield_now().await;

    match &result {
        Ok(request) => {
            tracing::debug!(mountpoint = ?request.mountpoint(), "authentication request ready");
        }
        Err(error) => tracing::warn!(%error, "authentication request failed"),
    }

    if tx.send(result).is_err() {
        tracing::debug!("handler dropped before the request was ready");
    }
}
