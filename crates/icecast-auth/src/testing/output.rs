//! In-memory output sink for testing.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

/// An output stream that records everything written to it.
///
/// Clones share the same buffer, so a test can hand one clone to an
/// [`AuthHandler`](crate::AuthHandler) and inspect the other.
///
/// # Example
///
/// ```
/// use icecast_auth::ResponseWriter;
/// use icecast_auth::testing::CapturedOutput;
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let output = CapturedOutput::new();
/// let mut writer = ResponseWriter::new(output.clone());
/// writer.decline().await.unwrap();
///
/// assert_eq!(output.contents(), "icecast-auth-message: 403 Forbidden\n\n");
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    data: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as text.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Forget everything written so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // a poisoned buffer is still readable
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AsyncWrite for CapturedOutput {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
