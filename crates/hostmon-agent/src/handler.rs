use crate::data_source::{DataSource, KeyProcessor};
use crate::error::ProtocolError;
use crate::protocol::ZbxdProtocol;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Services exactly one request/response cycle on one connection.
///
/// The caller owns the connection and closes it once [`handle`] returns.
///
/// [`handle`]: RequestHandler::handle
pub struct RequestHandler {
    protocol: ZbxdProtocol,
    processor: Arc<dyn KeyProcessor>,
}

impl RequestHandler {
    pub fn new(processor: Arc<dyn KeyProcessor>) -> Self {
        Self {
            protocol: ZbxdProtocol,
            processor,
        }
    }

    /// Receives a key, resolves it and sends back the framed value.
    ///
    /// Item functions read from the filesystem, so resolution runs on the
    /// blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProtocolError`]; nothing is retried.
    pub async fn handle<S>(self, conn: &mut S) -> Result<(), ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let key = self.protocol.receive_key(conn).await?;
        tracing::debug!(key = %key, "Received key");

        let processor = Arc::clone(&self.processor);
        let lookup = key.clone();
        let value = tokio::task::spawn_blocking(move || processor.process(&lookup))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(key = %key, error = %e, "Key processing task failed");
                DataSource::default_value()
            });

        tracing::debug!(key = %key, value = %value, "Sending value");
        self.protocol.send_response(conn, &value).await
    }
}
