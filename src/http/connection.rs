use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{self, Error};
use crate::http::parser::parse_http_request_with_limit;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::app::App;
use crate::server::registry::{ConnectionId, ConnectionRegistry};

/// Size of the single read issued per connection.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Per-connection limits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub read_buffer_size: usize,
    pub max_request_size: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            read_buffer_size: READ_BUFFER_SIZE,
            max_request_size: crate::http::parser::MAX_REQUEST_SIZE,
        }
    }
}

/// One accepted connection, from first read to close.
///
/// Exactly one request is read, answered and the stream closed. Only the
/// bytes of the first read are parsed; a body split across later TCP
/// segments is not reassembled.
pub struct Connection<S> {
    id: ConnectionId,
    stream: S,
    app: Arc<App>,
    registry: ConnectionRegistry,
    limits: ConnectionLimits,
    state: ConnectionState,
    closed: bool,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(
        id: ConnectionId,
        stream: S,
        app: Arc<App>,
        registry: ConnectionRegistry,
        limits: ConnectionLimits,
    ) -> Self {
        Self {
            id,
            stream,
            app,
            registry,
            limits,
            state: ConnectionState::Reading,
            closed: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Drives the connection to completion and closes it.
    ///
    /// Request-level failures are answered on the wire and not returned.
    /// The error returned, if any, is an I/O failure on the stream itself.
    pub async fn run(mut self) -> Result<(), Error> {
        let result = self.drive().await;
        self.close().await;
        result
    }

    async fn drive(&mut self) -> Result<(), Error> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(Some(req)) => ConnectionState::Processing(req),
                    Ok(None) => ConnectionState::Closed,
                    Err(err) => {
                        if matches!(err, Error::ConnectionFailed(_)) {
                            tracing::error!(connection = %self.id, error = %err, "Read failed");
                            return Err(err);
                        }
                        error::log_error(&err);
                        ConnectionState::Writing(ResponseWriter::from_bytes(
                            error::error_response_bytes(&err),
                        ))
                    }
                },

                ConnectionState::Processing(req) => {
                    let response = self.process(req).await;
                    match response {
                        Ok(mut response) => {
                            if response.mark_sent() {
                                ConnectionState::Writing(ResponseWriter::new(&response))
                            } else {
                                tracing::warn!(connection = %self.id, "Response already sent");
                                ConnectionState::Closed
                            }
                        }
                        Err(err) => {
                            error::log_error(&err);
                            ConnectionState::Writing(ResponseWriter::from_bytes(
                                error::error_response_bytes(&err),
                            ))
                        }
                    }
                }

                ConnectionState::Writing(mut writer) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .map_err(|e| Error::ConnectionFailed(e.to_string()))?;
                    tracing::trace!(connection = %self.id, bytes = writer.len(), "Response written");
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Issues the single read. `Ok(None)` means the peer sent nothing.
    pub async fn read_request(&mut self) -> Result<Option<Request>, Error> {
        let mut buffer = BytesMut::zeroed(self.limits.read_buffer_size);
        let n = self.stream.read(&mut buffer[..]).await?;

        if n == 0 {
            tracing::debug!(connection = %self.id, "Peer closed before sending a request");
            return Ok(None);
        }

        buffer.truncate(n);
        tracing::trace!(connection = %self.id, bytes = n, "Read request bytes");

        parse_http_request_with_limit(&buffer, self.limits.max_request_size).map(Some)
    }

    /// Runs the pipeline off the async worker. A panic inside a handler or
    /// middleware comes back as `Unexpected`.
    async fn process(&self, req: Request) -> Result<Response, Error> {
        let app = Arc::clone(&self.app);
        tokio::task::spawn_blocking(move || app.handle(req))
            .await
            .map_err(|e| Error::Unexpected(anyhow::anyhow!("request pipeline aborted: {e}")))
    }

    /// Shuts the stream down and unregisters the connection. Idempotent.
    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(connection = %self.id, error = %e, "Shutdown failed");
        }
        self.registry.unregister(self.id).await;
        tracing::debug!(connection = %self.id, "Connection closed");
    }
}
