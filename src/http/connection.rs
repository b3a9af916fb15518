use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::ServerSettings;
use crate::error::ServerError;
use crate::files::StaticFiles;
use crate::http::parser::{ParseError, parse_http_request_with_limit};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 1024;

/// Drives one client connection through a single request and response.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    settings: ServerSettings,
    files: StaticFiles,
}

#[derive(Debug)]
pub enum ConnectionState {
    AwaitingRequest,
    Parsed(Request),
    Dispatched(ResponseWriter),
    Responded,
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, settings: ServerSettings) -> Self {
        let files = StaticFiles::new(settings.root_folder.clone());
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::AwaitingRequest,
            settings,
            files,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Runs the connection to completion and closes the stream, whatever
    /// the outcome.
    ///
    /// A malformed request or an unsupported method still gets a response.
    /// Errors returned here are read/write failures and deadlines, after
    /// which nothing more can be sent.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Shutdown after response failed");
        }
        self.state = ConnectionState::Closed;

        result
    }

    async fn drive(&mut self) -> Result<(), ServerError> {
        loop {
            // Any early return leaves the state at Closed
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::AwaitingRequest => {
                    self.state = match self.read_request().await {
                        Ok(Some(req)) => ConnectionState::Parsed(req),
                        Ok(None) => ConnectionState::Closed,
                        Err(e @ ServerError::MalformedRequest(_)) => {
                            debug!(error = %e, "Rejecting malformed request");
                            ConnectionState::Dispatched(ResponseWriter::new(&Response::bad_request()))
                        }
                        Err(e) => return Err(e),
                    };
                }

                ConnectionState::Parsed(req) => {
                    let response = self.handle_request(&req).await;

                    info!(
                        method = %req.method,
                        host = %req.host,
                        path = %req.file_path,
                        status = response.status.as_u16(),
                        "Request handled"
                    );

                    self.state = ConnectionState::Dispatched(ResponseWriter::new(&response));
                }

                ConnectionState::Dispatched(mut writer) => {
                    timeout(
                        self.settings.write_timeout,
                        writer.write_to_stream(&mut self.stream),
                    )
                    .await
                    .map_err(|_| ServerError::Timeout("response write"))??;

                    self.state = ConnectionState::Responded;
                }

                // One response per connection
                ConnectionState::Responded => {
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Reads until a full header block is buffered.
    ///
    /// Returns `None` if the peer closed before sending anything. A peer
    /// that closes part-way through the header block has sent a malformed
    /// request. The read deadline covers the whole header block, however
    /// the peer spreads its bytes out.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ServerError> {
        timeout(self.settings.read_timeout, self.read_header_block())
            .await
            .map_err(|_| ServerError::Timeout("request read"))?
    }

    async fn read_header_block(&mut self) -> Result<Option<Request>, ServerError> {
        loop {
            match parse_http_request_with_limit(&self.buffer, self.settings.max_header_bytes) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {}

                Err(e) => return Err(e.into()),
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ParseError::Incomplete.into());
            }
        }
    }

    async fn handle_request(&self, req: &Request) -> Response {
        if req.keep_alive {
            debug!(host = %req.host, "Keep-alive requested, connection closes after the response");
        }

        match req.method {
            Method::GET => self.files.respond(req).await,
            _ => {
                let e = ServerError::UnsupportedMethod(req.method.to_string());
                debug!(error = %e, "Unsupported method");
                Response::not_implemented()
            }
        }
    }
}
