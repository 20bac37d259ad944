use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::time::Instant;
use tracing::debug;

use crate::config::VirtualHosts;
use crate::http::line::LineReader;
use crate::http::parser::{read_request, ParseError};
use crate::http::path::resolve_path;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// How long a connection may sit without delivering a complete request.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Connection<S> {
    reader: LineReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    hosts: Arc<VirtualHosts>,
    idle_timeout: Duration,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitRequest,
    Respond(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, hosts: Arc<VirtualHosts>) -> Self {
        let (read, write) = tokio::io::split(stream);
        Self {
            reader: LineReader::new(read),
            writer: write,
            hosts,
            idle_timeout: IDLE_TIMEOUT,
            state: ConnectionState::AwaitRequest,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Serves requests one after another until the peer leaves, goes idle,
    /// sends something malformed or asks to close.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::AwaitRequest => {
                    self.state = self.await_request().await;
                }

                ConnectionState::Respond(req) => {
                    let response = self.route(&req).await;
                    debug!(
                        host = req.host().unwrap_or_default(),
                        target = %req.target,
                        status = response.status.as_u16(),
                        "Handled request"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response).await);
                }

                ConnectionState::Writing(mut writer) => {
                    writer
                        .write_to_stream(&mut self.writer)
                        .await
                        .context("failed to write response")?;

                    if writer.keep_alive() {
                        self.state = ConnectionState::AwaitRequest;
                    }
                }

                ConnectionState::Closed => break,
            }
        }

        // The peer may already be gone.
        let _ = self.writer.shutdown().await;
        Ok(())
    }

    async fn await_request(&mut self) -> ConnectionState {
        self.reader.set_deadline(Instant::now() + self.idle_timeout);

        match read_request(&mut self.reader).await {
            Ok(req) => ConnectionState::Respond(req),

            Err(ParseError::StreamClosed { partial: false }) => {
                debug!("Connection closed by peer");
                ConnectionState::Closed
            }

            Err(ParseError::Timeout { partial: false }) => {
                debug!("Connection idle, closing");
                ConnectionState::Closed
            }

            Err(e) if e.is_malformed() => {
                debug!(error = %e, "Malformed request");
                ConnectionState::Writing(ResponseWriter::new(&Response::bad_request(None)).await)
            }

            Err(e) => {
                debug!(error = %e, "Request cut short, attempting 400");
                let mut writer = ResponseWriter::new(&Response::bad_request(None)).await;
                if let Err(we) = writer.write_to_stream(&mut self.writer).await {
                    debug!(error = %we, "Could not deliver 400");
                }
                ConnectionState::Closed
            }
        }
    }

    /// Picks the outcome for a well-formed request.
    async fn route<'r>(&self, req: &'r Request) -> Response<'r> {
        let Some(root) = req.host().and_then(|host| self.hosts.get(host)) else {
            debug!(host = req.host().unwrap_or_default(), "Unknown host");
            return Response::not_found(req);
        };

        if !req.target.starts_with('/') {
            return Response::bad_request(Some(req));
        }

        let Some(path) = resolve_path(root, &req.target) else {
            return Response::not_found(req);
        };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Response::ok(path, req),
            _ => Response::not_found(req),
        }
    }
}
