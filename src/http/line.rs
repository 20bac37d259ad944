use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{timeout_at, Instant};

const READ_CHUNK: usize = 1024;

/// Longest line accepted, terminator excluded.
pub const MAX_LINE_LEN: usize = 8192;

/// Why a line could not be completed.
///
/// Every variant carries whatever bytes were accumulated before the failure,
/// so callers can tell a quiet peer from one that stopped mid-line.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("read deadline expired after {} bytes", .partial.len())]
    Timeout { partial: Vec<u8> },

    #[error("stream closed after {} bytes", .partial.len())]
    Closed { partial: Vec<u8> },

    #[error("read failed after {} bytes: {source}", .partial.len())]
    Io {
        #[source]
        source: std::io::Error,
        partial: Vec<u8>,
    },

    #[error("line exceeds {} bytes", MAX_LINE_LEN)]
    TooLong { partial: Vec<u8> },
}

impl LineError {
    pub fn partial(&self) -> &[u8] {
        match self {
            LineError::Timeout { partial }
            | LineError::Closed { partial }
            | LineError::Io { partial, .. }
            | LineError::TooLong { partial } => partial,
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.partial().is_empty()
    }
}

/// Reads CRLF-terminated lines from an async byte stream.
///
/// A line may span any number of underlying reads. A bare `\n` not preceded
/// by `\r` is kept as part of the line. Lines are raw bytes; no text encoding
/// is assumed.
pub struct LineReader<R> {
    inner: R,
    buffer: BytesMut,
    deadline: Option<Instant>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(4096),
            deadline: None,
        }
    }

    /// Every read made after this call fails with [`LineError::Timeout`] once
    /// `deadline` has passed.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Returns the next line with its CRLF stripped.
    pub async fn read_line(&mut self) -> Result<Vec<u8>, LineError> {
        let mut scanned = 0;

        loop {
            if let Some(pos) = find_crlf(&self.buffer[scanned..]) {
                let end = scanned + pos;
                let mut line = self.buffer.split_to(end + 2);
                line.truncate(end);

                return Ok(line.to_vec());
            }

            // A trailing CR may be the start of the terminator.
            let pending = self.buffer.len() - usize::from(self.buffer.ends_with(b"\r"));
            if pending > MAX_LINE_LEN {
                return Err(LineError::TooLong { partial: self.take_partial() });
            }

            // A CR at the very end may still be followed by LF.
            scanned = self.buffer.len().saturating_sub(1);

            self.buffer.reserve(READ_CHUNK);
            let read = match self.deadline {
                Some(deadline) => {
                    let res = timeout_at(deadline, self.inner.read_buf(&mut self.buffer)).await;
                    match res {
                        Ok(res) => res,
                        Err(_) => return Err(LineError::Timeout { partial: self.take_partial() }),
                    }
                }
                None => self.inner.read_buf(&mut self.buffer).await,
            };

            match read {
                Ok(0) => return Err(LineError::Closed { partial: self.take_partial() }),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    return Err(LineError::Timeout { partial: self.take_partial() });
                }
                Err(source) => {
                    return Err(LineError::Io {
                        source,
                        partial: self.take_partial(),
                    });
                }
            }
        }
    }

    fn take_partial(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
