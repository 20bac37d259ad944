use std::path::Path;
use std::time::SystemTime;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{FileInfo, Response, StatusCode};

/// A file loaded for use as a response body.
#[derive(Debug)]
pub struct FileBody {
    pub info: FileInfo,
    pub contents: Vec<u8>,
}

/// Reads the whole file at `path` together with its size and mtime.
pub async fn load_file(path: &Path) -> std::io::Result<FileBody> {
    let contents = tokio::fs::read(path).await?;
    let meta = tokio::fs::metadata(path).await?;

    Ok(FileBody {
        info: FileInfo {
            len: contents.len() as u64,
            modified: meta.modified()?,
        },
        contents,
    })
}

/// Serializes `resp` to wire bytes: status line, sorted headers, blank line,
/// then the file contents for a 200.
pub fn serialize_response(resp: &Response<'_>, body: Option<&FileBody>, now: SystemTime) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for line in resp.header_lines(now, body.map(|b| &b.info)) {
        buf.extend_from_slice(line.as_bytes());
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    if resp.status == StatusCode::Ok {
        if let Some(body) = body {
            buf.extend_from_slice(&body.contents);
        }
    }

    buf
}

/// A fully serialized response and the progress of writing it out.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    status: StatusCode,
    keep_alive: bool,
}

impl ResponseWriter {
    /// Serializes `response`, reading its file if it has one.
    ///
    /// A file that was found during resolution but cannot be read now turns
    /// the response into a 500 rather than a 200 with a broken body.
    pub async fn new(response: &Response<'_>) -> Self {
        let now = SystemTime::now();

        let Some(path) = response.file_path.as_deref() else {
            return Self::from_response(response, None, now);
        };

        match load_file(path).await {
            Ok(body) => Self::from_response(response, Some(&body), now),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read file for response");
                let fallback = Response::internal_error(response.request);
                Self::from_response(&fallback, None, now)
            }
        }
    }

    fn from_response(response: &Response<'_>, body: Option<&FileBody>, now: SystemTime) -> Self {
        Self {
            buffer: serialize_response(response, body, now),
            written: 0,
            status: response.status,
            keep_alive: !response.closes_connection(),
        }
    }

    /// Status actually being sent, which may differ from the one requested.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
