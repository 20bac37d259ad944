use std::collections::HashMap;

use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::headers::{canonical_header_key, is_valid_header_key};
use crate::http::line::{LineError, LineReader};
use crate::http::request::{Method, Request, HTTP_VERSION};

/// Everything that can go wrong while reading one request.
///
/// The first five variants are malformed input and always earn a 400. The
/// last three come from the transport and record whether any part of the
/// request had already arrived.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed start line {0:?}")]
    MalformedStartLine(String),

    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    #[error("invalid proto {0:?}")]
    InvalidProtocol(String),

    #[error("malformed header line {0:?}")]
    MalformedHeader(String),

    #[error("missing Host header")]
    MissingHost,

    #[error("timed out waiting for request (partial: {partial})")]
    Timeout { partial: bool },

    #[error("stream closed (partial: {partial})")]
    StreamClosed { partial: bool },

    #[error("read failed: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        partial: bool,
    },
}

impl ParseError {
    /// Whether any bytes of the request had been read when parsing stopped.
    pub fn is_partial(&self) -> bool {
        match self {
            ParseError::Timeout { partial }
            | ParseError::StreamClosed { partial }
            | ParseError::Io { partial, .. } => *partial,
            _ => true,
        }
    }

    /// Whether the client sent something that is not a valid request, as
    /// opposed to the transport failing underneath us.
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            ParseError::Timeout { .. } | ParseError::StreamClosed { .. } | ParseError::Io { .. }
        )
    }

    /// `started` is true once at least one full line of this request has been
    /// consumed. An overlong line is malformed input, `header` selecting
    /// which kind.
    fn from_line(err: LineError, started: bool, header: bool) -> Self {
        let partial = started || err.is_partial();
        match err {
            LineError::Timeout { .. } => ParseError::Timeout { partial },
            LineError::Closed { .. } => ParseError::StreamClosed { partial },
            LineError::Io { source, .. } => ParseError::Io { source, partial },
            LineError::TooLong { partial } => {
                let line = lossy(&partial[..partial.len().min(64)]);
                if header {
                    ParseError::MalformedHeader(line)
                } else {
                    ParseError::MalformedStartLine(line)
                }
            }
        }
    }
}

/// Reads one request (start line plus headers) from `reader`.
///
/// The request is always treated as bodiless; `Content-Length` is not
/// consulted.
pub async fn read_request<R>(reader: &mut LineReader<R>) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let line = reader
        .read_line()
        .await
        .map_err(|e| ParseError::from_line(e, false, false))?;

    let (method, target, version) = parse_start_line(&line)?;

    let mut headers = HashMap::new();
    loop {
        let line = reader
            .read_line()
            .await
            .map_err(|e| ParseError::from_line(e, true, true))?;

        if line.is_empty() {
            break;
        }

        let (key, value) = parse_header_line(&line)?;
        headers.insert(key, value);
    }

    if !headers.contains_key("Host") {
        return Err(ParseError::MissingHost);
    }

    Ok(Request {
        method,
        target,
        version,
        headers,
    })
}

/// Splits `METHOD TARGET VERSION` on single spaces and validates the method
/// and version.
///
/// Method and version are compared byte for byte. The target is taken as
/// sent; bytes that are not UTF-8 are replaced, so such a target simply names
/// a file that does not exist.
pub fn parse_start_line(line: &[u8]) -> Result<(Method, String, String), ParseError> {
    let fields: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
    let [method, target, version] = fields[..] else {
        return Err(ParseError::MalformedStartLine(lossy(line)));
    };

    let method = std::str::from_utf8(method)
        .ok()
        .and_then(Method::parse)
        .ok_or_else(|| ParseError::InvalidMethod(lossy(method)))?;

    if version != HTTP_VERSION.as_bytes() {
        return Err(ParseError::InvalidProtocol(lossy(version)));
    }

    Ok((method, lossy(target), HTTP_VERSION.to_string()))
}

/// Parses `Name: value` into a canonical name and a value with leading
/// whitespace removed.
///
/// The name must be ASCII letters, digits and hyphens. The value is not
/// otherwise inspected; bytes that are not UTF-8 are replaced.
pub fn parse_header_line(line: &[u8]) -> Result<(String, String), ParseError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or_else(|| ParseError::MalformedHeader(lossy(line)))?;
    let (key, value) = (&line[..colon], &line[colon + 1..]);

    let key = std::str::from_utf8(key)
        .ok()
        .filter(|key| is_valid_header_key(key))
        .ok_or_else(|| ParseError::MalformedHeader(lossy(line)))?;

    let value = lossy(value);
    Ok((canonical_header_key(key), value.trim_start().to_string()))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
