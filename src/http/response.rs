use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::http::headers::format_http_date;
use crate::http::mime::content_type_for;
use crate::http::request::{Request, HTTP_VERSION};

/// HTTP status codes the server can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use vhostd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the reason phrase sent on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Facts about the file being served that end up in the response headers.
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    pub len: u64,
    pub modified: SystemTime,
}

/// The server's answer to one request.
///
/// `file_path` is set exactly when the status is 200; the body is read from
/// that file when the response is written. `request` is only consulted to
/// mirror `Connection: close`.
#[derive(Debug)]
pub struct Response<'r> {
    pub version: &'static str,
    pub status: StatusCode,
    /// Headers set by the outcome handler, before the writer adds its own
    pub headers: HashMap<String, String>,
    pub file_path: Option<PathBuf>,
    pub request: Option<&'r Request>,
}

/// Builder for constructing responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::NotFound)
///     .header("Connection", "close")
///     .request(&req)
///     .build();
/// ```
pub struct ResponseBuilder<'r> {
    status: StatusCode,
    headers: HashMap<String, String>,
    file_path: Option<PathBuf>,
    request: Option<&'r Request>,
}

impl<'r> ResponseBuilder<'r> {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            file_path: None,
            request: None,
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the file whose contents become the body.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn request(mut self, request: Option<&'r Request>) -> Self {
        self.request = request;
        self
    }

    /// Builds the final Response. The file path is dropped for any status
    /// other than 200.
    pub fn build(self) -> Response<'r> {
        let file_path = match self.status {
            StatusCode::Ok => self.file_path,
            _ => None,
        };

        Response {
            version: HTTP_VERSION,
            status: self.status,
            headers: self.headers,
            file_path,
            request: self.request,
        }
    }
}

impl<'r> Response<'r> {
    /// 200 OK serving the already-resolved file at `path`.
    pub fn ok(path: impl Into<PathBuf>, request: &'r Request) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .file(path)
            .request(Some(request))
            .build()
    }

    /// 400 Bad Request. The framing of the connection can no longer be
    /// trusted, so it is always closed.
    pub fn bad_request(request: Option<&'r Request>) -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Connection", "close")
            .request(request)
            .build()
    }

    /// 404 Not Found. Used alike for unknown hosts, escaping paths and
    /// missing files.
    pub fn not_found(request: &'r Request) -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .request(Some(request))
            .build()
    }

    /// 500 Internal Server Error, sent when a file that passed validation
    /// cannot be read. Closes the connection.
    pub fn internal_error(request: Option<&'r Request>) -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .header("Connection", "close")
            .request(request)
            .build()
    }

    /// Whether the connection must be closed once this response is written.
    pub fn closes_connection(&self) -> bool {
        let forced = self
            .headers
            .get("Connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"));
        forced || self.request.is_some_and(Request::wants_close)
    }

    /// Renders every header line (with CRLF), including the ones the server
    /// always adds, sorted by the full rendered text.
    ///
    /// `file` must describe the file at `file_path` for a 200 response; it is
    /// ignored for other statuses.
    pub fn header_lines(&self, now: SystemTime, file: Option<&FileInfo>) -> Vec<String> {
        let mut headers = self.headers.clone();

        headers.insert("Date".to_string(), format_http_date(now));

        if self.request.is_some_and(Request::wants_close) {
            headers.insert("Connection".to_string(), "close".to_string());
        }

        if let (StatusCode::Ok, Some(path), Some(file)) = (self.status, &self.file_path, file) {
            headers.insert("Content-Type".to_string(), content_type_for(path).to_string());
            headers.insert("Content-Length".to_string(), file.len.to_string());
            headers.insert("Last-Modified".to_string(), format_http_date(file.modified));
        }

        let mut lines: Vec<String> = headers
            .iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect();
        lines.sort();
        lines
    }
}
