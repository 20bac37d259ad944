use std::collections::HashMap;

use crate::http::headers::canonical_header_key;

/// The only protocol version the server speaks.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP request methods.
///
/// The server only retrieves static files, so GET is the single method it
/// accepts. Anything else is rejected by the parser as an invalid method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use vhostd::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Some(Method::GET));
    /// assert_eq!(Method::parse("get"), None);
    /// assert_eq!(Method::parse("POST"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Header names are stored in canonical form (`Content-Type`), so lookups
/// through [`Request::header`] are case-insensitive. A request produced by the
/// parser always carries a `Host` header.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The raw request-target (e.g. "/index.html"), possibly with `..` or a query
    pub target: String,
    /// HTTP version, always "HTTP/1.1" for parsed requests
    pub version: String,
    /// Request headers keyed by canonical name
    pub headers: HashMap<String, String>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    target: Option<String>,
    headers: HashMap<String, String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            target: None,
            headers: HashMap::new(),
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Adds a header, canonicalizing its name. A repeated name replaces the
    /// earlier value.
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(canonical_header_key(key), value.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: Method::GET,
            target: self.target.ok_or("target missing")?,
            version: HTTP_VERSION.to_string(),
            headers: self.headers,
        })
    }
}

impl Request {
    /// Retrieves a header value by name, in any letter case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_key(key))
            .map(|v| v.as_str())
    }

    /// The virtual host this request is addressed to.
    pub fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    /// Whether the client asked for the connection to be closed after the
    /// response (`Connection: close`).
    pub fn wants_close(&self) -> bool {
        self.header("Connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}
