//! HTTP protocol implementation.
//!
//! This module implements the per-connection HTTP/1.1 engine that serves
//! static files from virtual-host document roots.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`line`**: Reads CRLF-terminated lines, remembering partial input on timeout or EOF
//! - **`parser`**: Turns lines into a [`request::Request`], with a closed set of parse errors
//! - **`request`**: HTTP request representation
//! - **`path`**: Maps a request target onto a file inside a document root
//! - **`response`**: Response outcomes (200, 400, 404, 500) and header rendering
//! - **`writer`**: Serializes responses, reading the file body, and writes them out
//! - **`connection`**: The per-connection state machine
//! - **`headers`**: Header-name canonicalization and HTTP-date formatting
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────┐
//!        │ AwaitRequest │ ← Read one request (5s idle deadline)
//!        └──────┬───────┘
//!               │ Request parsed          (idle / peer closed → Closed,
//!               ▼                          malformed → 400 → Closed)
//!        ┌──────────────┐
//!        │   Respond    │ ← Resolve host and path, pick 200 / 400 / 404
//!        └──────┬───────┘
//!               ▼
//!        ┌──────────────┐
//!        │   Writing    │ ← Send response to client
//!        └──────┬───────┘
//!               ├─ Keep-Alive → AwaitRequest (same connection)
//!               └─ Connection: close / 400 → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vhostd::config::VirtualHosts;
//! use vhostd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut hosts = VirtualHosts::new();
//!     hosts.insert("website1", "/srv/website1")?;
//!     let hosts = Arc::new(hosts);
//!
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let hosts = Arc::clone(&hosts);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, hosts);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod line;
pub mod mime;
pub mod parser;
pub mod path;
pub mod request;
pub mod response;
pub mod writer;
