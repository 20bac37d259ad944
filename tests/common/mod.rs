//! Test-only HTTP client and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use vhostd::config::VirtualHosts;
use vhostd::server::listener::serve;

/// One response split off the raw bytes the server sent.
#[derive(Debug)]
pub struct ParsedResponse {
    pub minor_version: u8,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length").map(|v| v.parse().unwrap())
    }
}

/// Parses every response in `bytes`, in order. A response without a
/// `Content-Length` is taken to have no body.
pub fn parse_responses(mut bytes: &[u8]) -> Vec<ParsedResponse> {
    let mut out = Vec::new();

    while !bytes.is_empty() {
        let mut headers = [httparse::EMPTY_HEADER; 32];
        let mut resp = httparse::Response::new(&mut headers);
        let consumed = match resp.parse(bytes).expect("invalid response") {
            httparse::Status::Complete(n) => n,
            httparse::Status::Partial => panic!("truncated response head"),
        };

        let headers: Vec<(String, String)> = resp
            .headers
            .iter()
            .map(|h| (h.name.to_string(), String::from_utf8(h.value.to_vec()).unwrap()))
            .collect();
        let mut parsed = ParsedResponse {
            minor_version: resp.version.unwrap(),
            status: resp.code.unwrap(),
            reason: resp.reason.unwrap_or_default().to_string(),
            headers,
            body: Vec::new(),
        };

        bytes = &bytes[consumed..];
        let len = parsed.content_length().unwrap_or(0);
        assert!(bytes.len() >= len, "truncated response body");
        parsed.body = bytes[..len].to_vec();
        bytes = &bytes[len..];

        out.push(parsed);
    }

    out
}

/// Sends `request` verbatim and collects everything until the server closes.
pub async fn fetch(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(15), stream.read_to_end(&mut out))
        .await
        .expect("server did not close the connection")
        .unwrap();
    out
}

/// Starts a server on an ephemeral port.
pub async fn start_server(hosts: VirtualHosts, idle_timeout: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, Arc::new(hosts), idle_timeout));
    addr
}

/// A scratch tree with two document roots and a file outside both.
pub struct Fixture {
    pub dir: TempDir,
}

/// Size of `website1`'s index page.
pub const INDEX_LEN: usize = 377;

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root1 = dir.path().join("htdocs1");
        let root2 = dir.path().join("htdocs2");
        std::fs::create_dir_all(root1.join("img")).unwrap();
        std::fs::create_dir_all(root1.join("docs")).unwrap();
        std::fs::create_dir_all(&root2).unwrap();

        std::fs::write(root1.join("index.html"), index_page()).unwrap();
        std::fs::write(root1.join("style.css"), "body { color: #333; }\n").unwrap();
        std::fs::write(root1.join("notes.txt"), "plain text\n").unwrap();
        std::fs::write(root1.join("docs/index.html"), "<p>docs</p>\n").unwrap();
        std::fs::write(root1.join("img/logo.png"), (0u8..=255).collect::<Vec<u8>>()).unwrap();
        std::fs::write(root2.join("index.html"), "<h1>second site</h1>\n").unwrap();
        std::fs::write(dir.path().join("secret.txt"), "top secret\n").unwrap();

        Self { dir }
    }

    pub fn root1(&self) -> PathBuf {
        self.dir.path().join("htdocs1")
    }

    pub fn root2(&self) -> PathBuf {
        self.dir.path().join("htdocs2")
    }

    pub fn hosts(&self) -> VirtualHosts {
        let mut hosts = VirtualHosts::new();
        hosts.insert("website1", self.root1()).unwrap();
        hosts.insert("website2", self.root2()).unwrap();
        hosts
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> Vec<u8> {
        std::fs::read(self.dir.path().join(relative)).unwrap()
    }
}

/// Deterministic HTML page of exactly [`INDEX_LEN`] bytes.
pub fn index_page() -> Vec<u8> {
    let head = b"<!DOCTYPE html>\n<html>\n<head><title>website1</title></head>\n<body>\n<p>";
    let tail = b"</p>\n</body>\n</html>\n";
    let filler = INDEX_LEN - head.len() - tail.len();

    let mut page = head.to_vec();
    page.extend(std::iter::repeat_n(b'x', filler));
    page.extend_from_slice(tail);
    assert_eq!(page.len(), INDEX_LEN);
    page
}
