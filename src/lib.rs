//! vhostd - static file server with virtual hosts
//!
//! Core library for the HTTP/1.1 connection engine and its configuration.

pub mod config;
pub mod http;
pub mod server;
