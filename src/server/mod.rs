//! HTTP server adapter for microroute-rs.
//!
//! This module serves a frozen router and dispatcher over TCP: it parses the
//! request head, resolves and dispatches it, and maps failures to status codes.

mod config;
mod error;
mod http_server;

// Re-export public items
pub use config::ServerConfig;
pub use error::Error;
pub use http_server::HttpServer;
