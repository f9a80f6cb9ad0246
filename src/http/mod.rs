//! HTTP message types.
//!
//! The router and dispatcher only read request attributes and construct or
//! forward responses; the request-head parser here exists for the server
//! adapter.

mod error;
mod method;
mod request;
mod response;

// Re-export public items
pub use error::Error;
pub use method::Method;
pub use request::{HttpRequest, parse_request};
pub use response::{HttpResponse, StatusCode};
