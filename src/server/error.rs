//! Error types for the HTTP server.

use thiserror::Error;

use crate::dispatch::Error as DispatchError;
use crate::http::{Error as HttpError, Method};
use crate::routing::Error as RoutingError;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] HttpError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Route lookup or compilation failed.
    #[error("Routing error: {0}")]
    RoutingError(#[from] RoutingError),

    /// The path exists but not for this method.
    #[error("Method {method} not allowed for path: {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    /// The matched route could not be dispatched.
    #[error("Dispatch error: {0}")]
    DispatchError(#[from] DispatchError),
}
