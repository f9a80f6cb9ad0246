//! Error types for dispatch.

use thiserror::Error;

/// Errors that can occur while dispatching a matched route.
///
/// None of them are retried; the embedding application decides how to answer.
#[derive(Debug, Error)]
pub enum Error {
    /// The handler type is unknown, cannot be built, or exposes no methods.
    #[error("Cannot resolve handler `{handler}`: {reason}")]
    HandlerResolution {
        /// The handler reference that failed.
        handler: String,
        /// Why it failed.
        reason: String,
    },

    /// The handler method is missing, not public, or failed when called.
    #[error("Cannot invoke `{handler}@{method}`: {reason}")]
    Invocation {
        handler: String,
        method: String,
        reason: String,
    },

    /// A required handler parameter has no value.
    #[error("No value for parameter `{parameter}` of `{handler}@{method}`")]
    ParameterBinding {
        handler: String,
        method: String,
        parameter: String,
    },

    /// A filter identifier does not resolve to a filter.
    #[error("Unknown filter `{0}`")]
    FilterResolution(String),
}
