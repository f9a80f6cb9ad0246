//! Error types for route definition, compilation and resolution.

use thiserror::Error;

use crate::http::Method;

/// Errors raised while defining, compiling, caching or resolving routes.
#[derive(Debug, Error)]
pub enum Error {
    /// A path, host or scheme template does not follow the placeholder grammar.
    #[error("Malformed route template `{template}`: {reason}")]
    MalformedTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No registered route accepts the request.
    #[error("No route for {method} {path}")]
    RouteNotFound {
        /// The request method.
        method: Method,
        /// The request path.
        path: String,
    },

    /// URL generation was asked for a name no route carries.
    #[error("No route named `{0}`")]
    UnknownRouteName(String),

    /// URL generation is missing a value for a required variable.
    #[error("Route `{route}` requires a value for `{name}`")]
    MissingParameter {
        /// The route name.
        route: String,
        /// The variable without a value.
        name: String,
    },

    /// URL generation got a value the variable could never capture.
    #[error("Route `{route}` cannot take `{value}` for `{name}`")]
    InvalidParameter {
        /// The route name.
        route: String,
        /// The variable the value was given for.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// A compiled pattern could not be built.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The compiled-route cache could not be written.
    #[error("Cache I/O error: {0}")]
    Cache(#[from] std::io::Error),

    /// The compiled-route cache could not be serialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(template: &str, reason: impl Into<String>) -> Self {
        Error::MalformedTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
