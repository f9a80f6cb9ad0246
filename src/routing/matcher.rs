//! Request matchers.
//!
//! # Design Decisions
//! - A route matches only when every active matcher accepts (AND semantics)
//! - The path matcher is always active; host and scheme only when declared
//! - Host and scheme comparisons ignore ASCII case, paths do not
//! - The host is compared without its `:port` suffix

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::HttpRequest;
use crate::routing::compiler::{Bindings, CompiledPattern};

/// Trait for matching one request attribute against a compiled constraint.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns the bound variables if the request is accepted.
    fn matches(&self, request: &HttpRequest) -> Option<Bindings>;
}

/// Matches the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathMatcher {
    pattern: CompiledPattern,
}

impl PathMatcher {
    pub fn new(pattern: CompiledPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, request: &HttpRequest) -> Option<Bindings> {
        self.pattern.capture(&request.path)
    }
}

/// Matches the host the request was addressed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostMatcher {
    pattern: CompiledPattern,
}

impl HostMatcher {
    pub fn new(pattern: CompiledPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, request: &HttpRequest) -> Option<Bindings> {
        self.pattern.capture(request.host_name())
    }
}

/// Matches the scheme the request arrived on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeMatcher {
    pattern: CompiledPattern,
}

impl SchemeMatcher {
    pub fn new(pattern: CompiledPattern) -> Self {
        Self { pattern }
    }
}

impl Matcher for SchemeMatcher {
    fn matches(&self, request: &HttpRequest) -> Option<Bindings> {
        self.pattern.capture(&request.scheme)
    }
}
