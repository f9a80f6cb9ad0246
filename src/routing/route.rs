//! The route entity.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::http::Method;
use crate::routing::compiler::{self, CompiledRoute};
use crate::routing::error::Error;
use crate::routing::template::{self, Token};

/// An ordered list of filter identifiers.
///
/// A single identifier converts to a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterList(pub Vec<String>);

impl From<&str> for FilterList {
    fn from(name: &str) -> Self {
        FilterList(vec![name.to_string()])
    }
}

impl From<String> for FilterList {
    fn from(name: String) -> Self {
        FilterList(vec![name])
    }
}

impl From<Vec<String>> for FilterList {
    fn from(names: Vec<String>) -> Self {
        FilterList(names)
    }
}

impl From<Vec<&str>> for FilterList {
    fn from(names: Vec<&str>) -> Self {
        names.as_slice().into()
    }
}

impl From<&[&str]> for FilterList {
    fn from(names: &[&str]) -> Self {
        FilterList(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterList {
    fn from(names: [&str; N]) -> Self {
        names.as_slice().into()
    }
}

/// One routable endpoint: a method and templates bound to a `Type@method` handler target.
///
/// Routes are built with the `with_*` methods and then registered; the
/// compiled form is attached lazily on the first match attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    method: Method,
    path: String,
    host: Option<String>,
    scheme: Option<String>,
    action: String,
    name: Option<String>,
    pre_filters: Vec<String>,
    post_filters: Vec<String>,
    defaults: BTreeMap<String, String>,
    #[serde(skip)]
    compiled: OnceLock<CompiledRoute>,
}

impl Route {
    /// Create a route for `method` on the path template `path`, handled by `action` (`Type@method`).
    pub fn new(method: Method, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            host: None,
            scheme: None,
            action: action.into(),
            name: None,
            pre_filters: Vec::new(),
            post_filters: Vec::new(),
            defaults: BTreeMap::new(),
            compiled: OnceLock::new(),
        }
    }

    /// Constrain the host, e.g. `{tenant}.example.com`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self.compiled = OnceLock::new();
        self
    }

    /// Constrain the scheme, e.g. `https`.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self.compiled = OnceLock::new();
        self
    }

    /// Name the route for URL generation.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append filters to run before the handler.
    pub fn with_pre(mut self, filters: impl Into<FilterList>) -> Self {
        self.pre_filters.extend(filters.into().0);
        self
    }

    /// Append filters to run after the handler.
    pub fn with_post(mut self, filters: impl Into<FilterList>) -> Self {
        self.post_filters.extend(filters.into().0);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// The raw `Type@method` handler reference.
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pre_filters(&self) -> &[String] {
        &self.pre_filters
    }

    pub fn post_filters(&self) -> &[String] {
        &self.post_filters
    }

    /// Defaults declared with `{name?=default}`.
    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Split the action into its type and method components.
    ///
    /// `None` when the action is not exactly one `@` between two non-empty parts.
    pub fn target(&self) -> Option<(&str, &str)> {
        match self.action.split_once('@') {
            Some((ty, method)) if !ty.is_empty() && !method.is_empty() && !method.contains('@') => {
                Some((ty, method))
            }
            _ => None,
        }
    }

    /// The compiled form, built on first use and reused afterwards.
    pub fn compiled(&self) -> Result<&CompiledRoute, Error> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        let compiled = compiler::compile(self)?;
        Ok(self.compiled.get_or_init(|| compiled))
    }

    /// Whether the compiled form is already attached.
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    pub(crate) fn attach_compiled(&mut self, compiled: CompiledRoute) {
        self.compiled = OnceLock::from(compiled);
    }

    /// Apply a group prefix and group filters; parent filters go first.
    pub(crate) fn scope(&mut self, prefix: &str, pre: &[String], post: &[String]) {
        self.path = join_paths(prefix, &self.path);
        self.pre_filters = pre.iter().cloned().chain(std::mem::take(&mut self.pre_filters)).collect();
        self.post_filters = post.iter().cloned().chain(std::mem::take(&mut self.post_filters)).collect();
        self.compiled = OnceLock::new();
    }

    /// Normalize the path and validate every template, collecting declared defaults.
    pub(crate) fn prepare(&mut self) -> Result<(), Error> {
        self.path = normalize_path(&self.path);

        let mut defaults = BTreeMap::new();
        let templates = std::iter::once(Some(self.path.as_str()))
            .chain([self.host.as_deref(), self.scheme.as_deref()])
            .flatten();
        for source in templates {
            for token in template::parse(source)? {
                if let Token::Variable { name, default: Some(default), .. } = token {
                    defaults.insert(name, default);
                }
            }
        }
        self.defaults = defaults;
        Ok(())
    }
}

/// Collapse repeated `/` outside placeholders and make the path absolute.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    normalized.push('/');
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 && normalized.ends_with('/') => continue,
            _ => {}
        }
        normalized.push(c);
    }
    normalized
}

/// Join a group prefix and a route path with a single `/`.
///
/// A root route inside a prefixed group takes the prefix itself, without a trailing slash.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if prefix.is_empty() {
        return normalize_path(path);
    }
    if path.is_empty() {
        return normalize_path(prefix);
    }
    normalize_path(&format!("{prefix}/{path}"))
}
