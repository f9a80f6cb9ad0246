//! Route lookup.
//!
//! # Design Decisions
//! - Frozen after construction: resolution only reads the collection
//! - Candidates are tried in registration order and the first match wins
//! - Explicit `RouteNotFound` rather than a silent fallback

use std::collections::HashMap;
use std::path::Path;

use log::{info, trace};

use crate::http::{HttpRequest, Method};
use crate::routing::cache;
use crate::routing::collection::{Registrar, RouteCollection};
use crate::routing::compiler::Bindings;
use crate::routing::config::RouterConfig;
use crate::routing::error::Error;
use crate::routing::route::Route;
use crate::routing::template::{self, Token};

/// A resolved request: the matching route and its variable bindings.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    pub route: &'r Route,
    /// Captured values merged with the route's defaults for absent optionals.
    pub variables: Bindings,
}

/// Resolves requests against a frozen [`RouteCollection`].
#[derive(Debug, Default)]
pub struct Router {
    routes: RouteCollection,
}

impl Router {
    pub fn new(routes: RouteCollection) -> Self {
        Self { routes }
    }

    /// Build a router from the compiled-route cache when one is configured and
    /// valid, otherwise by running `define` against a fresh collection.
    pub fn bootstrap<F>(config: &RouterConfig, define: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut Registrar<'_>) -> Result<(), Error>,
    {
        if let Some(routes) = config.cache_path.as_deref().and_then(cache::load) {
            return Ok(Self::new(routes));
        }

        let mut routes = RouteCollection::new();
        define(&mut routes.registrar())?;
        if config.compile_eagerly {
            routes.compile_all()?;
        }
        info!("Router ready with {count} routes", count = routes.len());
        Ok(Self::new(routes))
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    /// Find the first route, in registration order, that accepts the request.
    pub fn resolve(&self, request: &HttpRequest) -> Result<RouteMatch<'_>, Error> {
        for route in self.routes.routes(request.method) {
            trace!("Trying {method} {path}", method = route.method(), path = route.path());
            if let Some(mut variables) = route.compiled()?.matches(request) {
                for (name, default) in route.defaults() {
                    variables
                        .entry(name.clone())
                        .or_insert_with(|| default.clone());
                }
                return Ok(RouteMatch { route, variables });
            }
        }

        Err(Error::RouteNotFound {
            method: request.method,
            path: request.path.clone(),
        })
    }

    /// Methods with at least one route accepting the request's path, host and scheme.
    pub fn allowed_methods(&self, request: &HttpRequest) -> Result<Vec<Method>, Error> {
        let mut allowed = Vec::new();
        for method in Method::ALL {
            for route in self.routes.routes(method) {
                if route.compiled()?.matches(request).is_some() {
                    allowed.push(method);
                    break;
                }
            }
        }
        Ok(allowed)
    }

    /// Render the path of the route called `name`.
    ///
    /// Missing values fall back to declared defaults; an absent trailing
    /// optional is dropped together with its separator. Supplied values must
    /// be non-empty and free of `/` so the URL resolves back to the route.
    pub fn url(&self, name: &str, params: &HashMap<String, String>) -> Result<String, Error> {
        let route = self
            .routes
            .by_name(name)
            .ok_or_else(|| Error::UnknownRouteName(name.to_string()))?;

        let mut url = String::new();
        for token in template::parse(route.path())? {
            match token {
                Token::Literal(text) => url.push_str(&text),
                Token::Variable { name: variable, optional, default } => {
                    if let Some(value) = params.get(&variable) {
                        if value.is_empty() || value.contains('/') {
                            return Err(Error::InvalidParameter {
                                route: name.to_string(),
                                name: variable,
                                value: value.clone(),
                            });
                        }
                    }
                    match params.get(&variable).or(default.as_ref()) {
                        Some(value) => url.push_str(value),
                        None if optional => {
                            if url.len() > 1 && url.ends_with('/') {
                                url.pop();
                            }
                        }
                        None => {
                            return Err(Error::MissingParameter {
                                route: name.to_string(),
                                name: variable,
                            })
                        }
                    }
                }
            }
        }
        Ok(url)
    }

    /// Write the compiled-route cache for this router's routes.
    pub fn save_cache(&self, path: &Path) -> Result<(), Error> {
        cache::save(path, &self.routes)
    }
}
