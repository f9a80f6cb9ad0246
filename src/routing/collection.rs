//! Route storage and the definition-time registration API.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use log::{debug, warn};

use crate::http::Method;
use crate::routing::error::Error;
use crate::routing::route::{join_paths, FilterList, Route};

/// Routes indexed by method, each list in registration order.
///
/// Registration order is match priority and is never re-sorted.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: HashMap<Method, Vec<Route>>,
    names: HashMap<String, (Method, usize)>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a definition pass with an empty group stack.
    pub fn registrar(&mut self) -> Registrar<'_> {
        Registrar {
            collection: self,
            frames: Vec::new(),
        }
    }

    /// Validate and append a route outside of any group.
    pub fn add(&mut self, mut route: Route) -> Result<(), Error> {
        route.prepare()?;
        debug!(
            "Registered route {method} {path} -> {action}",
            method = route.method(),
            path = route.path(),
            action = route.action()
        );
        self.push(route);
        Ok(())
    }

    /// Append a route that was already validated and compiled, e.g. read back from the cache.
    pub(crate) fn push(&mut self, route: Route) {
        let list = self.routes.entry(route.method()).or_default();
        if let Some(name) = route.name() {
            let previous = self.names.insert(name.to_string(), (route.method(), list.len()));
            if previous.is_some() {
                warn!("Route name `{name}` registered more than once, the later route wins");
            }
        }
        list.push(route);
    }

    /// Routes for one method; empty when none were registered.
    pub fn routes(&self, method: Method) -> &[Route] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The full method-to-routes mapping.
    pub fn all(&self) -> &HashMap<Method, Vec<Route>> {
        &self.routes
    }

    /// Every route, grouped by method in [`Method::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        Method::ALL.into_iter().flat_map(|method| self.routes(method))
    }

    /// Look up a route by name.
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        let (method, index) = self.names.get(name)?;
        self.routes.get(method)?.get(*index)
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compile every route now instead of on first match.
    pub fn compile_all(&self) -> Result<(), Error> {
        for route in self.iter() {
            route.compiled()?;
        }
        Ok(())
    }
}

/// Options for one grouping level.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    prefix: String,
    pre: Vec<String>,
    post: Vec<String>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix for every route in the group.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Filters run before the handler of every route in the group.
    pub fn pre(mut self, filters: impl Into<FilterList>) -> Self {
        self.pre = filters.into().0;
        self
    }

    /// Filters run after the handler of every route in the group.
    pub fn post(mut self, filters: impl Into<FilterList>) -> Self {
        self.post = filters.into().0;
        self
    }
}

/// The already-merged context of one active group.
#[derive(Debug, Clone, Default)]
struct GroupFrame {
    prefix: String,
    pre: Vec<String>,
    post: Vec<String>,
}

impl GroupFrame {
    fn nest(&self, options: GroupOptions) -> Self {
        Self {
            prefix: join_paths(&self.prefix, &options.prefix),
            pre: self.pre.iter().cloned().chain(options.pre).collect(),
            post: self.post.iter().cloned().chain(options.post).collect(),
        }
    }
}

/// A definition pass over a [`RouteCollection`].
///
/// Carries the group stack explicitly; every route added through it picks up
/// the prefix and filters of the innermost active group.
#[derive(Debug)]
pub struct Registrar<'c> {
    collection: &'c mut RouteCollection,
    frames: Vec<GroupFrame>,
}

impl<'c> Registrar<'c> {
    /// Register a route under the active group context.
    pub fn add(&mut self, mut route: Route) -> Result<(), Error> {
        if let Some(frame) = self.frames.last() {
            route.scope(&frame.prefix, &frame.pre, &frame.post);
        }
        self.collection.add(route)
    }

    pub fn get(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::GET, path, action))
    }

    pub fn post(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::POST, path, action))
    }

    pub fn put(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::PUT, path, action))
    }

    pub fn patch(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::PATCH, path, action))
    }

    pub fn delete(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::DELETE, path, action))
    }

    pub fn head(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::HEAD, path, action))
    }

    pub fn options(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.add(Route::new(Method::OPTIONS, path, action))
    }

    /// Register one independent route per method in [`Method::ALL`].
    pub fn any(&mut self, path: &str, action: &str) -> Result<(), Error> {
        self.multiple(&Method::ALL, path, action)
    }

    /// Register one independent route per listed method.
    pub fn multiple(&mut self, methods: &[Method], path: &str, action: &str) -> Result<(), Error> {
        for method in methods {
            self.add(Route::new(*method, path, action))?;
        }
        Ok(())
    }

    /// Run `define` with a group frame merged onto the current one.
    ///
    /// The frame is popped when `define` returns, whether it succeeded,
    /// failed or panicked.
    pub fn group<F>(&mut self, options: GroupOptions, define: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Registrar<'c>) -> Result<(), Error>,
    {
        let frame = self.frames.last().cloned().unwrap_or_default().nest(options);
        debug!("Entering route group `{prefix}`", prefix = frame.prefix);

        let depth = self.frames.len();
        self.frames.push(frame);
        let mut scope = FrameGuard {
            registrar: self,
            depth,
        };
        define(&mut *scope)
    }

    /// Number of currently active groups.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Pops group frames back to `depth` on drop.
struct FrameGuard<'r, 'c> {
    registrar: &'r mut Registrar<'c>,
    depth: usize,
}

impl<'c> Deref for FrameGuard<'_, 'c> {
    type Target = Registrar<'c>;

    fn deref(&self) -> &Self::Target {
        &*self.registrar
    }
}

impl DerefMut for FrameGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.registrar
    }
}

impl Drop for FrameGuard<'_, '_> {
    fn drop(&mut self) {
        self.registrar.frames.truncate(self.depth);
    }
}
