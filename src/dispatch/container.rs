//! The object-construction boundary.
//!
//! The dispatcher never builds handlers or filters itself; it asks a
//! [`Container`]. [`ServiceContainer`] is a binding table keyed by identifier
//! whose entries are either shared instances or [`Factory`] values.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::error::Error;
use crate::dispatch::filter::Filter;
use crate::dispatch::handler::Handler;

/// Resolves handler types and filter identifiers to instances.
pub trait Container: Send + Sync {
    /// Build or fetch the handler registered for `type_name`.
    fn handler(&self, type_name: &str) -> Result<Arc<dyn Handler>, Error>;

    /// Build or fetch the filter registered for `name`.
    fn filter(&self, name: &str) -> Result<Arc<dyn Filter>, Error>;
}

/// Builds a fresh instance on every resolution.
///
/// Implementors carry whatever the instance needs as named fields.
pub trait Factory<T: ?Sized>: Send + Sync {
    fn build(&self) -> Result<Arc<T>, Error>;
}

/// One entry of the binding table.
pub enum Binding<T: ?Sized> {
    /// The same instance every time.
    Shared(Arc<T>),
    /// A new instance per resolution.
    Factory(Arc<dyn Factory<T>>),
}

impl<T: ?Sized> Binding<T> {
    fn resolve(&self) -> Result<Arc<T>, Error> {
        match self {
            Binding::Shared(instance) => Ok(Arc::clone(instance)),
            Binding::Factory(factory) => factory.build(),
        }
    }
}

/// A table-driven [`Container`].
#[derive(Default)]
pub struct ServiceContainer {
    handlers: HashMap<String, Binding<dyn Handler>>,
    filters: HashMap<String, Binding<dyn Filter>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a shared handler instance to a type name.
    pub fn bind_handler(&mut self, type_name: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.insert(type_name.into(), Binding::Shared(handler));
        self
    }

    /// Bind a handler factory to a type name.
    pub fn bind_handler_factory<F>(&mut self, type_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Factory<dyn Handler> + 'static,
    {
        self.handlers
            .insert(type_name.into(), Binding::Factory(Arc::new(factory)));
        self
    }

    /// Bind a shared filter instance to an identifier.
    pub fn bind_filter(&mut self, name: impl Into<String>, filter: Arc<dyn Filter>) -> &mut Self {
        self.filters.insert(name.into(), Binding::Shared(filter));
        self
    }

    /// Bind a filter factory to an identifier.
    pub fn bind_filter_factory<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Factory<dyn Filter> + 'static,
    {
        self.filters
            .insert(name.into(), Binding::Factory(Arc::new(factory)));
        self
    }
}

impl Container for ServiceContainer {
    fn handler(&self, type_name: &str) -> Result<Arc<dyn Handler>, Error> {
        self.handlers
            .get(type_name)
            .ok_or_else(|| Error::HandlerResolution {
                handler: type_name.to_string(),
                reason: "no binding for this type".to_string(),
            })?
            .resolve()
    }

    fn filter(&self, name: &str) -> Result<Arc<dyn Filter>, Error> {
        self.filters
            .get(name)
            .ok_or_else(|| Error::FilterResolution(name.to_string()))?
            .resolve()
    }
}
