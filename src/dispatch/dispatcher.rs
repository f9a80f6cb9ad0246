//! Route dispatch.
//!
//! # Pipeline
//! ```text
//! resolve handler (container)
//!     → pre-filters (first response short-circuits)
//!     → describe method → bind parameters by name → invoke
//!     → post-filters (a response replaces the current one)
//!     → response, or an empty 200 when nothing produced one
//! ```

use std::sync::Arc;

use log::{debug, trace};

use crate::dispatch::container::Container;
use crate::dispatch::error::Error;
use crate::dispatch::handler::MethodDescriptor;
use crate::http::{HttpRequest, HttpResponse};
use crate::routing::{Bindings, Route, RouteMatch};

/// Runs a matched route through its filters and handler.
pub struct Dispatcher {
    container: Arc<dyn Container>,
}

impl Dispatcher {
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self { container }
    }

    /// Dispatch the result of [`Router::resolve`](crate::routing::Router::resolve).
    pub fn dispatch_match(&self, matched: &RouteMatch<'_>, request: &HttpRequest) -> Result<HttpResponse, Error> {
        self.dispatch(matched.route, request, &matched.variables)
    }

    /// Dispatch `request` to `route` with the given variable bindings.
    pub fn dispatch(
        &self,
        route: &Route,
        request: &HttpRequest,
        variables: &Bindings,
    ) -> Result<HttpResponse, Error> {
        let (type_name, method) = route.target().ok_or_else(|| Error::HandlerResolution {
            handler: route.action().to_string(),
            reason: "expected `Type@method`".to_string(),
        })?;

        let handler = self.container.handler(type_name)?;
        if handler.methods().is_empty() {
            return Err(Error::HandlerResolution {
                handler: type_name.to_string(),
                reason: "exposes no invokable methods".to_string(),
            });
        }

        for name in route.pre_filters() {
            let filter = self.container.filter(name)?;
            trace!("Running pre-filter `{name}` for {action}", action = route.action());
            if let Some(response) = filter.run(route, request, None) {
                debug!("Pre-filter `{name}` answered {action}", action = route.action());
                return Ok(response);
            }
        }

        let descriptor = match handler.describe(method) {
            Some(descriptor) if descriptor.is_public() => descriptor,
            found => {
                return Err(Error::Invocation {
                    handler: type_name.to_string(),
                    method: method.to_string(),
                    reason: if found.is_some() { "method is not public" } else { "no such method" }
                        .to_string(),
                })
            }
        };

        let args = bind_arguments(type_name, descriptor, route, variables)?;
        let mut response = handler.invoke(method, args, request)?;

        for name in route.post_filters() {
            let filter = self.container.filter(name)?;
            trace!("Running post-filter `{name}` for {action}", action = route.action());
            if let Some(replacement) = filter.run(route, request, response.as_ref()) {
                response = Some(replacement);
            }
        }

        Ok(response.unwrap_or_else(HttpResponse::empty))
    }
}

/// Bind each declared parameter by name: route variable, then route default,
/// then method default.
fn bind_arguments(
    type_name: &str,
    descriptor: &MethodDescriptor,
    route: &Route,
    variables: &Bindings,
) -> Result<Vec<String>, Error> {
    descriptor
        .params()
        .iter()
        .map(|param| {
            variables
                .get(&param.name)
                .or_else(|| route.defaults().get(&param.name))
                .or(param.default.as_ref())
                .cloned()
                .ok_or_else(|| Error::ParameterBinding {
                    handler: type_name.to_string(),
                    method: descriptor.name().to_string(),
                    parameter: param.name.clone(),
                })
        })
        .collect()
}
