//! A route compilation, matching and dispatch engine.
//!
//! Routes are declared as path templates with variables, optional trailing
//! segments, defaults, host and scheme constraints, and pre/post filter
//! chains. They are compiled to anchored matchers, resolved against incoming
//! requests in registration order, and dispatched to handlers through their
//! filters.
//!
//! # Features
//!
//! - Path templates: `{name}`, `{name?}`, `{name?=default}`
//! - Host and scheme constraints with the same placeholder grammar
//! - Nested groups merging path prefixes and filter lists
//! - First-match-wins resolution with variable extraction
//! - Short-circuiting pre-filters and response-replacing post-filters
//! - A compiled-route cache that skips recompilation at startup
//! - Named routes and URL generation
//! - A small tokio server adapter
//!
//! # Examples
//!
//! ## Defining and resolving routes
//!
//! ```
//! use microroute_rs::{GroupOptions, HttpRequest, Method, Router, RouterConfig};
//!
//! let router = Router::bootstrap(&RouterConfig::default(), |r| {
//!     r.get("/foo/{bar}", "Foo@show")?;
//!     r.group(GroupOptions::new().prefix("/admin").pre("auth"), |r| {
//!         r.get("/posts/{page?=1}", "Posts@index")
//!     })
//! })
//! .unwrap();
//!
//! let matched = router.resolve(&HttpRequest::new(Method::GET, "/foo/123")).unwrap();
//! assert_eq!(matched.variables["bar"], "123");
//!
//! let matched = router.resolve(&HttpRequest::new(Method::GET, "/admin/posts")).unwrap();
//! assert_eq!(matched.variables["page"], "1");
//! assert_eq!(matched.route.pre_filters(), ["auth"]);
//! ```
//!
//! ## Dispatching
//!
//! ```
//! use std::sync::Arc;
//! use microroute_rs::{
//!     Dispatcher, HttpRequest, HttpResponse, Method, MethodDescriptor, MethodTable, Router,
//!     RouterConfig, ServiceContainer, StatusCode,
//! };
//!
//! let router = Router::bootstrap(&RouterConfig::default(), |r| r.get("/users/{id}", "Users@show")).unwrap();
//!
//! let users = MethodTable::new("Users").method(MethodDescriptor::new("show").param("id"), |args, _req| {
//!     Ok(Some(HttpResponse::new(StatusCode::Ok).with_body_string(format!("user {}", args[0]))))
//! });
//! let mut container = ServiceContainer::new();
//! container.bind_handler("Users", Arc::new(users));
//! let dispatcher = Dispatcher::new(Arc::new(container));
//!
//! let request = HttpRequest::new(Method::GET, "/users/7");
//! let matched = router.resolve(&request).unwrap();
//! let response = dispatcher.dispatch_match(&matched, &request).unwrap();
//! assert_eq!(response.body_text(), "user 7");
//! ```

pub mod dispatch;
pub mod http;
pub mod routing;
pub mod server;

// Re-export commonly used items for convenience
pub use dispatch::{
    Container, Dispatcher, Error as DispatchError, Factory, Filter, Handler, MethodDescriptor,
    MethodTable, ServiceContainer,
};
pub use http::{Error as HttpError, HttpRequest, HttpResponse, Method, StatusCode};
pub use routing::{
    Error as RoutingError, GroupOptions, Registrar, Route, RouteCollection, RouteMatch, Router,
    RouterConfig,
};
pub use server::{Error as ServerError, HttpServer, ServerConfig};
