//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route definition (Registrar: get/post/.../group)
//!     → collection.rs (group prefix and filter merging, method index)
//!     → compiler.rs (lazily, on first match, or read back from cache.rs)
//!     → router.rs (first route whose matchers all accept)
//!     → Return: RouteMatch or RouteNotFound
//! ```

pub mod cache;
mod collection;
mod compiler;
mod config;
mod error;
mod matcher;
mod route;
mod router;
pub mod template;
mod tests;

// Re-export public items
pub use collection::{GroupOptions, Registrar, RouteCollection};
pub use compiler::{compile, Bindings, CompiledPattern, CompiledRoute, Segment};
pub use config::RouterConfig;
pub use error::Error;
pub use matcher::{HostMatcher, Matcher, PathMatcher, SchemeMatcher};
pub use route::{FilterList, Route};
pub use router::{RouteMatch, Router};
