//! Dispatch of matched routes to handlers through filter chains.

mod container;
mod dispatcher;
mod error;
mod filter;
mod handler;

// Re-export public items
pub use container::{Binding, Container, Factory, ServiceContainer};
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use filter::Filter;
pub use handler::{Handler, MethodDescriptor, MethodFn, MethodTable, ParamDescriptor};
