//! Handler capability and method descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::error::Error;
use crate::http::{HttpRequest, HttpResponse};

/// One declared parameter of a handler method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    /// Value used when neither the route nor its defaults supply one.
    pub default: Option<String>,
}

/// The signature of an invokable handler method, built once rather than
/// re-derived on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParamDescriptor>,
    public: bool,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            public: true,
        }
    }

    /// Declare a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Declare a parameter with a method-level default.
    pub fn param_or(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Mark the method as not invokable through routing.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn is_public(&self) -> bool {
        self.public
    }
}

/// Something a route can dispatch to by method name.
pub trait Handler: Send + Sync {
    /// The methods this handler exposes.
    fn methods(&self) -> &[MethodDescriptor];

    /// Call `method` with arguments in declaration order.
    ///
    /// `Ok(None)` means the method produced no response of its own.
    fn invoke(
        &self,
        method: &str,
        args: Vec<String>,
        request: &HttpRequest,
    ) -> Result<Option<HttpResponse>, Error>;

    /// Look up the descriptor for `method`.
    fn describe(&self, method: &str) -> Option<&MethodDescriptor> {
        self.methods().iter().find(|m| m.name() == method)
    }
}

/// Type alias for the function behind one handler method.
pub type MethodFn =
    Arc<dyn Fn(&[String], &HttpRequest) -> Result<Option<HttpResponse>, Error> + Send + Sync>;

/// A handler assembled from descriptors and functions.
#[derive(Default)]
pub struct MethodTable {
    name: String,
    descriptors: Vec<MethodDescriptor>,
    functions: HashMap<String, MethodFn>,
}

impl MethodTable {
    /// Create an empty table; `name` is used in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a method.
    pub fn method<F>(mut self, descriptor: MethodDescriptor, function: F) -> Self
    where
        F: Fn(&[String], &HttpRequest) -> Result<Option<HttpResponse>, Error> + Send + Sync + 'static,
    {
        self.functions
            .insert(descriptor.name().to_string(), Arc::new(function));
        self.descriptors.push(descriptor);
        self
    }
}

impl Handler for MethodTable {
    fn methods(&self) -> &[MethodDescriptor] {
        &self.descriptors
    }

    fn invoke(
        &self,
        method: &str,
        args: Vec<String>,
        request: &HttpRequest,
    ) -> Result<Option<HttpResponse>, Error> {
        let function = self.functions.get(method).ok_or_else(|| Error::Invocation {
            handler: self.name.clone(),
            method: method.to_string(),
            reason: "no such method".to_string(),
        })?;
        function(&args, request)
    }
}
