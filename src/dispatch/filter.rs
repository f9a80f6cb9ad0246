//! Filter capability.

use crate::http::{HttpRequest, HttpResponse};
use crate::routing::Route;

/// A pre- or post-handler interceptor.
///
/// Before the handler `response` is `None`, and returning a response
/// short-circuits the dispatch. After the handler, returning a response
/// replaces the current one and returning `None` passes it through.
pub trait Filter: Send + Sync {
    fn run(
        &self,
        route: &Route,
        request: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Option<HttpResponse>;
}

impl<F> Filter for F
where
    F: Fn(&Route, &HttpRequest, Option<&HttpResponse>) -> Option<HttpResponse> + Send + Sync,
{
    fn run(
        &self,
        route: &Route,
        request: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Option<HttpResponse> {
        self(route, request, response)
    }
}
