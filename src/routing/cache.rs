//! Compiled-route cache.
//!
//! A cache file is a JSON document holding every route together with its
//! compiled form. Loading it replaces both route definition and compilation.
//! A missing, unreadable or stale file is treated as absent.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::routing::collection::RouteCollection;
use crate::routing::compiler::CompiledRoute;
use crate::routing::error::Error;
use crate::routing::route::Route;

/// Bumped whenever the layout of the cache document changes.
pub const CACHE_FORMAT: u32 = 1;

#[derive(Serialize)]
struct CacheDocumentRef<'a> {
    format: u32,
    routes: Vec<CachedRouteRef<'a>>,
}

#[derive(Serialize)]
struct CachedRouteRef<'a> {
    route: &'a Route,
    compiled: &'a CompiledRoute,
}

#[derive(Deserialize)]
struct CacheDocument {
    format: u32,
    routes: Vec<CachedRoute>,
}

#[derive(Deserialize)]
struct CachedRoute {
    route: Route,
    compiled: CompiledRoute,
}

/// Compile every route and write the cache to `path`.
pub fn save(path: &Path, routes: &RouteCollection) -> Result<(), Error> {
    let mut document = CacheDocumentRef {
        format: CACHE_FORMAT,
        routes: Vec::with_capacity(routes.len()),
    };
    for route in routes.iter() {
        document.routes.push(CachedRouteRef {
            route,
            compiled: route.compiled()?,
        });
    }
    fs::write(path, serde_json::to_vec(&document)?)?;

    info!("Wrote {count} compiled routes to {path}", count = routes.len(), path = path.display());
    Ok(())
}

/// Read a cache written by [`save`].
pub fn load(path: &Path) -> Option<RouteCollection> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No route cache at {path}", path = path.display());
            return None;
        }
        Err(e) => {
            warn!("Ignoring unreadable route cache {path}: {e}", path = path.display());
            return None;
        }
    };

    let document: CacheDocument = match serde_json::from_slice(&bytes) {
        Ok(document) => document,
        Err(e) => {
            warn!("Ignoring invalid route cache {path}: {e}", path = path.display());
            return None;
        }
    };
    if document.format != CACHE_FORMAT {
        warn!(
            "Ignoring route cache {path} with format {found}, expected {CACHE_FORMAT}",
            path = path.display(),
            found = document.format
        );
        return None;
    }

    let mut routes = RouteCollection::new();
    for CachedRoute { mut route, compiled } in document.routes {
        route.attach_compiled(compiled);
        routes.push(route);
    }

    info!("Loaded {count} compiled routes from {path}", count = routes.len(), path = path.display());
    Some(routes)
}
