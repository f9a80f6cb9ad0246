//! Router configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Router configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Where the compiled-route cache lives. No cache is read when unset.
    pub cache_path: Option<PathBuf>,
    /// Compile every route at bootstrap instead of on first match.
    pub compile_eagerly: bool,
}
