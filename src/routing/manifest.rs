//! JSON route manifests.
//!
//! # Responsibilities
//! - Load routes (with optional route-level hooks) from a JSON file
//! - Dump a route table back to the same format
//!
//! # Format
//! ```json
//! [
//!   {"method": "GET", "path": "/", "controller": "home", "action": "index"},
//!   {"method": ["PUT", "PATCH"], "path": "/messages/<id>",
//!    "controller": "messages", "action": "update",
//!    "hooks": {"before_request": {"callback": "load", "actions": "update"}}}
//! ]
//! ```
//!
//! # Design Decisions
//! - Every entry is validated before any is returned
//! - `PUT` and `PATCH` both expand to the PUT verb, so either one yields both methods

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hooks::{HookBinding, HookError, HookKind, HookSpec};
use crate::routing::route::{MethodSet, Route, RouteError, Verb};
use crate::routing::table::RouteTable;

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read route manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("route #{index}: {source}")]
    Route {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("route #{index}: {source}")]
    Hook {
        index: usize,
        #[source]
        source: HookError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MethodField {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteEntry {
    method: MethodField,
    path: String,
    controller: String,
    action: String,
    /// Hook name to spec, in declaration order.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    hooks: serde_json::Map<String, serde_json::Value>,
}

impl RouteEntry {
    fn from_route(route: &Route) -> Result<Self, serde_json::Error> {
        let names: Vec<String> = route.methods().names().into_iter().map(str::to_string).collect();
        let method = match names.as_slice() {
            [one] => MethodField::One(one.clone()),
            _ => MethodField::Many(names),
        };
        let mut hooks = serde_json::Map::new();
        for (kind, spec) in route.hooks() {
            hooks.insert(kind.as_str().to_string(), serde_json::to_value(spec)?);
        }
        Ok(Self {
            method,
            path: route.path().to_string(),
            controller: route.controller().to_string(),
            action: route.action().to_string(),
            hooks,
        })
    }

    fn into_route(self, index: usize) -> Result<Route, ManifestError> {
        let route_err = |source| ManifestError::Route { index, source };
        let hook_err = |source| ManifestError::Hook { index, source };

        let names = match self.method {
            MethodField::One(name) => vec![name],
            MethodField::Many(names) => names,
        };
        let mut methods = MethodSet::default();
        for name in &names {
            let verb: Verb = name.parse().map_err(route_err)?;
            methods.extend(&verb.methods());
        }

        let mut hooks = Vec::with_capacity(self.hooks.len());
        for (name, value) in self.hooks {
            let kind: HookKind = name.parse().map_err(hook_err)?;
            let spec = HookSpec::from(value);
            HookBinding::from_spec(kind, &spec).map_err(hook_err)?;
            hooks.push((kind, spec));
        }

        let route = Route::new(methods, self.path, &self.controller, &self.action).map_err(route_err)?;
        Ok(route.with_hooks(hooks))
    }
}

/// Parse a manifest document.
pub fn parse_manifest(json: &str) -> Result<Vec<Route>, ManifestError> {
    let entries: Vec<RouteEntry> = serde_json::from_str(json)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_route(index))
        .collect()
}

/// Read and parse a manifest file.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<Route>, ManifestError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let routes = parse_manifest(&json)?;
    tracing::info!(path = %path.display(), routes = routes.len(), "Route manifest loaded");
    Ok(routes)
}

/// Render `table` in manifest format.
pub fn to_json(table: &RouteTable) -> Result<String, serde_json::Error> {
    let entries = table
        .routes()
        .iter()
        .map(RouteEntry::from_route)
        .collect::<Result<Vec<_>, _>>()?;
    serde_json::to_string_pretty(&entries)
}
