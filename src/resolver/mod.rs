//! Startup resolution of declared routes into live endpoints.
//!
//! # Data Flow
//! ```text
//! RouteTable::grouped()                 ControllerRegistry
//!     → per controller name ──────────────→ build() → BoundController
//!     → hooks: HookTable + route hooks → chain::compile → HookSet / AppHooks
//!     → per route: action handler → Blueprint::add_endpoint
//!     → Application::register_blueprint (duplicate / conflict checks)
//!     → Application::into_router() → axum::Router
//! ```
//!
//! # Design Decisions
//! - Runs once, before serving; every failure aborts startup
//! - One controller instance per name for the process lifetime
//! - Conflicts axum would panic on are reported as errors instead

pub mod application;
pub mod blueprint;
pub mod endpoint;

use thiserror::Error;

use crate::controller::{naming, ControllerRegistry};
use crate::hooks::{chain, HookBinding, HookError, HookKind, HookSet};
use crate::routing::{RouteError, RouteTable};

pub use application::Application;
pub use blueprint::{Blueprint, BoundEndpoint};

/// Default cap on buffered request bodies (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Errors raised while binding routes to controllers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// No factory registered for a routed controller.
    #[error("controller `{name}` not found: register `{class}` (module `{module}`)")]
    ControllerNotFound {
        name: String,
        class: String,
        module: String,
    },

    /// Registry already holds a factory for this name.
    #[error("controller `{0}` is already registered")]
    DuplicateController(String),

    /// A route names an action the controller does not expose.
    #[error("controller `{controller}` has no action `{action}`")]
    MissingAction { controller: String, action: String },

    /// The same `controller.action` endpoint was bound twice.
    #[error("endpoint `{0}` is already registered")]
    DuplicateEndpoint(String),

    /// A blueprint with this name was already registered.
    #[error("blueprint `{0}` is already registered")]
    DuplicateBlueprint(String),

    /// Two endpoints claim the same path and method.
    #[error("{method} {path} is claimed by both `{existing}` and `{endpoint}`")]
    RouteConflict {
        method: String,
        path: String,
        existing: String,
        endpoint: String,
    },

    /// Path template cannot be mounted.
    #[error("invalid path `{path}` for `{endpoint}`: {reason}")]
    InvalidPath {
        path: String,
        endpoint: String,
        reason: String,
    },

    /// Method has no router filter.
    #[error("unsupported method `{method}` for `{endpoint}`")]
    UnsupportedMethod { method: String, endpoint: String },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("hook configuration error: {0}")]
    Hook(#[from] HookError),
}

/// Turns a [`RouteTable`] into an [`Application`] using a [`ControllerRegistry`].
pub struct Resolver<'a> {
    table: &'a RouteTable,
    registry: &'a ControllerRegistry,
    body_limit: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a RouteTable, registry: &'a ControllerRegistry) -> Self {
        Self {
            table,
            registry,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Cap on request bodies buffered for actions.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Resolve every declared route.
    pub fn resolve(&self) -> Result<Application, RegistrationError> {
        let mut app = Application::new(self.body_limit);

        for group in self.table.grouped() {
            let name = group.controller.as_str();
            let controller = self
                .registry
                .build(name)
                .ok_or_else(|| RegistrationError::ControllerNotFound {
                    name: name.to_string(),
                    class: naming::class_name(name),
                    module: naming::module_name(name),
                })?;

            let mut hooks = HookSet::new();
            let bindings = controller.hooks().bindings()?;
            chain::compile(name, &bindings, controller.callbacks(), &mut hooks, app.app_hooks_mut())?;

            let mut route_bindings: Vec<(HookKind, HookBinding)> = Vec::new();
            for route in &group.routes {
                for (kind, spec) in route.hooks() {
                    let binding = (*kind, HookBinding::from_spec(*kind, spec)?);
                    if !route_bindings.contains(&binding) {
                        route_bindings.push(binding);
                    }
                }
            }
            chain::compile(name, &route_bindings, controller.callbacks(), &mut hooks, app.app_hooks_mut())?;

            let mut blueprint = Blueprint::new(name, hooks);
            for route in &group.routes {
                let handler = controller
                    .action(route.action())
                    .ok_or_else(|| RegistrationError::MissingAction {
                        controller: name.to_string(),
                        action: route.action().to_string(),
                    })?;
                blueprint.add_endpoint(route, handler)?;
            }

            tracing::info!(
                controller = %name,
                class = %naming::class_name(name),
                endpoints = blueprint.len(),
                "Blueprint registered"
            );
            app.register_blueprint(blueprint)?;
        }

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Actions, Callbacks, Context, Controller};
    use crate::hooks::HookTable;
    use crate::routing::Routes;
    use std::ops::ControlFlow;
    use std::sync::Arc;

    #[derive(Default)]
    struct MessagesController;

    impl MessagesController {
        async fn index(self: Arc<Self>, _cx: Context) -> &'static str {
            "index"
        }
    }

    impl Controller for MessagesController {
        fn actions(actions: &mut Actions<Self>) {
            for name in ["index", "new", "create", "show", "edit", "update", "delete"] {
                actions.add(name, Self::index);
            }
        }
    }

    #[derive(Default)]
    struct BrokenHooksController;

    impl Controller for BrokenHooksController {
        fn actions(actions: &mut Actions<Self>) {
            actions.add("index", |_: Arc<Self>, _: Context| async { "index" });
        }

        fn callbacks(callbacks: &mut Callbacks<Self>) {
            callbacks.before("setup", |_, _| ControlFlow::Continue(()));
        }

        fn hooks(hooks: &mut HookTable) {
            hooks.declare("before_request", serde_json::json!("setup"));
        }
    }

    fn registry() -> ControllerRegistry {
        let mut registry = ControllerRegistry::new();
        registry.register_default::<MessagesController>("messages").unwrap();
        registry.register_default::<BrokenHooksController>("broken").unwrap();
        registry
    }

    #[test]
    fn test_resolves_resource_routes() {
        let mut table = RouteTable::new();
        table.all("messages").unwrap();

        let registry = registry();
        let app = Resolver::new(&table, &registry).resolve().unwrap();
        let blueprint = app.blueprint("messages").unwrap();
        assert_eq!(blueprint.len(), 7);
        assert!(blueprint.endpoints().iter().any(|e| e.endpoint().to_string() == "messages.update"));
    }

    #[test]
    fn test_missing_controller_is_fatal() {
        let mut table = RouteTable::new();
        table.get("/", "home#index").unwrap();

        let registry = registry();
        let err = Resolver::new(&table, &registry).resolve().err().unwrap();
        assert_eq!(
            err,
            RegistrationError::ControllerNotFound {
                name: "home".into(),
                class: "HomeController".into(),
                module: "home_controller".into(),
            }
        );
    }

    #[test]
    fn test_missing_action_is_fatal() {
        let mut table = RouteTable::new();
        table.get("/messages/archive", "messages#archive").unwrap();

        let registry = registry();
        let err = Resolver::new(&table, &registry).resolve().err().unwrap();
        assert!(matches!(err, RegistrationError::MissingAction { action, .. } if action == "archive"));
    }

    #[test]
    fn test_declaring_resource_twice_is_duplicate() {
        let mut table = RouteTable::new();
        table.all("messages").unwrap();
        table.all("messages").unwrap();

        let registry = registry();
        let err = Resolver::new(&table, &registry).resolve().err().unwrap();
        assert!(matches!(err, RegistrationError::DuplicateEndpoint(_)));
    }

    #[test]
    fn test_malformed_hook_aborts_resolution() {
        let mut table = RouteTable::new();
        table.get("/broken", "broken#index").unwrap();

        let registry = registry();
        let err = Resolver::new(&table, &registry).resolve().err().unwrap();
        assert!(matches!(err, RegistrationError::Hook(HookError::Malformed { .. })));
    }
}
