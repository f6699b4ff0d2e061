//! The resolved application.
//!
//! # Responsibilities
//! - Own every blueprint plus the application-wide hooks
//! - Detect path/method collisions before the router is built
//! - Reverse-route endpoints to URLs (`url_for`)
//! - Assemble the axum `Router`
//!
//! # Design Decisions
//! - Immutable once built; `into_router` consumes it
//! - Path parameters at the same position must share a name, since the
//!   router would otherwise refuse the second route

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::{http::Method, Router};

use crate::hooks::AppHooks;
use crate::resolver::blueprint::{Blueprint, BoundEndpoint};
use crate::resolver::endpoint::{self, EndpointService};
use crate::resolver::RegistrationError;

/// Blueprints and app-wide hooks, ready to serve.
pub struct Application {
    blueprints: Vec<Blueprint>,
    app_hooks: AppHooks,
    claimed: HashMap<(String, Method), String>,
    captures: HashMap<String, String>,
    body_limit: usize,
}

impl Application {
    pub fn new(body_limit: usize) -> Self {
        Self {
            blueprints: Vec::new(),
            app_hooks: AppHooks::new(),
            claimed: HashMap::new(),
            captures: HashMap::new(),
            body_limit,
        }
    }

    pub fn app_hooks(&self) -> &AppHooks {
        &self.app_hooks
    }

    pub fn app_hooks_mut(&mut self) -> &mut AppHooks {
        &mut self.app_hooks
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Add a blueprint, rejecting duplicate names and colliding routes.
    pub fn register_blueprint(&mut self, blueprint: Blueprint) -> Result<(), RegistrationError> {
        if self.blueprint(blueprint.name()).is_some() {
            return Err(RegistrationError::DuplicateBlueprint(blueprint.name().to_string()));
        }

        let mut claimed = self.claimed.clone();
        let mut captures = self.captures.clone();
        for bound in blueprint.endpoints() {
            let name = bound.endpoint().to_string();
            claim_captures(&mut captures, bound)?;

            for method in bound.methods().iter() {
                let key = (bound.path().to_string(), method.clone());
                if let Some(existing) = claimed.get(&key) {
                    return Err(RegistrationError::RouteConflict {
                        method: method.to_string(),
                        path: bound.rule().to_string(),
                        existing: existing.clone(),
                        endpoint: name,
                    });
                }
                claimed.insert(key, name.clone());
            }
        }

        self.claimed = claimed;
        self.captures = captures;
        self.blueprints.push(blueprint);
        Ok(())
    }

    pub fn blueprint(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|b| b.name() == name)
    }

    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    /// Every bound endpoint, in registration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &BoundEndpoint> {
        self.blueprints.iter().flat_map(|b| b.endpoints().iter())
    }

    /// URL for `endpoint` (`controller.action`).
    ///
    /// Path parameters are filled from `params`; leftovers become the query
    /// string. `None` when the endpoint is unknown or a parameter is missing.
    pub fn url_for(&self, endpoint: &str, params: &[(&str, &str)]) -> Option<String> {
        let bound = self.endpoints().find(|e| e.endpoint().to_string() == endpoint)?;

        let mut url = bound.path().to_string();
        for name in bound.params() {
            let (_, value) = params.iter().find(|(key, _)| key == name)?;
            url = url.replace(&format!("{{{}}}", name), value);
        }

        let extra: Vec<_> = params
            .iter()
            .filter(|(key, _)| !bound.params().iter().any(|p| p == key))
            .collect();
        if !extra.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(extra.iter().map(|(k, v)| (*k, *v)))
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        Some(url)
    }

    /// Mount every endpoint on a fresh router.
    pub fn into_router(self) -> Router {
        let app_hooks = Arc::new(self.app_hooks);
        let mut router = Router::new();

        for blueprint in self.blueprints {
            let (endpoints, hooks) = blueprint.into_parts();
            let hooks = Arc::new(hooks);

            for bound in endpoints {
                let service = Arc::new(EndpointService::new(
                    bound.endpoint().clone(),
                    bound.handler(),
                    hooks.clone(),
                    app_hooks.clone(),
                    self.body_limit,
                ));
                let methods = endpoint::method_router(service, bound.filter(), !bound.params().is_empty());
                router = router.route(bound.path(), methods);
            }
        }

        router
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("blueprints", &self.blueprints)
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

/// Record parameter names by position; a differing name at a shared
/// position is a conflict.
fn claim_captures(captures: &mut HashMap<String, String>, bound: &BoundEndpoint) -> Result<(), RegistrationError> {
    let mut prefix = String::new();
    for segment in bound.path().split('/').skip(1) {
        prefix.push('/');
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                if let Some(existing) = captures.get(&prefix) {
                    if existing != name {
                        return Err(RegistrationError::InvalidPath {
                            path: bound.rule().to_string(),
                            endpoint: bound.endpoint().to_string(),
                            reason: format!("parameter `{}` conflicts with `{}` at the same position", name, existing),
                        });
                    }
                } else {
                    captures.insert(prefix.clone(), name.to_string());
                }
                prefix.push_str("{}");
            }
            None => prefix.push_str(segment),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ActionHandler, Context};
    use crate::hooks::HookSet;
    use crate::routing::{Route, Verb};
    use axum::response::{IntoResponse, Response};
    use futures_util::future::BoxFuture;

    fn handler() -> ActionHandler {
        Arc::new(|_cx: Context| -> BoxFuture<'static, Response> { Box::pin(async { "ok".into_response() }) })
    }

    fn blueprint(name: &str, routes: &[(Verb, &str, &str)]) -> Blueprint {
        let mut blueprint = Blueprint::new(name, HookSet::new());
        for (verb, path, resource) in routes {
            let route = Route::declare(*verb, *path, resource).unwrap();
            blueprint.add_endpoint(&route, handler()).unwrap();
        }
        blueprint
    }

    #[test]
    fn test_url_for() {
        let mut app = Application::new(1024);
        app.register_blueprint(blueprint(
            "messages",
            &[
                (Verb::Get, "/messages", "messages#index"),
                (Verb::Get, "/messages/<id>/edit", "messages#edit"),
            ],
        ))
        .unwrap();

        assert_eq!(app.url_for("messages.index", &[]).as_deref(), Some("/messages"));
        assert_eq!(
            app.url_for("messages.edit", &[("id", "42")]).as_deref(),
            Some("/messages/42/edit")
        );
        assert_eq!(
            app.url_for("messages.index", &[("page", "2")]).as_deref(),
            Some("/messages?page=2")
        );
        assert_eq!(app.url_for("messages.edit", &[]), None);
        assert_eq!(app.url_for("messages.show", &[("id", "1")]), None);
    }

    #[test]
    fn test_route_conflict_across_blueprints() {
        let mut app = Application::new(1024);
        app.register_blueprint(blueprint("home", &[(Verb::Get, "/", "home#index")]))
            .unwrap();

        let err = app
            .register_blueprint(blueprint("landing", &[(Verb::Get, "/", "landing#index")]))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::RouteConflict {
                method: "GET".into(),
                path: "/".into(),
                existing: "home.index".into(),
                endpoint: "landing.index".into(),
            }
        );
        assert!(app.blueprint("landing").is_none());
    }

    #[test]
    fn test_same_path_different_methods_is_fine() {
        let mut app = Application::new(1024);
        app.register_blueprint(blueprint(
            "messages",
            &[
                (Verb::Get, "/messages/<id>", "messages#show"),
                (Verb::Put, "/messages/<id>", "messages#update"),
                (Verb::Delete, "/messages/<id>", "messages#delete"),
            ],
        ))
        .unwrap();
        assert_eq!(app.endpoints().count(), 3);
    }

    #[test]
    fn test_mismatched_capture_names_rejected() {
        let mut app = Application::new(1024);
        app.register_blueprint(blueprint("posts", &[(Verb::Get, "/posts/<id>", "posts#show")]))
            .unwrap();

        let err = app
            .register_blueprint(blueprint("drafts", &[(Verb::Delete, "/posts/<post_id>", "drafts#delete")]))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPath { .. }));
    }

    #[test]
    fn test_duplicate_blueprint_rejected() {
        let mut app = Application::new(1024);
        app.register_blueprint(blueprint("home", &[(Verb::Get, "/", "home#index")]))
            .unwrap();
        let err = app
            .register_blueprint(blueprint("home", &[(Verb::Get, "/home", "home#index")]))
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateBlueprint("home".into()));
    }
}
