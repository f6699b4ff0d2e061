//! Per-controller endpoint group.
//!
//! # Responsibilities
//! - Hold the endpoints bound for one controller and its hook set
//! - Translate `<id>` path templates into router captures
//! - Reject duplicate endpoint names within the controller
//!
//! # Design Decisions
//! - Named after the controller; one blueprint per controller
//! - Method filters are computed here so registration fails before serving

use std::fmt;

use axum::routing::MethodFilter;

use crate::controller::ActionHandler;
use crate::hooks::HookSet;
use crate::resolver::RegistrationError;
use crate::routing::{Endpoint, MethodSet, Route};

/// An action bound to a path and method set.
#[derive(Clone)]
pub struct BoundEndpoint {
    endpoint: Endpoint,
    rule: String,
    path: String,
    params: Vec<String>,
    methods: MethodSet,
    filter: MethodFilter,
    handler: ActionHandler,
}

impl BoundEndpoint {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Path as declared, e.g. `/messages/<id>`.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Path as mounted on the router, e.g. `/messages/{id}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub(crate) fn filter(&self) -> MethodFilter {
        self.filter
    }

    pub(crate) fn handler(&self) -> ActionHandler {
        self.handler.clone()
    }
}

impl fmt::Debug for BoundEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEndpoint")
            .field("endpoint", &self.endpoint.to_string())
            .field("rule", &self.rule)
            .field("methods", &self.methods.to_string())
            .finish()
    }
}

/// Endpoints and hooks of one controller.
pub struct Blueprint {
    name: String,
    endpoints: Vec<BoundEndpoint>,
    hooks: HookSet,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, hooks: HookSet) -> Self {
        Self {
            name: name.into(),
            endpoints: Vec::new(),
            hooks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoints(&self) -> &[BoundEndpoint] {
        &self.endpoints
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<BoundEndpoint>, HookSet) {
        (self.endpoints, self.hooks)
    }

    /// Bind `handler` to `route`.
    pub fn add_endpoint(&mut self, route: &Route, handler: ActionHandler) -> Result<(), RegistrationError> {
        let endpoint = route.endpoint();
        if self.endpoints.iter().any(|e| e.endpoint == endpoint) {
            return Err(RegistrationError::DuplicateEndpoint(endpoint.to_string()));
        }

        let (path, params) = router_path(route.path()).map_err(|reason| RegistrationError::InvalidPath {
            path: route.path().to_string(),
            endpoint: endpoint.to_string(),
            reason,
        })?;

        let mut filter: Option<MethodFilter> = None;
        for method in route.methods().iter() {
            let next = MethodFilter::try_from(method.clone()).map_err(|_| RegistrationError::UnsupportedMethod {
                method: method.to_string(),
                endpoint: endpoint.to_string(),
            })?;
            filter = Some(match filter {
                Some(filter) => filter.or(next),
                None => next,
            });
        }
        let filter = filter.ok_or_else(|| RegistrationError::UnsupportedMethod {
            method: String::new(),
            endpoint: endpoint.to_string(),
        })?;

        self.endpoints.push(BoundEndpoint {
            endpoint,
            rule: route.path().to_string(),
            path,
            params,
            methods: route.methods().clone(),
            filter,
            handler,
        });
        Ok(())
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Convert `<name>` / `<converter:name>` segments to `{name}` captures.
///
/// Returns the router path and the parameter names in order.
pub fn router_path(rule: &str) -> Result<(String, Vec<String>), String> {
    if !rule.starts_with('/') {
        return Err("path must start with '/'".to_string());
    }
    for segment in rule.split('/') {
        if segment.starts_with([':', '*']) {
            return Err(format!("segment `{}` must not start with ':' or '*'", segment));
        }
        if segment.matches('<').count() > 1 {
            return Err(format!("segment `{}` has more than one parameter", segment));
        }
    }

    let mut path = String::with_capacity(rule.len());
    let mut params = Vec::new();
    let mut rest = rule;

    while let Some(open) = rest.find(['<', '>', '{', '}']) {
        let (literal, tail) = rest.split_at(open);
        path.push_str(literal);

        if !tail.starts_with('<') {
            return Err(format!("unexpected '{}'", &tail[..1]));
        }
        let close = tail.find('>').ok_or_else(|| "unclosed '<'".to_string())?;
        let inner = &tail[1..close];
        let name = inner.rsplit(':').next().unwrap_or(inner);

        let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(format!("invalid parameter `{}`", inner));
        }
        if params.iter().any(|p| p == name) {
            return Err(format!("parameter `{}` appears twice", name));
        }

        path.push('{');
        path.push_str(name);
        path.push('}');
        params.push(name.to_string());
        rest = &tail[close + 1..];
    }
    path.push_str(rest);

    Ok((path, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Context;
    use crate::routing::Verb;
    use axum::response::{IntoResponse, Response};
    use futures_util::future::BoxFuture;
    use std::sync::Arc;

    fn handler() -> ActionHandler {
        Arc::new(|_cx: Context| -> BoxFuture<'static, Response> { Box::pin(async { "ok".into_response() }) })
    }

    #[test]
    fn test_router_path() {
        assert_eq!(router_path("/messages").unwrap(), ("/messages".to_string(), vec![]));
        assert_eq!(
            router_path("/messages/<id>/edit").unwrap(),
            ("/messages/{id}/edit".to_string(), vec!["id".to_string()])
        );
        assert_eq!(
            router_path("/users/<int:user_id>/posts/<slug>").unwrap(),
            (
                "/users/{user_id}/posts/{slug}".to_string(),
                vec!["user_id".to_string(), "slug".to_string()]
            )
        );
    }

    #[test]
    fn test_router_path_rejects_bad_templates() {
        assert!(router_path("messages").is_err());
        assert!(router_path("/messages/<id").is_err());
        assert!(router_path("/messages/<>").is_err());
        assert!(router_path("/messages/{id}").is_err());
        assert!(router_path("/a/<id>/b/<id>").is_err());
    }

    #[test]
    fn test_router_path_rejects_shapes_the_router_refuses() {
        assert!(router_path("/posts/:id").is_err());
        assert!(router_path("/files/*rest").is_err());
        assert!(router_path("/posts/<a>-<b>").is_err());
        assert!(router_path("/posts/<a>/<b>").is_ok());
    }

    #[test]
    fn test_colon_segment_fails_registration() {
        let route = Route::declare(Verb::Get, "/posts/:id", "posts#show").unwrap();
        let mut blueprint = Blueprint::new("posts", HookSet::new());
        let err = blueprint.add_endpoint(&route, handler()).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPath { reason, .. } if reason.contains("':'")));
    }

    #[test]
    fn test_update_filter_covers_put_and_patch() {
        let route = Route::declare(Verb::Put, "/messages/<id>", "messages#update").unwrap();
        let mut blueprint = Blueprint::new("messages", HookSet::new());
        blueprint.add_endpoint(&route, handler()).unwrap();

        let bound = &blueprint.endpoints()[0];
        assert_eq!(bound.path(), "/messages/{id}");
        assert_eq!(bound.rule(), "/messages/<id>");
        assert_eq!(bound.methods().to_string(), "PUT,PATCH");
    }

    #[test]
    fn test_duplicate_endpoint_rejected() {
        let route = Route::declare(Verb::Get, "/messages", "messages#index").unwrap();
        let other = Route::declare(Verb::Get, "/all-messages", "messages#index").unwrap();
        let mut blueprint = Blueprint::new("messages", HookSet::new());
        blueprint.add_endpoint(&route, handler()).unwrap();

        let err = blueprint.add_endpoint(&other, handler()).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateEndpoint("messages.index".into()));
    }

    #[test]
    fn test_relative_path_rejected() {
        let route = Route::declare(Verb::Get, "messages", "messages#index").unwrap();
        let mut blueprint = Blueprint::new("messages", HookSet::new());
        let err = blueprint.add_endpoint(&route, handler()).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPath { .. }));
    }
}
