//! Per-endpoint request pipeline.
//!
//! # Responsibilities
//! - Build the request `Context` from the routed request
//! - Run app-wide and controller hooks around the action
//! - Record request metrics
//!
//! # Design Decisions
//! - A before hook answering with `Break` skips the action, but after and
//!   teardown hooks still see that response
//! - Teardown runs for every request that reached the endpoint

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Request},
    response::Response,
    routing::{on, MethodFilter, MethodRouter},
};

use crate::controller::{ActionHandler, Context};
use crate::hooks::{AppHooks, HookSet};
use crate::observability::metrics;
use crate::routing::Endpoint;

pub(crate) struct EndpointService {
    endpoint: Endpoint,
    label: String,
    handler: ActionHandler,
    hooks: Arc<HookSet>,
    app_hooks: Arc<AppHooks>,
    body_limit: usize,
}

impl EndpointService {
    pub(crate) fn new(
        endpoint: Endpoint,
        handler: ActionHandler,
        hooks: Arc<HookSet>,
        app_hooks: Arc<AppHooks>,
        body_limit: usize,
    ) -> Self {
        Self {
            label: endpoint.to_string(),
            endpoint,
            handler,
            hooks,
            app_hooks,
            body_limit,
        }
    }

    pub(crate) async fn call(self: Arc<Self>, params: HashMap<String, String>, request: Request) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();

        let mut cx = match Context::from_request(self.endpoint.clone(), params, request, self.body_limit).await {
            Ok(cx) => cx,
            Err(response) => {
                metrics::record_request(&self.label, &method, response.status().as_u16(), start);
                return response;
            }
        };
        let head = cx.head().clone();

        let flow = match self.app_hooks.before_request(&mut cx) {
            ControlFlow::Continue(()) => self.hooks.before_request(&mut cx),
            brk => brk,
        };

        let response = match flow {
            ControlFlow::Continue(()) => (self.handler)(cx).await,
            ControlFlow::Break(response) => {
                tracing::debug!(endpoint = %self.label, status = %response.status(), "Before hook answered request");
                metrics::record_short_circuit(&self.label);
                response
            }
        };

        let response = self.hooks.after_request(&head, response);
        let response = self.app_hooks.after_request(&head, response);

        self.hooks.teardown_request(&head);
        self.app_hooks.teardown_request(&head);

        tracing::debug!(
            endpoint = %self.label,
            method = %method,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );
        metrics::record_request(&self.label, &method, response.status().as_u16(), start);
        response
    }
}

/// Method router dispatching `filter` to `service`.
pub(crate) fn method_router(service: Arc<EndpointService>, filter: MethodFilter, has_params: bool) -> MethodRouter {
    if has_params {
        on(
            filter,
            move |Path(params): Path<HashMap<String, String>>, request: Request| async move {
                service.call(params, request).await
            },
        )
    } else {
        on(filter, move |request: Request| async move {
            service.call(HashMap::new(), request).await
        })
    }
}
