//! Compiled hook chains.
//!
//! # Responsibilities
//! - Resolve callback names in hook bindings against a controller
//! - Keep controller-level and application-wide hooks apart
//! - Run before / after / teardown hooks for an endpoint
//!
//! # Design Decisions
//! - Before hooks run in declaration order; after and teardown in reverse
//! - A scoped hook matches by endpoint name (`controller.action`)
//! - First-request hooks run exactly once per application

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Once;

use axum::response::Response;

use crate::controller::{AfterFn, BeforeFn, Callback, Context, RequestHead, TeardownFn};
use crate::hooks::{HookBinding, HookError, HookKind};
use crate::routing::Endpoint;

/// A callback plus the endpoints it is limited to.
#[derive(Clone)]
struct Hook<F> {
    callback: String,
    f: F,
    /// `None` fires for every endpoint.
    endpoints: Option<Vec<String>>,
}

impl<F> Hook<F> {
    fn applies(&self, endpoint: &Endpoint) -> bool {
        match &self.endpoints {
            None => true,
            Some(endpoints) => {
                let endpoint = endpoint.to_string();
                endpoints.iter().any(|e| *e == endpoint)
            }
        }
    }
}

/// Before, after and teardown hooks at one level (controller or app).
#[derive(Clone, Default)]
pub struct HookSet {
    before: Vec<Hook<BeforeFn>>,
    after: Vec<Hook<AfterFn>>,
    teardown: Vec<Hook<TeardownFn>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty() && self.teardown.is_empty()
    }

    pub fn before_request(&self, cx: &mut Context) -> ControlFlow<Response> {
        for hook in &self.before {
            if hook.applies(cx.endpoint()) {
                (hook.f)(cx)?;
            }
        }
        ControlFlow::Continue(())
    }

    pub fn after_request(&self, head: &RequestHead, response: Response) -> Response {
        self.after
            .iter()
            .rev()
            .filter(|hook| hook.applies(&head.endpoint))
            .fold(response, |response, hook| (hook.f)(head, response))
    }

    pub fn teardown_request(&self, head: &RequestHead) {
        for hook in self.teardown.iter().rev() {
            if hook.applies(&head.endpoint) {
                (hook.f)(head);
            }
        }
    }

    fn push(&mut self, callback: &str, f: &Callback, endpoints: Option<Vec<String>>) {
        let callback = callback.to_string();
        match f {
            Callback::Before(f) => self.before.push(Hook { callback, f: f.clone(), endpoints }),
            Callback::After(f) => self.after.push(Hook { callback, f: f.clone(), endpoints }),
            Callback::Teardown(f) => self.teardown.push(Hook { callback, f: f.clone(), endpoints }),
        }
    }
}

/// Hooks contributed by `*_app_*` declarations of any controller.
pub struct AppHooks {
    hooks: HookSet,
    first_request: Vec<Hook<BeforeFn>>,
    started: Once,
}

impl AppHooks {
    pub fn new() -> Self {
        Self {
            hooks: HookSet::new(),
            first_request: Vec::new(),
            started: Once::new(),
        }
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Run first-request hooks (once) and then app-wide before hooks.
    pub fn before_request(&self, cx: &mut Context) -> ControlFlow<Response> {
        if !self.first_request.is_empty() {
            self.started.call_once(|| {
                for hook in &self.first_request {
                    tracing::debug!(callback = %hook.callback, "Running first-request hook");
                    // The first request is not answered by these hooks.
                    if let ControlFlow::Break(response) = (hook.f)(cx) {
                        tracing::debug!(
                            callback = %hook.callback,
                            status = %response.status(),
                            "First-request hook response ignored"
                        );
                    }
                }
            });
        }
        self.hooks.before_request(cx)
    }

    pub fn after_request(&self, head: &RequestHead, response: Response) -> Response {
        self.hooks.after_request(head, response)
    }

    pub fn teardown_request(&self, head: &RequestHead) {
        self.hooks.teardown_request(head)
    }
}

impl Default for AppHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind `bindings` declared by `controller` onto the controller and app hook sets.
pub fn compile(
    controller: &str,
    bindings: &[(HookKind, HookBinding)],
    callbacks: &HashMap<String, Callback>,
    own: &mut HookSet,
    app: &mut AppHooks,
) -> Result<(), HookError> {
    for (kind, binding) in bindings {
        let (names, endpoints) = match binding {
            HookBinding::Global(names) => (names.clone(), None),
            HookBinding::Scoped { callback, actions } => {
                let endpoints = actions
                    .iter()
                    .map(|action| Endpoint::new(controller, action.as_str()).to_string())
                    .collect();
                (vec![callback.clone()], Some(endpoints))
            }
        };

        for name in &names {
            let callback = lookup(controller, name, *kind, callbacks)?;
            tracing::debug!(controller = %controller, hook = %kind, callback = %name, "Hook bound");

            match kind {
                HookKind::BeforeAppFirstRequest => {
                    if let Callback::Before(f) = callback {
                        app.first_request.push(Hook {
                            callback: name.clone(),
                            f: f.clone(),
                            endpoints: None,
                        });
                    }
                }
                kind if kind.is_app_wide() => app.hooks.push(name, callback, endpoints.clone()),
                _ => own.push(name, callback, endpoints.clone()),
            }
        }
    }
    Ok(())
}

fn lookup<'a>(
    controller: &str,
    name: &str,
    kind: HookKind,
    callbacks: &'a HashMap<String, Callback>,
) -> Result<&'a Callback, HookError> {
    let callback = callbacks.get(name).ok_or_else(|| HookError::UnknownCallback {
        controller: controller.to_string(),
        callback: name.to_string(),
    })?;

    if callback.phase() != kind.phase() {
        return Err(HookError::CallbackMismatch {
            controller: controller.to_string(),
            callback: name.to_string(),
            hook: kind,
        });
    }
    Ok(callback)
}
