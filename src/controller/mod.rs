//! Controllers and their action/callback tables.
//!
//! # Data Flow
//! ```text
//! ControllerRegistry::register("messages", factory)
//!     → (at resolution) factory() → Arc<MessagesController>
//!     → Controller::actions / callbacks / hooks
//!     → BoundController: type-erased handlers closed over the instance
//!     → resolver binds handlers to endpoints
//! ```
//!
//! # Design Decisions
//! - Names map to factories explicitly; no reflection or naming lookups
//! - One instance per controller, shared by every request
//! - Actions are async and receive the request `Context` by value

pub mod context;
pub mod naming;
pub mod registry;

use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::hooks::{HookTable, Phase};

pub use context::{Context, RequestHead};
pub use registry::{BoundController, ControllerRegistry};

/// Type-erased action bound to a controller instance.
pub type ActionHandler = Arc<dyn Fn(Context) -> BoxFuture<'static, Response> + Send + Sync>;

/// Runs before the action; `Break` answers the request without it.
pub type BeforeFn = Arc<dyn Fn(&mut Context) -> ControlFlow<Response> + Send + Sync>;

/// Receives the outgoing response and returns it.
pub type AfterFn = Arc<dyn Fn(&RequestHead, Response) -> Response + Send + Sync>;

/// Observes the finished request.
pub type TeardownFn = Arc<dyn Fn(&RequestHead) + Send + Sync>;

/// A named callback bound to a controller instance.
#[derive(Clone)]
pub enum Callback {
    Before(BeforeFn),
    After(AfterFn),
    Teardown(TeardownFn),
}

impl Callback {
    pub fn phase(&self) -> Phase {
        match self {
            Callback::Before(_) => Phase::Before,
            Callback::After(_) => Phase::After,
            Callback::Teardown(_) => Phase::Teardown,
        }
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback::{:?}", self.phase())
    }
}

/// A controller: a named group of actions plus optional lifecycle hooks.
///
/// ```ignore
/// #[derive(Default)]
/// struct MessagesController;
///
/// impl MessagesController {
///     async fn index(self: Arc<Self>, _cx: Context) -> &'static str {
///         "messages"
///     }
/// }
///
/// impl Controller for MessagesController {
///     fn actions(actions: &mut Actions<Self>) {
///         actions.add("index", Self::index);
///     }
/// }
/// ```
pub trait Controller: Send + Sync + Sized + 'static {
    /// Register the routable actions.
    fn actions(actions: &mut Actions<Self>);

    /// Register callbacks that hook declarations refer to by name.
    fn callbacks(_callbacks: &mut Callbacks<Self>) {}

    /// Declare lifecycle hooks.
    fn hooks(_hooks: &mut HookTable) {}
}

type RawAction<C> = Arc<dyn Fn(Arc<C>, Context) -> BoxFuture<'static, Response> + Send + Sync>;

/// Action table of a controller type.
pub struct Actions<C> {
    handlers: Vec<(String, RawAction<C>)>,
}

impl<C: Send + Sync + 'static> Actions<C> {
    pub(crate) fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Register `handler` under `name`. A later registration of the same name wins.
    pub fn add<F, Fut, R>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(Arc<C>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let raw: RawAction<C> = Arc::new(move |controller: Arc<C>, cx: Context| -> BoxFuture<'static, Response> {
            let fut = handler(controller, cx);
            Box::pin(async move { fut.await.into_response() })
        });
        self.handlers.push((name.to_string(), raw));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn bind(self, instance: &Arc<C>) -> HashMap<String, ActionHandler> {
        self.handlers
            .into_iter()
            .map(|(name, raw)| {
                let instance = instance.clone();
                let handler: ActionHandler = Arc::new(move |cx| raw(instance.clone(), cx));
                (name, handler)
            })
            .collect()
    }
}

enum RawCallback<C> {
    Before(Arc<dyn Fn(&C, &mut Context) -> ControlFlow<Response> + Send + Sync>),
    After(Arc<dyn Fn(&C, &RequestHead, Response) -> Response + Send + Sync>),
    Teardown(Arc<dyn Fn(&C, &RequestHead) + Send + Sync>),
}

/// Named callbacks of a controller type.
pub struct Callbacks<C> {
    entries: Vec<(String, RawCallback<C>)>,
}

impl<C: Send + Sync + 'static> Callbacks<C> {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Callback usable by `before_*` hooks.
    pub fn before<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&C, &mut Context) -> ControlFlow<Response> + Send + Sync + 'static,
    {
        self.entries.push((name.to_string(), RawCallback::Before(Arc::new(f))));
        self
    }

    /// Callback usable by `after_*` hooks.
    pub fn after<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&C, &RequestHead, Response) -> Response + Send + Sync + 'static,
    {
        self.entries.push((name.to_string(), RawCallback::After(Arc::new(f))));
        self
    }

    /// Callback usable by `teardown_*` hooks.
    pub fn teardown<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&C, &RequestHead) + Send + Sync + 'static,
    {
        self.entries.push((name.to_string(), RawCallback::Teardown(Arc::new(f))));
        self
    }

    pub(crate) fn bind(self, instance: &Arc<C>) -> HashMap<String, Callback> {
        self.entries
            .into_iter()
            .map(|(name, raw)| {
                let c = instance.clone();
                let callback = match raw {
                    RawCallback::Before(f) => Callback::Before(Arc::new(move |cx: &mut Context| f(&c, cx))),
                    RawCallback::After(f) => {
                        Callback::After(Arc::new(move |head: &RequestHead, res: Response| f(&c, head, res)))
                    }
                    RawCallback::Teardown(f) => Callback::Teardown(Arc::new(move |head: &RequestHead| f(&c, head))),
                };
                (name, callback)
            })
            .collect()
    }
}
