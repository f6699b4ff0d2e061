//! Convention-based MVC routing for axum.
//!
//! # Architecture Overview
//!
//! ```text
//!   Bootstrap (once)                                 Per request
//!   ────────────────                                 ───────────
//!   routing::RouteTable  ◀── get/post/put/delete     http::server (axum::serve)
//!        │                   all / namespace              │
//!        │                   manifest (JSON)              ▼
//!        ▼                                           method_override
//!   resolver::Resolver ◀── controller::Registry          │  POST + _method
//!        │                  (name → factory)              ▼
//!        │  hooks::chain (compile hook tables)       axum Router
//!        ▼                                                │
//!   resolver::Application ── into_router() ─────────▶ endpoint pipeline
//!                                                    app hooks → controller hooks
//!                                                    → action → after → teardown
//! ```
//!
//! Routes are declared on an explicit [`RouteTable`], bound to controllers
//! registered by name in a [`ControllerRegistry`], and resolved once at
//! startup into an [`Application`]. Every error is reported before the
//! server accepts traffic.

// Declaration and resolution
pub mod controller;
pub mod hooks;
pub mod resolver;
pub mod routing;

// Serving
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod helpers;
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use config::AppConfig;
pub use controller::{Actions, Callbacks, Context, Controller, ControllerRegistry, RequestHead};
pub use helpers::{hidden_method, SafeHtml};
pub use hooks::{HookSpec, HookTable};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolver::{Application, RegistrationError, Resolver};
pub use routing::{Namespace, Only, RouteTable, Routes};
