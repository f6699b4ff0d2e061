//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Application bootstrap
//!     → Routes::get / post / put / delete / all / namespace
//!     → route.rs (parse "controller#action", expand verbs)
//!     → table.rs (RouteTable, insertion order)
//!
//! Route manifest (optional, at startup):
//!     JSON file → manifest.rs → Route[] → RouteTable
//!
//! Resolution:
//!     RouteTable::grouped() → resolver
//! ```
//!
//! # Design Decisions
//! - Routes declared at startup, immutable once resolved
//! - Declaration errors surface immediately, not at first request
//! - Namespaces are views over a table, never separate tables

pub mod manifest;
pub mod namespace;
pub mod route;
pub mod table;

pub use namespace::Namespace;
pub use route::{Endpoint, MethodSet, ResourceAction, Route, RouteError, Verb};
pub use table::{ControllerGroups, ControllerRoutes, Only, RouteTable, Routes};
