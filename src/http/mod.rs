//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve)
//!     → method_override.rs (POST + _method → PUT/PATCH/DELETE, before routing)
//!     → request.rs (request ID), trace, timeout, body limit
//!     → axum Router (resolved endpoints)
//!     → form.rs (url-encoded and multipart bodies, shared with controllers)
//! ```

pub mod form;
pub mod method_override;
pub mod request;
pub mod server;

pub use form::{FormData, FormError, UploadedFile};
pub use method_override::{MethodOverride, MethodOverrideLayer};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
