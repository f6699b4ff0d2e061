//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver / endpoints / method override produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (request counters, latency histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID attached by the HTTP layer, visible in every request span
//! - Metrics are cheap (atomic increments) and labelled by endpoint
//! - The exporter is opt-in; recording without it is a no-op

pub mod logging;
pub mod metrics;
