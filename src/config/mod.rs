//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → read once by main / HttpServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table is too, so there is
//!   nothing to reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, LimitsConfig, ListenerConfig, MethodOverrideConfig, ObservabilityConfig, RoutesConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
