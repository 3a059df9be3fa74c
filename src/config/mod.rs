//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML or directive blocks)
//!     → loader.rs (read & pick format)
//!     → directive.rs (tokenize & parse directive blocks)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → routes compiled once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde, parser) from semantic checks

pub mod directive;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AwsSettings;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
