//! Mediator Runtime - configuration and logging host for the mediator.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `MediatorConfig`)
//! - Logging setup over `tracing-subscriber` (`LoggingBuilder`)
//! - A configuration-driven host (`MediatorRuntime`)
//!
//! ```rust,ignore
//! use mediator_runtime::MediatorRuntime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = MediatorRuntime::builder().root(root_anchor!()).build()?;
//!     runtime.init_logging()?;
//!
//!     let mediator = runtime.configure(ServiceCollection::new(), [])?;
//!     mediator.notify(&Started).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, MediatorConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use runtime::{MediatorRuntime, RuntimeBuilder};

// Re-export tracing for use by handler crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Provides the common logging macros plus `Level` for span creation.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
