//! Runtime error types.

use mediator_core::ConfigurationError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::config::ConfigError;

/// Errors raised while hosting the mediator.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Loading or validating configuration failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Handler registration was rejected.
    #[error("Mediator setup failed: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A global subscriber was already installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] TryInitError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
