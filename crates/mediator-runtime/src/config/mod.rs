//! Configuration module for the mediator runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for handler discovery scope and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    HandlerLifetime, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, MediatorConfig,
    MediatorSection, SpanEventConfig,
};
pub use validation::validate_config;
