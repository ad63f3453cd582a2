//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use mediator_core::Lifetime;
use mediator_framework::{MediatorOptions, RootAnchor};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediatorConfig {
    /// Handler discovery settings.
    #[serde(default)]
    pub mediator: MediatorSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Mediator Section
// =============================================================================

/// Handler discovery settings.
///
/// ```toml
/// [mediator]
/// root_crate = "order_service"
/// referenced_crates = ["billing", "shipping"]
/// handler_lifetime = "transient"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediatorSection {
    /// Crate whose linked handlers are always in scope.
    #[serde(default)]
    pub root_crate: Option<String>,

    /// Additional crates whose linked handlers are in scope.
    #[serde(default)]
    pub referenced_crates: Vec<String>,

    /// Lifetime of handler registrations.
    #[serde(default)]
    pub handler_lifetime: HandlerLifetime,

    /// Whether the link-time handler table is consulted.
    #[serde(default = "default_linked_handlers")]
    pub linked_handlers: bool,
}

impl Default for MediatorSection {
    fn default() -> Self {
        Self {
            root_crate: None,
            referenced_crates: Vec::new(),
            handler_lifetime: HandlerLifetime::default(),
            linked_handlers: default_linked_handlers(),
        }
    }
}

fn default_linked_handlers() -> bool {
    true
}

impl MediatorSection {
    /// Converts to registration options. A missing `root_crate` leaves the
    /// root anchor unset.
    pub fn to_options(&self) -> MediatorOptions {
        let mut options = MediatorOptions::new().lifetime(self.handler_lifetime.into());
        if let Some(root) = &self.root_crate {
            options = options.root(RootAnchor::named(root.as_str()));
        }
        for referenced in &self.referenced_crates {
            options = options.reference(referenced.as_str());
        }
        if !self.linked_handlers {
            options = options.without_linked_handlers();
        }
        options
    }
}

/// Serializable handler lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerLifetime {
    /// A new handler instance per resolution.
    #[default]
    Transient,
    /// One shared handler instance.
    Singleton,
}

impl From<HandlerLifetime> for Lifetime {
    fn from(lifetime: HandlerLifetime) -> Self {
        match lifetime {
            HandlerLifetime::Transient => Lifetime::Transient,
            HandlerLifetime::Singleton => Lifetime::Singleton,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging settings.
///
/// ```toml
/// [logging]
/// level = "debug"
/// format = "pretty"
///
/// [logging.filters]
/// mediator_framework = "trace"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, for `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// How often the log file rotates.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Maximum number of rotated log files kept.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    /// Per-module level overrides.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            filters: BTreeMap::new(),
        }
    }
}

fn default_max_files() -> u32 {
    5
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowercase level name, as used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Minutely,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}
