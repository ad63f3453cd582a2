//! Configuration-driven host for the mediator.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mediator_runtime::MediatorRuntime;
//!
//! // Loads mediator.toml from the current directory plus MEDIATOR_* env vars
//! let runtime = MediatorRuntime::builder().build()?;
//! runtime.init_logging();
//!
//! let mediator = runtime.configure(ServiceCollection::new(), [])?;
//! mediator.send_command(PlaceOrder { id: 7 }).await?;
//! ```

use std::path::Path;

use mediator_core::{CandidateType, ServiceCollection};
use mediator_framework::{Mediator, MediatorOptions, RootAnchor, add_mediator};
use tracing::{debug, info};

use crate::config::{ConfigLoader, MediatorConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging::LoggingBuilder;

/// Validated configuration plus the registration entry points built on it.
///
/// ```rust,ignore
/// let runtime = MediatorRuntime::new(config)?.with_root(root_anchor!());
///
/// let mut services = ServiceCollection::new();
/// services.add_instance(Database::connect()?);
/// let mediator = runtime.configure(services, [])?;
/// ```
#[derive(Debug, Clone)]
pub struct MediatorRuntime {
    config: MediatorConfig,
    root: Option<RootAnchor>,
}

impl MediatorRuntime {
    /// Creates a runtime from a configuration, validating it first.
    pub fn new(config: MediatorConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        Ok(Self { config, root: None })
    }

    /// Creates a runtime builder loading configuration from files and env.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from a prepared [`ConfigLoader`].
    pub fn from_loader(loader: ConfigLoader) -> RuntimeResult<Self> {
        Self::new(loader.load()?)
    }

    /// The configuration this runtime was created with.
    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    /// Overrides `mediator.root_crate` with an anchor from code.
    pub fn with_root(mut self, anchor: RootAnchor) -> Self {
        self.root = Some(anchor);
        self
    }

    /// Installs the global subscriber described by `[logging]`.
    pub fn init_logging(&self) -> RuntimeResult<()> {
        LoggingBuilder::from_config(&self.config.logging).try_init()?;
        debug!(level = %self.config.logging.level, "Logging initialized");
        Ok(())
    }

    /// Registration options from the configuration and root override.
    pub fn options(&self) -> MediatorOptions {
        let options = self.config.mediator.to_options();
        match &self.root {
            Some(anchor) => options.root(anchor.clone()),
            None => options,
        }
    }

    /// Registers handlers and the [`Mediator`] into `services`.
    ///
    /// `candidates` are registered ahead of linked handlers.
    pub fn register<I>(
        &self,
        services: &mut ServiceCollection,
        candidates: I,
    ) -> RuntimeResult<()>
    where
        I: IntoIterator<Item = CandidateType>,
    {
        let options = self.options().candidates(candidates);
        let root = options
            .root_anchor()
            .map(|anchor| anchor.crate_name().to_string());

        let before = services.len();
        add_mediator(services, options)?;

        info!(
            root = root.as_deref().unwrap_or_default(),
            registrations = services.len() - before,
            "Mediator configured"
        );
        Ok(())
    }

    /// Registers into `services`, builds the provider and returns the
    /// mediator resolving from it.
    pub fn configure<I>(
        &self,
        mut services: ServiceCollection,
        candidates: I,
    ) -> RuntimeResult<Mediator>
    where
        I: IntoIterator<Item = CandidateType>,
    {
        self.register(&mut services, candidates)?;
        Ok(Mediator::new(services.build_provider()))
    }
}

// =============================================================================
// Runtime Builder
// =============================================================================

/// Builder for [`MediatorRuntime`] over a [`ConfigLoader`].
///
/// ```rust,ignore
/// let runtime = MediatorRuntime::builder()
///     .config_file("config/mediator.toml")
///     .profile("production")
///     .root(root_anchor!())
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    root: Option<RootAnchor>,
}

impl RuntimeBuilder {
    /// Creates a builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            root: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Also searches the user config directory.
    pub fn with_user_config_dir(mut self) -> Self {
        self.config_loader = self.config_loader.with_user_config_dir();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: MediatorConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Sets the root anchor, taking precedence over `mediator.root_crate`.
    pub fn root(mut self, anchor: RootAnchor) -> Self {
        self.root = Some(anchor);
        self
    }

    /// Loads configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<MediatorRuntime> {
        let runtime = MediatorRuntime::from_loader(self.config_loader)?;
        Ok(match self.root {
            Some(anchor) => runtime.with_root(anchor),
            None => runtime,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
