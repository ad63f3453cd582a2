//! Initialization entry point.

use mediator_core::{ConfigurationResult, ServiceCollection};

use crate::builder::MediatorBuilder;
use crate::options::MediatorOptions;

/// Discovers handlers and registers them, together with the
/// [`Mediator`](crate::Mediator), into `services`.
///
/// Runs [`MediatorBuilder`] end to end: create, fetch candidates, scan for
/// implementations and build. Calling it twice on the same collection is not
/// supported.
///
/// ```rust,ignore
/// let mut services = ServiceCollection::new();
/// add_mediator(&mut services, MediatorOptions::new().root(RootAnchor::of::<App>()))?;
/// let provider = services.build_provider();
/// let mediator = provider.get::<Mediator>().unwrap();
/// ```
pub fn add_mediator(
    services: &mut ServiceCollection,
    options: MediatorOptions,
) -> ConfigurationResult<()> {
    MediatorBuilder::create(options, services)?
        .fetch_candidates()
        .scan_for_implementations()
        .build();
    Ok(())
}

/// Method-call form of [`add_mediator`].
pub trait ServiceCollectionExt {
    /// See [`add_mediator`].
    fn add_mediator(&mut self, options: MediatorOptions) -> ConfigurationResult<&mut Self>;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_mediator(&mut self, options: MediatorOptions) -> ConfigurationResult<&mut Self> {
        add_mediator(self, options)?;
        Ok(self)
    }
}
