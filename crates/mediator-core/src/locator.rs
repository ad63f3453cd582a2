//! Minimal service locator the mediator resolves handlers through.
//!
//! Registration happens on a mutable [`ServiceCollection`] during startup.
//! Once [`ServiceCollection::build_provider`] is called the registrations are
//! frozen into a [`ServiceProvider`], which is cheap to clone and safe to
//! share between any number of concurrent callers.
//!
//! Services are stored type-erased. A value registered under key `T` is kept
//! as an `Arc<T>` boxed into [`ServiceArc`]; [`ServiceProvider::get`] downcasts
//! it back. For handler contracts `T` is the trait object, e.g.
//! `dyn EventSubscriber<OrderPlaced>`.
//!
//! ```rust,ignore
//! let mut services = ServiceCollection::new();
//! services.add_singleton(|_| Clock::system());
//! services.add_transient(|p| Billing::new(p.get::<Clock>().unwrap()));
//!
//! let provider = services.build_provider();
//! let billing: Arc<Billing> = provider.get::<Billing>().unwrap();
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::key::ServiceKey;

/// A type-erased service instance. The inner value is always an `Arc<T>`
/// for the key `T` it was registered under.
pub type ServiceArc = Arc<dyn Any + Send + Sync>;

/// A factory producing one erased service instance.
pub type ServiceFactory = Arc<dyn Fn(&ServiceProvider) -> ServiceArc + Send + Sync>;

/// How long a resolved instance lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifetime {
    /// A new instance per resolution.
    #[default]
    Transient,
    /// One instance, created on first resolution and reused afterwards.
    Singleton,
}

struct Registration {
    implementation: &'static str,
    lifetime: Lifetime,
    factory: ServiceFactory,
    instance: Mutex<Option<ServiceArc>>,
}

impl Registration {
    /// Singletons are built with the slot unlocked, so a factory may resolve
    /// other services, or its own key, without blocking. When two builds race
    /// the first one published is kept and the other is dropped. A factory
    /// that unconditionally resolves its own key recurses without end.
    fn instantiate(&self, provider: &ServiceProvider) -> ServiceArc {
        match self.lifetime {
            Lifetime::Transient => (self.factory)(provider),
            Lifetime::Singleton => {
                if let Some(instance) = self.instance.lock().as_ref() {
                    return Arc::clone(instance);
                }
                let built = (self.factory)(provider);
                Arc::clone(self.instance.lock().get_or_insert(built))
            }
        }
    }

    fn downcast<T: ?Sized + 'static>(&self, erased: ServiceArc) -> Option<Arc<T>> {
        let service = erased.downcast_ref::<Arc<T>>().map(Arc::clone);
        if service.is_none() {
            warn!(
                key = std::any::type_name::<T>(),
                implementation = self.implementation,
                "Registered factory produced a value of the wrong type, skipping"
            );
        }
        service
    }
}

// =============================================================================
// ServiceCollection
// =============================================================================

/// Mutable registration table, filled once at startup.
///
/// Multiple registrations for the same key are kept in insertion order:
/// [`ServiceProvider::resolve_one`] returns the last one,
/// [`ServiceProvider::resolve_all`] returns all of them in order.
#[derive(Default)]
pub struct ServiceCollection {
    registrations: HashMap<ServiceKey, Vec<Registration>>,
}

impl ServiceCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an erased factory under `key`.
    pub fn register(
        &mut self,
        key: ServiceKey,
        implementation: &'static str,
        factory: ServiceFactory,
        lifetime: Lifetime,
    ) -> &mut Self {
        trace!(key = key.name(), implementation, ?lifetime, "Registering service");
        self.registrations
            .entry(key)
            .or_default()
            .push(Registration {
                implementation,
                lifetime,
                factory,
                instance: Mutex::new(None),
            });
        self
    }

    /// Registers `T`, built by `factory` on every resolution.
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> T + Send + Sync + 'static,
    {
        self.add_typed(factory, Lifetime::Transient)
    }

    /// Registers `T`, built by `factory` once on first resolution.
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> T + Send + Sync + 'static,
    {
        self.add_typed(factory, Lifetime::Singleton)
    }

    /// Registers an already constructed `T`; every resolution shares it.
    pub fn add_instance<T>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        let value = Arc::new(value);
        let factory: ServiceFactory = Arc::new(move |_: &ServiceProvider| {
            Arc::new(Arc::clone(&value)) as ServiceArc
        });
        self.register(
            ServiceKey::of::<T>(),
            std::any::type_name::<T>(),
            factory,
            Lifetime::Transient,
        )
    }

    fn add_typed<T, F>(&mut self, factory: F, lifetime: Lifetime) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> T + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |provider: &ServiceProvider| {
            Arc::new(Arc::new(factory(provider))) as ServiceArc
        });
        self.register(
            ServiceKey::of::<T>(),
            std::any::type_name::<T>(),
            factory,
            lifetime,
        )
    }

    /// Number of registrations under `key`.
    pub fn count(&self, key: &ServiceKey) -> usize {
        self.registrations.get(key).map_or(0, Vec::len)
    }

    /// Number of registrations under the key of `T`.
    pub fn count_of<T: ?Sized + 'static>(&self) -> usize {
        self.count(&ServiceKey::of::<T>())
    }

    /// Implementation names registered under `key`, in registration order.
    pub fn implementations(&self, key: &ServiceKey) -> Vec<&'static str> {
        self.registrations
            .get(key)
            .map(|regs| regs.iter().map(|r| r.implementation).collect())
            .unwrap_or_default()
    }

    /// Total number of registrations across all keys.
    pub fn len(&self) -> usize {
        self.registrations.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the registrations into a read-only provider.
    pub fn build_provider(self) -> ServiceProvider {
        ServiceProvider {
            registrations: Arc::new(self.registrations),
        }
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("keys", &self.registrations.len())
            .field("registrations", &self.len())
            .finish()
    }
}

// =============================================================================
// ServiceProvider
// =============================================================================

/// Read-only view over a frozen [`ServiceCollection`].
///
/// Resolution never mutates the registration table; the only interior state
/// is the per-registration singleton slot.
#[derive(Clone)]
pub struct ServiceProvider {
    registrations: Arc<HashMap<ServiceKey, Vec<Registration>>>,
}

impl ServiceProvider {
    /// Resolves the last registration under `key`, or `None`.
    pub fn resolve_one(&self, key: &ServiceKey) -> Option<ServiceArc> {
        self.registrations
            .get(key)
            .and_then(|regs| regs.last())
            .map(|reg| reg.instantiate(self))
    }

    /// Resolves every registration under `key`, in registration order.
    pub fn resolve_all(&self, key: &ServiceKey) -> Vec<ServiceArc> {
        self.registrations
            .get(key)
            .map(|regs| regs.iter().map(|reg| reg.instantiate(self)).collect())
            .unwrap_or_default()
    }

    /// Typed [`resolve_one`](Self::resolve_one).
    pub fn get<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        let reg = self.registrations.get(&ServiceKey::of::<T>())?.last()?;
        reg.downcast(reg.instantiate(self))
    }

    /// Typed [`resolve_all`](Self::resolve_all).
    pub fn get_all<T: ?Sized + 'static>(&self) -> Vec<Arc<T>> {
        self.get_all_named::<T>()
            .into_iter()
            .map(|(_, service)| service)
            .collect()
    }

    /// Like [`get_all`](Self::get_all), paired with each implementation's type name.
    ///
    /// A registration whose factory yields the wrong type is skipped with a
    /// warning naming the implementation.
    pub fn get_all_named<T: ?Sized + 'static>(&self) -> Vec<(&'static str, Arc<T>)> {
        let Some(regs) = self.registrations.get(&ServiceKey::of::<T>()) else {
            return Vec::new();
        };
        regs.iter()
            .filter_map(|reg| {
                reg.downcast::<T>(reg.instantiate(self))
                    .map(|service| (reg.implementation, service))
            })
            .collect()
    }

    /// Returns `true` if at least one registration exists under the key of `T`.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.registrations
            .get(&ServiceKey::of::<T>())
            .is_some_and(|regs| !regs.is_empty())
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("keys", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(usize);

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;
    struct French;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    impl Greeter for French {
        fn greet(&self) -> &'static str {
            "bonjour"
        }
    }

    fn register_greeter<G: Greeter + 'static>(services: &mut ServiceCollection, make: fn() -> G) {
        let factory: ServiceFactory = Arc::new(move |_: &ServiceProvider| {
            Arc::new(Arc::new(make()) as Arc<dyn Greeter>) as ServiceArc
        });
        services.register(
            ServiceKey::of::<dyn Greeter>(),
            std::any::type_name::<G>(),
            factory,
            Lifetime::Transient,
        );
    }

    #[test]
    fn test_transient_builds_per_resolution() {
        let built = Arc::new(AtomicUsize::new(0));
        let built_clone = Arc::clone(&built);

        let mut services = ServiceCollection::new();
        services.add_transient(move |_| Counter(built_clone.fetch_add(1, Ordering::SeqCst)));
        let provider = services.build_provider();

        let first = provider.get::<Counter>().unwrap();
        let second = provider.get::<Counter>().unwrap();

        assert_eq!(first.0, 0);
        assert_eq!(second.0, 1);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_singleton_is_shared() {
        let mut services = ServiceCollection::new();
        services.add_singleton(|_| Counter(7));
        let provider = services.build_provider();

        let first = provider.get::<Counter>().unwrap();
        let second = provider.clone().get::<Counter>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_instance_is_shared() {
        let mut services = ServiceCollection::new();
        services.add_instance(Counter(3));
        let provider = services.build_provider();

        let first = provider.get::<Counter>().unwrap();
        let second = provider.get::<Counter>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.0, 3);
    }

    #[test]
    fn test_missing_service() {
        let provider = ServiceCollection::new().build_provider();
        assert!(provider.get::<Counter>().is_none());
        assert!(provider.get_all::<dyn Greeter>().is_empty());
        assert!(!provider.contains::<Counter>());
    }

    #[test]
    fn test_trait_object_resolution() {
        let mut services = ServiceCollection::new();
        register_greeter(&mut services, || English);
        register_greeter(&mut services, || French);

        assert_eq!(services.count_of::<dyn Greeter>(), 2);
        assert_eq!(services.len(), 2);

        let provider = services.build_provider();

        // Single resolution: last registration wins.
        assert_eq!(provider.get::<dyn Greeter>().unwrap().greet(), "bonjour");

        // Multi resolution keeps registration order.
        let all: Vec<_> = provider
            .get_all::<dyn Greeter>()
            .iter()
            .map(|g| g.greet())
            .collect();
        assert_eq!(all, vec!["hello", "bonjour"]);
    }

    #[test]
    fn test_named_resolution() {
        let mut services = ServiceCollection::new();
        register_greeter(&mut services, || English);
        let provider = services.build_provider();

        let named = provider.get_all_named::<dyn Greeter>();
        assert_eq!(named.len(), 1);
        assert!(named[0].0.ends_with("English"));
    }

    #[test]
    fn test_factory_can_resolve_dependencies() {
        struct Wrapper(Arc<Counter>);

        let mut services = ServiceCollection::new();
        services.add_singleton(|_| Counter(42));
        services.add_transient(|p| Wrapper(p.get::<Counter>().unwrap()));
        let provider = services.build_provider();

        assert_eq!(provider.get::<Wrapper>().unwrap().0.0, 42);
    }

    #[test]
    fn test_singleton_factory_may_resolve_its_own_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let mut services = ServiceCollection::new();
        services.add_singleton(move |p| {
            let call = calls_clone.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                // The nested build publishes first.
                assert_eq!(p.get::<Counter>().unwrap().0, 1);
            }
            Counter(call)
        });
        let provider = services.build_provider();

        let first = provider.get::<Counter>().unwrap();
        let second = provider.get::<Counter>().unwrap();
        assert_eq!(first.0, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mismatched_factory_is_skipped() {
        let mut services = ServiceCollection::new();
        register_greeter(&mut services, || English);
        services.register(
            ServiceKey::of::<dyn Greeter>(),
            "mismatched::Counter",
            Arc::new(|_: &ServiceProvider| Arc::new(Arc::new(Counter(0))) as ServiceArc),
            Lifetime::Transient,
        );
        let provider = services.build_provider();

        let named = provider.get_all_named::<dyn Greeter>();
        assert_eq!(named.len(), 1);
        assert!(named[0].0.ends_with("English"));
        assert!(provider.get::<dyn Greeter>().is_none());
    }
}
