//! Registry builder.
//!
//! Discovers handler candidates, classifies them and registers one
//! service-locator entry per handler shape. The steps run in a fixed order:
//!
//! ```text
//! create ──▶ fetch_candidates ──▶ scan_for_implementations ──▶ build
//!   │              │                        │                    │
//!   │              │                        │                    └ registers the Mediator
//!   │              │                        └ classify + register descriptors
//!   │              └ explicit candidates, then in-scope linked entries
//!   └ validates the root anchor
//! ```
//!
//! The builder only mutates the [`ServiceCollection`] it was given; it never
//! creates handler instances.

use std::collections::HashMap;
use std::fmt;

use mediator_core::{
    CandidateType, ConfigurationError, ConfigurationResult, LinkedHandler, ServiceCollection,
    ServiceProvider, TypeKey, classify, linked_handlers,
};
use tracing::{debug, info, warn};

use crate::anchor::RootAnchor;
use crate::mediator::Mediator;
use crate::options::MediatorOptions;

/// Builds the handler registry into an externally owned [`ServiceCollection`].
pub struct MediatorBuilder<'a> {
    options: MediatorOptions,
    anchor: RootAnchor,
    services: &'a mut ServiceCollection,
    candidates: Vec<CandidateType>,
    registered: usize,
}

impl<'a> MediatorBuilder<'a> {
    /// Validates `options` and prepares a builder.
    ///
    /// Fails with [`ConfigurationError::MissingRootAnchor`] when no root anchor
    /// was configured, before anything is scanned or registered.
    pub fn create(
        options: MediatorOptions,
        services: &'a mut ServiceCollection,
    ) -> ConfigurationResult<Self> {
        let anchor = options
            .root_anchor()
            .cloned()
            .ok_or(ConfigurationError::MissingRootAnchor)?;
        if anchor.crate_name().is_empty() {
            return Err(ConfigurationError::EmptyRootAnchor);
        }

        Ok(Self {
            options,
            anchor,
            services,
            candidates: Vec::new(),
            registered: 0,
        })
    }

    /// The root anchor in use.
    pub fn anchor(&self) -> &RootAnchor {
        &self.anchor
    }

    /// Returns `true` if linked entries from `crate_name` are registered.
    pub fn in_scope(&self, crate_name: &str) -> bool {
        crate_name == self.anchor.crate_name()
            || self
                .options
                .referenced_crates()
                .iter()
                .any(|referenced| referenced == crate_name)
    }

    /// Candidates gathered so far.
    pub fn candidates(&self) -> &[CandidateType] {
        &self.candidates
    }

    /// Collects explicit candidates and the in-scope entries of the
    /// link-time handler table.
    pub fn fetch_candidates(self) -> Self {
        let linked = self.options.uses_linked_handlers();
        let entries: Vec<&'static LinkedHandler> = if linked {
            linked_handlers().collect()
        } else {
            Vec::new()
        };
        self.fetch_candidates_from(entries)
    }

    /// Like [`fetch_candidates`](Self::fetch_candidates), reading linked
    /// entries from `entries` instead of the global table.
    ///
    /// Entries declaring the same concrete type, including a type already
    /// passed as an explicit candidate, are merged into one candidate.
    pub fn fetch_candidates_from<'e, I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = &'e LinkedHandler>,
    {
        self.candidates
            .extend(self.options.explicit_candidates().iter().cloned());
        let explicit = self.candidates.len();

        let mut positions: HashMap<TypeKey, usize> = HashMap::new();
        for (index, candidate) in self.candidates.iter().enumerate() {
            positions.entry(candidate.handler()).or_insert(index);
        }
        let mut skipped = 0usize;
        for entry in entries {
            let crate_name = entry.crate_name();
            if !self.in_scope(crate_name) {
                debug!(
                    handler = entry.handler,
                    crate_name, "Skipping linked handler outside of scope"
                );
                skipped += 1;
                continue;
            }

            let candidate = (entry.candidate)();
            match positions.get(&candidate.handler()) {
                Some(&index) => {
                    self.candidates[index].merge(candidate);
                }
                None => {
                    positions.insert(candidate.handler(), self.candidates.len());
                    self.candidates.push(candidate);
                }
            }
        }

        debug!(
            root = %self.anchor,
            explicit,
            linked = self.candidates.len() - explicit,
            skipped,
            "Fetched handler candidates"
        );
        self
    }

    /// Classifies every candidate and registers each descriptor.
    ///
    /// Subscriber registration order follows candidate order and later
    /// becomes `notify` order.
    pub fn scan_for_implementations(mut self) -> Self {
        let lifetime = self.options.handler_lifetime();

        for candidate in &self.candidates {
            for descriptor in classify(candidate) {
                let shape = descriptor.shape();
                if !shape.is_multi_valued() && self.services.count(&descriptor.key()) > 0 {
                    warn!(
                        handler = descriptor.handler().name(),
                        shape = %shape,
                        "Duplicate command handler, last registration wins"
                    );
                }

                debug!(
                    handler = descriptor.handler().name(),
                    shape = %shape,
                    ?lifetime,
                    "Registering handler"
                );
                self.services.register(
                    descriptor.key(),
                    descriptor.handler().name(),
                    descriptor.factory().clone(),
                    lifetime,
                );
                self.registered += 1;
            }
        }
        self
    }

    /// Registers the [`Mediator`] itself (transient) and finishes.
    ///
    /// Returns the number of handler registrations made.
    pub fn build(self) -> usize {
        self.services
            .add_transient(|provider: &ServiceProvider| Mediator::new(provider.clone()));

        info!(
            root = %self.anchor,
            candidates = self.candidates.len(),
            handlers = self.registered,
            "Mediator registered"
        );
        self.registered
    }
}

impl fmt::Debug for MediatorBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediatorBuilder")
            .field("anchor", &self.anchor)
            .field("referenced", &self.options.referenced_crates())
            .field("candidates", &self.candidates.len())
            .field("registered", &self.registered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mediator_core::{CommandHandler, EventSubscriber, HandlerResult, Lifetime, ServiceKey};

    struct Checkout;
    struct Refund;
    struct Paid;

    #[derive(Default)]
    struct Cashier;

    #[async_trait]
    impl CommandHandler<Checkout> for Cashier {
        async fn handle_command(&self, _command: Checkout) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl CommandHandler<Refund> for Cashier {
        async fn handle_command(&self, _command: Refund) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Receipts;

    #[async_trait]
    impl EventSubscriber<Paid> for Receipts {
        async fn handle_notification(&self, _event: &Paid) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Analytics;

    #[async_trait]
    impl EventSubscriber<Paid> for Analytics {
        async fn handle_notification(&self, _event: &Paid) -> HandlerResult<()> {
            Ok(())
        }
    }

    fn cashier_checkout() -> CandidateType {
        CandidateType::of::<Cashier>().handles::<Checkout>().build()
    }

    fn cashier_refund() -> CandidateType {
        CandidateType::of::<Cashier>().handles::<Refund>().build()
    }

    fn receipts() -> CandidateType {
        CandidateType::of::<Receipts>().subscribes::<Paid>().build()
    }

    fn analytics() -> CandidateType {
        CandidateType::of::<Analytics>().subscribes::<Paid>().build()
    }

    fn entry(module_path: &'static str, candidate: fn() -> CandidateType) -> LinkedHandler {
        LinkedHandler {
            module_path,
            handler: "test",
            candidate,
        }
    }

    #[test]
    fn test_missing_root_anchor_fails_before_scanning() {
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new().candidate(receipts());

        let err = MediatorBuilder::create(options, &mut services).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingRootAnchor);
        assert!(services.is_empty());
    }

    #[test]
    fn test_empty_root_anchor() {
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new().root(RootAnchor::named(""));
        let err = MediatorBuilder::create(options, &mut services).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyRootAnchor);
    }

    #[test]
    fn test_scope_includes_root_and_references() {
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new()
            .root(RootAnchor::named("shop"))
            .reference("payments");
        let builder = MediatorBuilder::create(options, &mut services).unwrap();

        assert!(builder.in_scope("shop"));
        assert!(builder.in_scope("payments"));
        assert!(!builder.in_scope("stranger"));
    }

    #[test]
    fn test_out_of_scope_entries_are_not_registered() {
        let entries = [
            entry("shop::checkout", cashier_checkout),
            entry("payments::receipts", receipts),
            entry("stranger::analytics", analytics),
        ];
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new()
            .root(RootAnchor::named("shop"))
            .reference("payments");

        let registered = MediatorBuilder::create(options, &mut services)
            .unwrap()
            .fetch_candidates_from(&entries)
            .scan_for_implementations()
            .build();

        assert_eq!(registered, 2);
        assert_eq!(services.count_of::<dyn CommandHandler<Checkout>>(), 1);
        let subscribers = services.implementations(&ServiceKey::of::<dyn EventSubscriber<Paid>>());
        assert_eq!(subscribers.len(), 1);
        assert!(subscribers[0].ends_with("Receipts"));
    }

    #[test]
    fn test_linked_entries_merge_per_type() {
        let entries = [
            entry("shop::cashier", cashier_checkout),
            entry("shop::cashier", cashier_refund),
        ];
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new().root(RootAnchor::named("shop"));

        let builder = MediatorBuilder::create(options, &mut services)
            .unwrap()
            .fetch_candidates_from(&entries);
        assert_eq!(builder.candidates().len(), 1);
        assert_eq!(builder.candidates()[0].declarations().len(), 2);

        let registered = builder.scan_for_implementations().build();
        assert_eq!(registered, 2);
        assert_eq!(services.count_of::<dyn CommandHandler<Refund>>(), 1);
    }

    #[test]
    fn test_explicit_candidates_come_first_in_order() {
        let entries = [entry("shop::receipts", receipts)];
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new()
            .root(RootAnchor::named("shop"))
            .candidate(analytics());

        MediatorBuilder::create(options, &mut services)
            .unwrap()
            .fetch_candidates_from(&entries)
            .scan_for_implementations()
            .build();

        let subscribers = services.implementations(&ServiceKey::of::<dyn EventSubscriber<Paid>>());
        assert_eq!(subscribers.len(), 2);
        assert!(subscribers[0].ends_with("Analytics"));
        assert!(subscribers[1].ends_with("Receipts"));
    }

    #[test]
    fn test_explicit_candidate_absorbs_linked_entry_for_same_type() {
        let entries = [
            entry("shop::receipts", receipts),
            entry("shop::cashier", cashier_refund),
        ];
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new()
            .root(RootAnchor::named("shop"))
            .candidate(receipts())
            .candidate(cashier_checkout());

        let builder = MediatorBuilder::create(options, &mut services)
            .unwrap()
            .fetch_candidates_from(&entries);
        assert_eq!(builder.candidates().len(), 2);
        assert_eq!(builder.candidates()[0].declarations().len(), 1);
        assert_eq!(builder.candidates()[1].declarations().len(), 2);

        let registered = builder.scan_for_implementations().build();
        assert_eq!(registered, 3);
        let subscribers = services.implementations(&ServiceKey::of::<dyn EventSubscriber<Paid>>());
        assert_eq!(subscribers.len(), 1);
        assert_eq!(services.count_of::<dyn CommandHandler<Checkout>>(), 1);
        assert_eq!(services.count_of::<dyn CommandHandler<Refund>>(), 1);
    }

    #[test]
    fn test_build_registers_mediator_and_lifetime() {
        let mut services = ServiceCollection::new();
        let options = MediatorOptions::new()
            .root(RootAnchor::named("shop"))
            .lifetime(Lifetime::Singleton)
            .without_linked_handlers()
            .candidate(cashier_checkout());

        MediatorBuilder::create(options, &mut services)
            .unwrap()
            .fetch_candidates()
            .scan_for_implementations()
            .build();

        assert_eq!(services.count_of::<Mediator>(), 1);
        let provider = services.build_provider();
        assert!(provider.get::<Mediator>().is_some());

        let first = provider.get::<dyn CommandHandler<Checkout>>().unwrap();
        let second = provider.get::<dyn CommandHandler<Checkout>>().unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }
}
