//! Handler classification.
//!
//! Decides, for one candidate type, which handler shapes it satisfies.
//! A type may yield several descriptors (one per implemented contract
//! instantiation) or none at all.

use std::sync::Arc;

use crate::candidate::{CandidateType, Declaration};
use crate::descriptor::HandlerDescriptor;

/// Returns one descriptor per mediator contract the candidate declares.
///
/// Foreign declarations are ignored. The result preserves declaration
/// order and is deterministic for a given candidate.
pub fn classify(candidate: &CandidateType) -> Vec<HandlerDescriptor> {
    candidate
        .declarations()
        .iter()
        .filter_map(|declaration| match declaration {
            Declaration::Contract {
                shape,
                key,
                factory,
            } => Some(HandlerDescriptor::new(
                candidate.handler(),
                *shape,
                *key,
                Arc::clone(factory),
            )),
            Declaration::Foreign { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{
        CommandHandler, CommandHandlerWithResponse, EventSubscriber, HandlerResult,
    };
    use crate::descriptor::Shape;
    use crate::key::{MessageType, ServiceKey, TypeKey};
    use crate::locator::{Lifetime, ServiceCollection};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Archive;
    struct Quote;
    struct Price(u32);
    struct Archived;
    struct Purged;

    static ARCHIVED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Ledger;

    #[async_trait]
    impl CommandHandler<Archive> for Ledger {
        async fn handle_command(&self, _command: Archive) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl CommandHandlerWithResponse<Quote, Price> for Ledger {
        async fn handle_command(&self, _command: Quote) -> HandlerResult<Price> {
            Ok(Price(7))
        }
    }

    #[async_trait]
    impl EventSubscriber<Archived> for Ledger {
        async fn handle_notification(&self, _event: &Archived) -> HandlerResult<()> {
            ARCHIVED.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl EventSubscriber<Purged> for Ledger {
        async fn handle_notification(&self, _event: &Purged) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Plain;

    #[test]
    fn test_classify_every_declared_shape() {
        let candidate = CandidateType::of::<Ledger>()
            .handles::<Archive>()
            .responds::<Quote, Price>()
            .subscribes::<Archived>()
            .subscribes::<Purged>()
            .declares("Default")
            .build();

        let descriptors = classify(&candidate);
        assert_eq!(descriptors.len(), 4);
        assert!(descriptors.iter().all(|d| d.handler() == TypeKey::of::<Ledger>()));

        let shapes: Vec<Shape> = descriptors.iter().map(HandlerDescriptor::shape).collect();
        assert_eq!(
            shapes,
            vec![
                Shape::CommandHandler {
                    command: MessageType::of::<Archive>()
                },
                Shape::CommandHandlerWithResponse {
                    command: MessageType::of::<Quote>(),
                    response: MessageType::of::<Price>()
                },
                Shape::EventSubscriber {
                    event: MessageType::of::<Archived>()
                },
                Shape::EventSubscriber {
                    event: MessageType::of::<Purged>()
                },
            ]
        );
        assert_eq!(
            descriptors[1].key(),
            ServiceKey::of::<dyn CommandHandlerWithResponse<Quote, Price>>()
        );
    }

    #[test]
    fn test_classify_foreign_only_is_empty() {
        let candidate = CandidateType::of::<Plain>()
            .declares("Clone")
            .declares("Display")
            .build();
        assert!(classify(&candidate).is_empty());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let candidate = CandidateType::of::<Ledger>()
            .subscribes::<Purged>()
            .handles::<Archive>()
            .build();
        let first: Vec<Shape> = classify(&candidate).iter().map(|d| d.shape()).collect();
        let second: Vec<Shape> = classify(&candidate).iter().map(|d| d.shape()).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_descriptor_factory_resolves_callable_handler() {
        let candidate = CandidateType::of::<Ledger>().subscribes::<Archived>().build();
        let mut services = ServiceCollection::new();
        for descriptor in classify(&candidate) {
            services.register(
                descriptor.key(),
                descriptor.handler().name(),
                Arc::clone(descriptor.factory()),
                Lifetime::Transient,
            );
        }

        let provider = services.build_provider();
        let subscribers = provider.get_all::<dyn EventSubscriber<Archived>>();
        assert_eq!(subscribers.len(), 1);

        let before = ARCHIVED.load(Ordering::SeqCst);
        subscribers[0].handle_notification(&Archived).await.unwrap();
        assert_eq!(ARCHIVED.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test]
    async fn test_response_handler_roundtrip() {
        let candidate = CandidateType::of::<Ledger>().responds::<Quote, Price>().build();
        let mut services = ServiceCollection::new();
        let descriptor = &classify(&candidate)[0];
        services.register(
            descriptor.key(),
            descriptor.handler().name(),
            Arc::clone(descriptor.factory()),
            Lifetime::Singleton,
        );

        let provider = services.build_provider();
        let handler = provider
            .get::<dyn CommandHandlerWithResponse<Quote, Price>>()
            .unwrap();
        let Price(value) = handler.handle_command(Quote).await.unwrap();
        assert_eq!(value, 7);
    }
}
