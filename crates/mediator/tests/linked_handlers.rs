//! Handlers registered through `#[handler]` and discovered from the
//! link-time table.

use std::sync::Arc;

use mediator::prelude::*;
use parking_lot::Mutex;

// =============================================================================
// Messages
// =============================================================================

struct ReserveStock {
    sku: &'static str,
}

struct QuoteShipping {
    weight_kg: u32,
}

struct OrderShipped {
    id: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Shared log handlers write into, resolved from the provider.
#[derive(Default)]
struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    fn write(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

#[derive(Default)]
struct Warehouse;

#[handler]
#[async_trait]
impl CommandHandler<ReserveStock> for Warehouse {
    async fn handle_command(&self, command: ReserveStock) -> HandlerResult<()> {
        if command.sku.is_empty() {
            return Err("empty sku".into());
        }
        Ok(())
    }
}

#[handler]
#[async_trait]
impl CommandHandlerWithResponse<QuoteShipping, u32> for Warehouse {
    async fn handle_command(&self, command: QuoteShipping) -> HandlerResult<u32> {
        Ok(500 + command.weight_kg * 120)
    }
}

struct Auditor {
    journal: Arc<Journal>,
}

impl Auditor {
    fn from_provider(provider: &ServiceProvider) -> Self {
        Self {
            journal: provider.get::<Journal>().unwrap_or_default(),
        }
    }
}

#[handler(factory = Auditor::from_provider)]
#[async_trait]
impl EventSubscriber<OrderShipped> for Auditor {
    async fn handle_notification(&self, event: &OrderShipped) -> HandlerResult<()> {
        self.journal.write(format!("audit {}", event.id));
        Ok(())
    }
}

#[derive(Default)]
struct Mailer;

#[handler(core = ::mediator::core)]
#[async_trait]
impl EventSubscriber<OrderShipped> for Mailer {
    async fn handle_notification(&self, event: &OrderShipped) -> HandlerResult<()> {
        if event.id == 0 {
            return Err("no recipient for order 0".into());
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn setup(options: MediatorOptions) -> (Mediator, Arc<Journal>) {
    let mut services = ServiceCollection::new();
    services.add_instance(Journal::default());
    services.add_mediator(options).unwrap();

    let provider = services.build_provider();
    let journal = provider.get::<Journal>().unwrap();
    let mediator = provider.get::<Mediator>().unwrap();
    (Mediator::clone(&mediator), journal)
}

fn in_scope() -> MediatorOptions {
    MediatorOptions::new().root(root_anchor!())
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_table_holds_every_annotated_impl() {
    let handlers: Vec<&str> = mediator::core::linked_handlers()
        .filter(|entry| entry.crate_name() == "linked_handlers")
        .map(|entry| entry.handler)
        .collect();

    assert_eq!(handlers.len(), 4);
    assert_eq!(handlers.iter().filter(|h| **h == "Warehouse").count(), 2);
    assert!(handlers.contains(&"Auditor"));
    assert!(handlers.contains(&"Mailer"));
}

#[tokio::test]
async fn test_commands_reach_linked_handlers() {
    let (mediator, _) = setup(in_scope());

    mediator
        .send_command(ReserveStock { sku: "SKU-1" })
        .await
        .unwrap();

    let quote: u32 = mediator
        .send_command_with_response(QuoteShipping { weight_kg: 2 })
        .await
        .unwrap();
    assert_eq!(quote, 740);
}

#[tokio::test]
async fn test_handler_error_is_relayed_verbatim() {
    let (mediator, _) = setup(in_scope());

    let err = mediator
        .send_command(ReserveStock { sku: "" })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "empty sku");
}

#[tokio::test]
async fn test_factory_handler_resolves_dependencies() {
    let (mediator, journal) = setup(in_scope());

    mediator.notify(&OrderShipped { id: 7 }).await.unwrap();
    mediator.broadcast(&OrderShipped { id: 8 }).await.unwrap();

    assert_eq!(journal.entries(), ["audit 7", "audit 8"]);
}

#[tokio::test]
async fn test_broadcast_reports_failure_after_all_subscribers_ran() {
    let (mediator, journal) = setup(in_scope());

    let err = mediator.broadcast(&OrderShipped { id: 0 }).await.unwrap_err();
    let broadcast = match err {
        DispatchError::Broadcast(broadcast) => broadcast,
        other => panic!("expected a broadcast error, got {other:?}"),
    };

    assert_eq!(broadcast.subscribers(), 2);
    assert_eq!(broadcast.failures().len(), 1);
    assert_eq!(broadcast.failures()[0].subscriber, "linked_handlers::Mailer");
    assert_eq!(journal.entries(), ["audit 0"]);
}

#[tokio::test]
async fn test_out_of_scope_crate_is_not_registered() {
    let options = MediatorOptions::new().root(RootAnchor::named("storefront"));
    let (mediator, _) = setup(options);

    let err = mediator
        .send_command(ReserveStock { sku: "SKU-1" })
        .await
        .unwrap_err();
    assert!(err.is_unhandled());

    // No subscribers in scope: both fan-outs succeed without doing anything.
    mediator.notify(&OrderShipped { id: 1 }).await.unwrap();
    mediator.broadcast(&OrderShipped { id: 1 }).await.unwrap();
}

#[tokio::test]
async fn test_referenced_crate_is_registered() {
    let options = MediatorOptions::new()
        .root(RootAnchor::named("storefront"))
        .reference("linked-handlers");
    let (mediator, _) = setup(options);

    mediator
        .send_command(ReserveStock { sku: "SKU-1" })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_without_linked_handlers_uses_explicit_candidates_only() {
    let options = in_scope()
        .without_linked_handlers()
        .candidate(CandidateType::of::<Warehouse>().handles::<ReserveStock>());
    let (mediator, _) = setup(options);

    mediator
        .send_command(ReserveStock { sku: "SKU-1" })
        .await
        .unwrap();

    let err = mediator
        .send_command_with_response::<QuoteShipping, u32>(QuoteShipping { weight_kg: 1 })
        .await
        .unwrap_err();
    assert!(err.is_unhandled());
}

#[tokio::test]
async fn test_explicit_candidate_for_linked_type_registers_once() {
    let options = in_scope().candidate(CandidateType::of::<Mailer>().subscribes::<OrderShipped>());
    let (mediator, journal) = setup(options);

    let err = mediator.broadcast(&OrderShipped { id: 0 }).await.unwrap_err();
    let broadcast = match err {
        DispatchError::Broadcast(broadcast) => broadcast,
        other => panic!("expected a broadcast error, got {other:?}"),
    };
    assert_eq!(broadcast.subscribers(), 2);
    assert_eq!(broadcast.failures().len(), 1);
    assert_eq!(broadcast.failures()[0].subscriber, "linked_handlers::Mailer");
    assert_eq!(journal.entries(), ["audit 0"]);
}

#[test]
fn test_runtime_configures_from_config() {
    let mut config = mediator::runtime::MediatorConfig::default();
    config.mediator.root_crate = Some("linked_handlers".into());

    let runtime = MediatorRuntime::new(config).unwrap();
    let mediator = runtime.configure(ServiceCollection::new(), []).unwrap();

    let quote: u32 = tokio_test::block_on(
        mediator.send_command_with_response(QuoteShipping { weight_kg: 0 }),
    )
    .unwrap();
    assert_eq!(quote, 500);
}
