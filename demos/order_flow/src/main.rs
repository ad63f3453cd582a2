//! Order Flow Example
//!
//! Walks one order through the mediator's four operations:
//!
//! ```text
//! send_command_with_response  QuoteOrder   ──▶ Pricing
//! send_command                PlaceOrder   ──▶ OrderDesk
//! notify                      OrderPlaced  ──▶ Billing, Shipping, Analytics (in turn)
//! broadcast                   OrderPlaced  ──▶ Billing, Shipping, Analytics (concurrently)
//! ```
//!
//! Handlers are registered with `#[handler]` and discovered because this crate
//! is the root anchor. `OrderDesk`, `Billing` and `Shipping` share an
//! `OrderBook` resolved from the service provider.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package order-flow
//! MEDIATOR_LOGGING__LEVEL=debug cargo run --package order-flow
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mediator::prelude::*;
use parking_lot::Mutex;
use tracing::{error, info};

// ============================================================================
// Messages
// ============================================================================

struct QuoteOrder {
    sku: &'static str,
    quantity: u32,
}

struct PlaceOrder {
    id: u64,
    sku: &'static str,
    quantity: u32,
    total_cents: u64,
}

struct OrderPlaced {
    id: u64,
    total_cents: u64,
}

// ============================================================================
// Shared State
// ============================================================================

#[derive(Default)]
struct OrderBook {
    lines: Mutex<Vec<String>>,
}

impl OrderBook {
    fn record(&self, line: String) {
        info!("{line}");
        self.lines.lock().push(line);
    }

    fn from_provider(provider: &ServiceProvider) -> Arc<Self> {
        provider.get::<OrderBook>().unwrap_or_default()
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Default)]
struct Pricing;

#[handler]
#[async_trait]
impl CommandHandlerWithResponse<QuoteOrder, u64> for Pricing {
    async fn handle_command(&self, command: QuoteOrder) -> HandlerResult<u64> {
        let unit_cents = match command.sku {
            "KB-01" => 8_900,
            "MS-02" => 2_450,
            other => return Err(format!("unknown sku {other}").into()),
        };
        Ok(unit_cents * u64::from(command.quantity))
    }
}

struct OrderDesk {
    book: Arc<OrderBook>,
}

impl OrderDesk {
    fn new(provider: &ServiceProvider) -> Self {
        Self {
            book: OrderBook::from_provider(provider),
        }
    }
}

#[handler(factory = OrderDesk::new)]
#[async_trait]
impl CommandHandler<PlaceOrder> for OrderDesk {
    async fn handle_command(&self, command: PlaceOrder) -> HandlerResult<()> {
        self.book.record(format!(
            "order #{} placed: {} x {} for {} cents",
            command.id, command.quantity, command.sku, command.total_cents
        ));
        Ok(())
    }
}

struct Billing {
    book: Arc<OrderBook>,
}

impl Billing {
    fn new(provider: &ServiceProvider) -> Self {
        Self {
            book: OrderBook::from_provider(provider),
        }
    }
}

#[handler(factory = Billing::new)]
#[async_trait]
impl EventSubscriber<OrderPlaced> for Billing {
    async fn handle_notification(&self, event: &OrderPlaced) -> HandlerResult<()> {
        self.book
            .record(format!("invoice for order #{}: {} cents", event.id, event.total_cents));
        Ok(())
    }
}

struct Shipping {
    book: Arc<OrderBook>,
}

impl Shipping {
    fn new(provider: &ServiceProvider) -> Self {
        Self {
            book: OrderBook::from_provider(provider),
        }
    }
}

#[handler(factory = Shipping::new)]
#[async_trait]
impl EventSubscriber<OrderPlaced> for Shipping {
    async fn handle_notification(&self, event: &OrderPlaced) -> HandlerResult<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.book
            .record(format!("parcel for order #{} shipped", event.id));
        Ok(())
    }
}

#[derive(Default)]
struct Analytics;

#[handler]
#[async_trait]
impl EventSubscriber<OrderPlaced> for Analytics {
    async fn handle_notification(&self, event: &OrderPlaced) -> HandlerResult<()> {
        if event.total_cents > 100_000 {
            return Err(format!("order #{} exceeds the reporting limit", event.id).into());
        }
        Ok(())
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = MediatorRuntime::builder()
        .search_path(env!("CARGO_MANIFEST_DIR"))
        .root(root_anchor!())
        .build()?;
    runtime.init_logging()?;

    let mut services = ServiceCollection::new();
    services.add_instance(OrderBook::default());
    let mediator = runtime.configure(services, [])?;

    let total_cents: u64 = mediator
        .send_command_with_response(QuoteOrder {
            sku: "KB-01",
            quantity: 3,
        })
        .await?;

    mediator
        .send_command(PlaceOrder {
            id: 1,
            sku: "KB-01",
            quantity: 3,
            total_cents,
        })
        .await?;

    mediator.notify(&OrderPlaced { id: 1, total_cents }).await?;

    // A large order: Analytics fails, Billing and Shipping still complete.
    let large = OrderPlaced {
        id: 2,
        total_cents: 250_000,
    };
    if let Err(DispatchError::Broadcast(err)) = mediator.broadcast(&large).await {
        for failure in err.failures() {
            error!(subscriber = failure.subscriber, "{}", failure.error);
        }
    }

    let unknown = QuoteOrder {
        sku: "XX-99",
        quantity: 1,
    };
    if let Err(err) = mediator
        .send_command_with_response::<QuoteOrder, u64>(unknown)
        .await
    {
        error!("quote rejected: {err}");
    }

    Ok(())
}
