//! # Mediator
//!
//! An in-process mediator: senders hand a message to the [`Mediator`] and
//! never learn which handler receives it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   classify   ┌───────────────────┐  build_provider  ┌─────────────────┐
//! │ #[handler]   │─────────────▶│ ServiceCollection │─────────────────▶│ ServiceProvider │
//! │ CandidateType│              └───────────────────┘                  └────────┬────────┘
//! └──────────────┘                                                              │ resolve
//!                         send_command / send_command_with_response             ▼
//!               sender ───────────── notify / broadcast ──────────────▶  Mediator ──▶ handlers
//! ```
//!
//! - **Contracts**: [`CommandHandler`](core::CommandHandler),
//!   [`CommandHandlerWithResponse`](core::CommandHandlerWithResponse),
//!   [`EventSubscriber`](core::EventSubscriber)
//! - **Discovery**: `#[handler]` impls in the root crate and in referenced
//!   crates, plus explicit [`CandidateType`](core::CandidateType)s
//! - **Dispatch**: exactly one handler per command; events go to every
//!   subscriber, in order ([`Mediator::notify`]) or concurrently
//!   ([`Mediator::broadcast`])
//! - **Runtime**: configuration files and logging setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mediator::prelude::*;
//!
//! struct PlaceOrder { id: u64 }
//!
//! #[derive(Default)]
//! struct Orders;
//!
//! #[handler]
//! #[async_trait]
//! impl CommandHandler<PlaceOrder> for Orders {
//!     async fn handle_command(&self, command: PlaceOrder) -> HandlerResult<()> {
//!         info!(id = command.id, "Order placed");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut services = ServiceCollection::new();
//!     services.add_mediator(MediatorOptions::new().root(root_anchor!()))?;
//!
//!     let mediator = Mediator::new(services.build_provider());
//!     mediator.send_command(PlaceOrder { id: 1 }).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use mediator_core as core;
pub use mediator_framework as framework;
pub use mediator_runtime as runtime;

pub use mediator_framework::{Mediator, MediatorOptions, RootAnchor, add_mediator, root_anchor};
pub use mediator_macros::handler;
pub use mediator_runtime::MediatorRuntime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use mediator::prelude::*;
/// ```
pub mod prelude {
    // Contracts
    pub use mediator_core::{
        CommandHandler, CommandHandlerWithResponse, EventSubscriber, HandlerError, HandlerResult,
    };

    // Registration
    pub use mediator_core::{CandidateType, Lifetime, ServiceCollection, ServiceProvider};
    pub use mediator_framework::{MediatorOptions, RootAnchor, ServiceCollectionExt, root_anchor};
    pub use mediator_macros::handler;

    // Dispatch
    pub use mediator_core::{BroadcastError, DispatchError, DispatchResult};
    pub use mediator_framework::Mediator;

    // Runtime
    pub use mediator_runtime::MediatorRuntime;

    pub use async_trait::async_trait;
    pub use mediator_runtime::prelude::*;
}
