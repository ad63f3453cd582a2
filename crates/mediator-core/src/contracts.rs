//! Capability contracts a handler type can satisfy.
//!
//! There are exactly three handler shapes the mediator understands:
//!
//! - [`CommandHandler<C>`] – the single responder for command `C`, no result.
//! - [`CommandHandlerWithResponse<C, R>`] – the single responder for command
//!   `C` producing an `R`.
//! - [`EventSubscriber<E>`] – one of any number of listeners for event `E`.
//!
//! A concrete type may implement any combination of them, including several
//! instantiations of the same contract:
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use mediator_core::{CommandHandler, EventSubscriber, HandlerResult};
//!
//! struct Inventory;
//!
//! #[async_trait]
//! impl CommandHandler<ReserveStock> for Inventory {
//!     async fn handle_command(&self, command: ReserveStock) -> HandlerResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl EventSubscriber<OrderCancelled> for Inventory {
//!     async fn handle_notification(&self, event: &OrderCancelled) -> HandlerResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

/// Error produced by a handler's own logic.
///
/// The mediator relays it to the caller untouched; callers may
/// `downcast_ref` to their concrete error type.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by every handler contract.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// The single responsible handler for a command that produces no result.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Send + 'static,
{
    /// Executes the command.
    async fn handle_command(&self, command: C) -> HandlerResult<()>;
}

/// The single responsible handler for a command that produces a response.
///
/// Registrations are keyed on the exact `(C, R)` pair, so one type may answer
/// the same command with several response types.
#[async_trait]
pub trait CommandHandlerWithResponse<C, R>: Send + Sync
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// Executes the command and produces its response.
    async fn handle_command(&self, command: C) -> HandlerResult<R>;
}

/// A listener for an event. Any number of subscribers may exist per event.
#[async_trait]
pub trait EventSubscriber<E>: Send + Sync
where
    E: Sync + 'static,
{
    /// Reacts to the event.
    async fn handle_notification(&self, event: &E) -> HandlerResult<()>;
}
