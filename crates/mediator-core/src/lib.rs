//! # Mediator Core
//!
//! Building blocks of the in-process mediator.
//!
//! This crate defines what a handler *is* and how handlers are found; the
//! dispatcher itself lives in `mediator-framework`.
//!
//! ## Contents
//!
//! - **Contracts**: [`CommandHandler`], [`CommandHandlerWithResponse`],
//!   [`EventSubscriber`]
//! - **Keys**: [`TypeKey`] identifying messages and locator entries
//! - **Service locator**: [`ServiceCollection`] (registration) and
//!   [`ServiceProvider`] (resolution)
//! - **Discovery**: [`CandidateType`] declarations, the pure [`classify`]
//!   function, and the link-time [`HANDLER_TABLE`]
//! - **Errors**: [`ConfigurationError`], [`DispatchError`], [`BroadcastError`]
//!
//! ## Flow
//!
//! ```text
//! CandidateType ──classify──▶ HandlerDescriptor ──register──▶ ServiceCollection
//!                                                                   │
//!                                                          build_provider
//!                                                                   ▼
//!                          message ──▶ Mediator ──resolve──▶ ServiceProvider
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use mediator_core::{CandidateType, ServiceCollection, Lifetime, classify};
//!
//! let candidate = CandidateType::of::<Inventory>()
//!     .handles::<ReserveStock>()
//!     .subscribes::<OrderCancelled>()
//!     .build();
//!
//! let mut services = ServiceCollection::new();
//! for descriptor in classify(&candidate) {
//!     services.register(
//!         descriptor.key(),
//!         descriptor.handler().name(),
//!         descriptor.factory().clone(),
//!         Lifetime::Transient,
//!     );
//! }
//! ```

pub mod candidate;
pub mod classify;
pub mod contracts;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod linked;
pub mod locator;

pub use candidate::{CandidateBuilder, CandidateType, Declaration};
pub use classify::classify;
pub use contracts::{
    CommandHandler, CommandHandlerWithResponse, EventSubscriber, HandlerError, HandlerResult,
};
pub use descriptor::{HandlerDescriptor, Shape};
pub use error::{
    BroadcastError, ConfigurationError, ConfigurationResult, DispatchError, DispatchResult,
    SubscriberFailure,
};
pub use key::{MessageType, ServiceKey, TypeKey};
pub use linked::{HANDLER_TABLE, LinkedHandler, linked_handlers};
pub use locator::{Lifetime, ServiceArc, ServiceCollection, ServiceFactory, ServiceProvider};

// Re-exported for `#[handler]` expansions.
#[doc(hidden)]
pub use linkme;

/// Prelude for common imports.
pub mod prelude {
    pub use super::contracts::{
        CommandHandler, CommandHandlerWithResponse, EventSubscriber, HandlerError, HandlerResult,
    };
    pub use super::error::{ConfigurationError, DispatchError, DispatchResult};
    pub use super::locator::{Lifetime, ServiceCollection, ServiceProvider};
    pub use super::{CandidateType, classify};
}
