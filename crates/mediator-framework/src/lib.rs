//! # Mediator Framework
//!
//! Registry construction and dispatch on top of `mediator-core`.
//!
//! - [`add_mediator`] / [`ServiceCollectionExt`]: one-call initialization
//! - [`MediatorBuilder`]: the individual registration steps
//! - [`Mediator`]: `send_command`, `send_command_with_response`, `notify`,
//!   `broadcast`
//! - [`service`]: tower adapters for layering timeouts and other middleware

pub mod anchor;
pub mod builder;
pub mod configure;
pub mod mediator;
pub mod options;
pub mod service;

pub use anchor::RootAnchor;
pub use builder::MediatorBuilder;
pub use configure::{ServiceCollectionExt, add_mediator};
pub use mediator::Mediator;
pub use options::MediatorOptions;
pub use service::{BroadcastService, CommandService, NotifyService, RequestService};
