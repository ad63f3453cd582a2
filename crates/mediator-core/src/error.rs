//! Error types shared by the registry builder and the dispatcher.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::contracts::HandlerError;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while building the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No root anchor was supplied, so the handler scope is unknown.
    #[error("root anchor is not set: the mediator cannot determine which crates to scan")]
    MissingRootAnchor,

    /// The root anchor names an empty crate.
    #[error("root anchor names an empty crate")]
    EmptyRootAnchor,
}

/// Result alias for registry construction.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors returned by the dispatcher operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the command.
    #[error("message '{message_type}' doesn't have any responsible handler")]
    UnhandledMessage {
        /// Name of the command type.
        message_type: &'static str,
    },

    /// A handler failed; the error is relayed as produced, including its
    /// own source chain.
    #[error(transparent)]
    Handler(HandlerError),

    /// One or more subscribers failed during a broadcast.
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}

impl DispatchError {
    /// `UnhandledMessage` for message type `M`.
    pub fn unhandled<M: 'static>() -> Self {
        Self::UnhandledMessage {
            message_type: std::any::type_name::<M>(),
        }
    }

    /// Returns `true` for [`DispatchError::UnhandledMessage`].
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::UnhandledMessage { .. })
    }

    /// The handler's own error, for [`DispatchError::Handler`].
    pub fn handler_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result alias for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

// =============================================================================
// Broadcast Errors
// =============================================================================

/// A single failed subscriber of a broadcast.
#[derive(Debug)]
pub struct SubscriberFailure {
    /// Position of the subscriber in registration order.
    pub index: usize,
    /// Concrete type name of the subscriber.
    pub subscriber: &'static str,
    /// The subscriber's error, unchanged.
    pub error: HandlerError,
}

/// Every failure observed during one broadcast.
///
/// Produced only after all subscribers have completed. Failures are sorted
/// by registration index. `Display` already lists every failure, so there is
/// no `source()`; walk [`failures`](Self::failures) instead.
#[derive(Debug)]
pub struct BroadcastError {
    event_type: &'static str,
    subscribers: usize,
    failures: Vec<SubscriberFailure>,
}

impl BroadcastError {
    /// Creates the aggregate. `failures` must not be empty.
    pub fn new(
        event_type: &'static str,
        subscribers: usize,
        mut failures: Vec<SubscriberFailure>,
    ) -> Self {
        failures.sort_by_key(|failure| failure.index);
        Self {
            event_type,
            subscribers,
            failures,
        }
    }

    /// Name of the broadcast event type.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// How many subscribers were invoked.
    pub fn subscribers(&self) -> usize {
        self.subscribers
    }

    /// The failures, in registration order.
    pub fn failures(&self) -> &[SubscriberFailure] {
        &self.failures
    }

    /// Consumes the aggregate, returning the failures.
    pub fn into_failures(self) -> Vec<SubscriberFailure> {
        self.failures
    }
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "broadcast of '{}' failed in {} of {} subscriber(s)",
            self.event_type,
            self.failures.len(),
            self.subscribers
        )?;
        for failure in &self.failures {
            write!(
                f,
                "; #{} {}: {}",
                failure.index, failure.subscriber, failure.error
            )?;
        }
        Ok(())
    }
}

impl StdError for BroadcastError {}
