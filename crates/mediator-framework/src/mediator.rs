//! The dispatcher.
//!
//! [`Mediator`] routes a typed message to the handler(s) registered for that
//! exact type. It supports two delivery semantics:
//!
//! - **single responder**: [`send_command`](Mediator::send_command) and
//!   [`send_command_with_response`](Mediator::send_command_with_response)
//!   resolve exactly one handler and fail with
//!   [`DispatchError::UnhandledMessage`] when none is registered;
//! - **fan-out**: [`notify`](Mediator::notify) invokes subscribers one at a
//!   time in registration order and stops at the first failure, while
//!   [`broadcast`](Mediator::broadcast) starts them all at once and waits
//!   for every one of them.
//!
//! ```rust,ignore
//! let mediator = provider.get::<Mediator>().unwrap();
//!
//! mediator.send_command(PlaceOrder { id: 7 }).await?;
//! let total: Money = mediator.send_command_with_response(QuoteOrder { id: 7 }).await?;
//! mediator.notify(&OrderPlaced { id: 7 }).await?;
//! mediator.broadcast(&OrderPlaced { id: 7 }).await?;
//! ```
//!
//! Handler failures are relayed verbatim; the dispatcher neither retries nor
//! logs them.

use std::any::type_name;
use std::fmt;

use futures::future::join_all;
use mediator_core::{
    BroadcastError, CommandHandler, CommandHandlerWithResponse, DispatchError, DispatchResult,
    EventSubscriber, ServiceProvider, SubscriberFailure,
};
use tracing::{Instrument, Level, span, trace};

/// Routes messages to handlers resolved from a [`ServiceProvider`].
///
/// Cheap to clone; every clone shares the same read-only registry.
#[derive(Clone)]
pub struct Mediator {
    provider: ServiceProvider,
}

impl Mediator {
    /// Creates a mediator resolving handlers from `provider`.
    pub fn new(provider: ServiceProvider) -> Self {
        Self { provider }
    }

    /// The provider handlers are resolved from.
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    /// Sends a command to its single responsible handler.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnhandledMessage`] if no handler is registered for
    /// `C`, otherwise the handler's own error as [`DispatchError::Handler`].
    pub async fn send_command<C>(&self, command: C) -> DispatchResult<()>
    where
        C: Send + 'static,
    {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            operation = "send_command",
            message_type = type_name::<C>()
        );
        async move {
            let handler = self
                .provider
                .get::<dyn CommandHandler<C>>()
                .ok_or_else(DispatchError::unhandled::<C>)?;
            handler
                .handle_command(command)
                .await
                .map_err(DispatchError::Handler)
        }
        .instrument(span)
        .await
    }

    /// Sends a command to its single responsible handler and returns the
    /// handler's response.
    ///
    /// The handler is looked up by the exact `(C, R)` pair.
    pub async fn send_command_with_response<C, R>(&self, command: C) -> DispatchResult<R>
    where
        C: Send + 'static,
        R: Send + 'static,
    {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            operation = "send_command_with_response",
            message_type = type_name::<C>(),
            response = type_name::<R>()
        );
        async move {
            let handler = self
                .provider
                .get::<dyn CommandHandlerWithResponse<C, R>>()
                .ok_or_else(DispatchError::unhandled::<C>)?;
            handler
                .handle_command(command)
                .await
                .map_err(DispatchError::Handler)
        }
        .instrument(span)
        .await
    }

    /// Delivers an event to every subscriber, one at a time, in registration
    /// order.
    ///
    /// The first failing subscriber ends the notification: its error is
    /// returned and later subscribers are not invoked. No subscribers is not
    /// an error.
    pub async fn notify<E>(&self, event: &E) -> DispatchResult<()>
    where
        E: Sync + 'static,
    {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            operation = "notify",
            message_type = type_name::<E>()
        );
        async move {
            let subscribers = self.provider.get_all_named::<dyn EventSubscriber<E>>();
            trace!(subscribers = subscribers.len(), "Notifying subscribers");

            for (subscriber, handler) in subscribers {
                trace!(subscriber, "Invoking subscriber");
                handler
                    .handle_notification(event)
                    .await
                    .map_err(DispatchError::Handler)?;
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Delivers an event to every subscriber concurrently and waits for all
    /// of them.
    ///
    /// A failing subscriber never cancels the others. When any fail, every
    /// failure is returned in a [`BroadcastError`] tagged with the
    /// subscriber's registration index. No subscribers is not an error.
    pub async fn broadcast<E>(&self, event: &E) -> DispatchResult<()>
    where
        E: Sync + 'static,
    {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            operation = "broadcast",
            message_type = type_name::<E>()
        );
        async move {
            let subscribers = self.provider.get_all_named::<dyn EventSubscriber<E>>();
            if subscribers.is_empty() {
                return Ok(());
            }
            trace!(subscribers = subscribers.len(), "Broadcasting to subscribers");

            let results = join_all(
                subscribers
                    .iter()
                    .map(|(_, handler)| handler.handle_notification(event)),
            )
            .await;

            let failures: Vec<SubscriberFailure> = results
                .into_iter()
                .zip(&subscribers)
                .enumerate()
                .filter_map(|(index, (result, &(subscriber, _)))| {
                    result.err().map(|error| SubscriberFailure {
                        index,
                        subscriber,
                        error,
                    })
                })
                .collect();

            if failures.is_empty() {
                Ok(())
            } else {
                Err(BroadcastError::new(type_name::<E>(), subscribers.len(), failures).into())
            }
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("provider", &self.provider)
            .finish()
    }
}
