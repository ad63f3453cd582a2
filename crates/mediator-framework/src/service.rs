//! Tower adapters over the dispatcher.
//!
//! The mediator itself has no timeouts or cancellation. Callers who need
//! them wrap one of these services in ordinary tower layers:
//!
//! ```rust,ignore
//! use tower::{ServiceBuilder, ServiceExt};
//!
//! let svc = ServiceBuilder::new()
//!     .timeout(Duration::from_secs(2))
//!     .service(mediator.command_service::<PlaceOrder>());
//!
//! svc.oneshot(PlaceOrder { id: 7 }).await?;
//! ```
//!
//! Event services take `Arc<E>` requests since the dispatcher borrows the
//! event for the whole delivery.

use std::marker::PhantomData;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use mediator_core::DispatchError;
use tower::Service;

use crate::mediator::Mediator;

macro_rules! adapter {
    ($(#[$meta:meta])* $name:ident<$($param:ident),+>) => {
        $(#[$meta])*
        pub struct $name<$($param),+> {
            mediator: Mediator,
            _marker: PhantomData<fn($($param),+)>,
        }

        impl<$($param),+> $name<$($param),+> {
            pub(crate) fn new(mediator: Mediator) -> Self {
                Self {
                    mediator,
                    _marker: PhantomData,
                }
            }
        }

        impl<$($param),+> Clone for $name<$($param),+> {
            fn clone(&self) -> Self {
                Self::new(self.mediator.clone())
            }
        }
    };
}

adapter! {
    /// `tower::Service<C>` calling [`Mediator::send_command`].
    CommandService<C>
}

adapter! {
    /// `tower::Service<C>` calling [`Mediator::send_command_with_response`].
    RequestService<C, R>
}

adapter! {
    /// `tower::Service<Arc<E>>` calling [`Mediator::notify`].
    NotifyService<E>
}

adapter! {
    /// `tower::Service<Arc<E>>` calling [`Mediator::broadcast`].
    BroadcastService<E>
}

impl<C> Service<C> for CommandService<C>
where
    C: Send + 'static,
{
    type Response = ();
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<(), DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, command: C) -> Self::Future {
        let mediator = self.mediator.clone();
        async move { mediator.send_command(command).await }.boxed()
    }
}

impl<C, R> Service<C> for RequestService<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    type Response = R;
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<R, DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, command: C) -> Self::Future {
        let mediator = self.mediator.clone();
        async move { mediator.send_command_with_response(command).await }.boxed()
    }
}

impl<E> Service<Arc<E>> for NotifyService<E>
where
    E: Send + Sync + 'static,
{
    type Response = ();
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<(), DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Arc<E>) -> Self::Future {
        let mediator = self.mediator.clone();
        async move { mediator.notify(event.as_ref()).await }.boxed()
    }
}

impl<E> Service<Arc<E>> for BroadcastService<E>
where
    E: Send + Sync + 'static,
{
    type Response = ();
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<(), DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Arc<E>) -> Self::Future {
        let mediator = self.mediator.clone();
        async move { mediator.broadcast(event.as_ref()).await }.boxed()
    }
}

impl Mediator {
    /// Tower service sending commands of type `C`.
    pub fn command_service<C: Send + 'static>(&self) -> CommandService<C> {
        CommandService::new(self.clone())
    }

    /// Tower service sending `C` and returning `R`.
    pub fn request_service<C: Send + 'static, R: Send + 'static>(&self) -> RequestService<C, R> {
        RequestService::new(self.clone())
    }

    /// Tower service notifying subscribers of `E` sequentially.
    pub fn notify_service<E: Send + Sync + 'static>(&self) -> NotifyService<E> {
        NotifyService::new(self.clone())
    }

    /// Tower service broadcasting `E` to all subscribers concurrently.
    pub fn broadcast_service<E: Send + Sync + 'static>(&self) -> BroadcastService<E> {
        BroadcastService::new(self.clone())
    }
}
