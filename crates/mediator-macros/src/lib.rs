//! Procedural macros for the mediator.
//!
//! - `#[handler]` - Registers a contract impl block in the link-time handler table
//!
//! # Handler Attribute
//!
//! Put `#[handler]` on an impl of one of the three mediator contracts. The
//! impl is left unchanged; an entry describing it is added to
//! `mediator::core::HANDLER_TABLE`, where `add_mediator` picks it up when the
//! declaring crate is in scope.
//!
//! ```rust,ignore
//! use mediator::prelude::*;
//!
//! #[derive(Default)]
//! struct Inventory;
//!
//! #[handler]
//! #[async_trait]
//! impl CommandHandler<ReserveStock> for Inventory {
//!     async fn handle_command(&self, command: ReserveStock) -> HandlerResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

mod handler;

use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

/// Registers a handler impl block at link time.
///
/// Accepted impls:
///
/// - `impl CommandHandler<C> for T`
/// - `impl CommandHandlerWithResponse<C, R> for T`
/// - `impl EventSubscriber<E> for T`
///
/// # Attributes
///
/// - `#[handler(factory = path)]` - Build `T` with `fn(&ServiceProvider) -> T`
///   instead of `Default`
/// - `#[handler(core = path)]` - Path of the `mediator-core` crate
///   (default: `::mediator::core`)
///
/// Generic impls are rejected: the table can only hold concrete types.
#[proc_macro_attribute]
pub fn handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = handler::HandlerArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as ItemImpl);

    match handler::expand(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
