//! Candidate types: the input of handler discovery.
//!
//! A [`CandidateType`] describes one concrete type together with the
//! contracts it declares. Declarations are compile-time checked: each
//! builder method is bounded on the matching contract, so a type cannot
//! claim a shape it does not implement.
//!
//! ```rust,ignore
//! let candidate = CandidateType::of::<Inventory>()
//!     .handles::<ReserveStock>()
//!     .subscribes::<OrderCancelled>()
//!     .subscribes::<OrderShipped>()
//!     .build();
//! ```
//!
//! Declarations for contracts the mediator does not know about may be
//! recorded with [`CandidateBuilder::declares`]; the classifier skips them.

use std::fmt;
use std::sync::Arc;

use crate::contracts::{CommandHandler, CommandHandlerWithResponse, EventSubscriber};
use crate::descriptor::Shape;
use crate::key::{MessageType, ServiceKey, TypeKey};
use crate::locator::{ServiceArc, ServiceFactory, ServiceProvider};

/// A single contract declared by a candidate.
#[derive(Clone)]
pub enum Declaration {
    /// One of the three mediator contracts.
    Contract {
        shape: Shape,
        key: ServiceKey,
        factory: ServiceFactory,
    },
    /// Any other contract, recorded by name only.
    Foreign { contract: &'static str },
}

impl Declaration {
    /// The shape, if this is a mediator contract.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Self::Contract { shape, .. } => Some(*shape),
            Self::Foreign { .. } => None,
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract { shape, .. } => write!(f, "{shape}"),
            Self::Foreign { contract } => write!(f, "{contract}"),
        }
    }
}

/// A concrete type offered for handler discovery.
#[derive(Clone)]
pub struct CandidateType {
    handler: TypeKey,
    declarations: Vec<Declaration>,
}

impl CandidateType {
    /// Starts describing `T`, constructed through `Default` on each resolution.
    pub fn of<T>() -> CandidateBuilder<T>
    where
        T: Default + Send + Sync + 'static,
    {
        Self::with_factory(|_: &ServiceProvider| T::default())
    }

    /// Starts describing `T`, constructed by `factory` on each resolution.
    ///
    /// The factory receives the provider so handlers can pull their own
    /// dependencies out of the locator.
    pub fn with_factory<T, F>(factory: F) -> CandidateBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> T + Send + Sync + 'static,
    {
        CandidateBuilder {
            make: Arc::new(factory),
            declarations: Vec::new(),
        }
    }

    /// The concrete type this candidate describes.
    pub fn handler(&self) -> TypeKey {
        self.handler
    }

    /// All declarations, in declaration order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Appends the declarations of `other`, which must describe the same type.
    ///
    /// Declarations already present in `self` are skipped, so a contract
    /// declared twice still yields one registration. Returns `false` (and
    /// leaves `self` untouched) when the types differ.
    pub fn merge(&mut self, other: CandidateType) -> bool {
        if self.handler != other.handler {
            return false;
        }
        for declaration in other.declarations {
            if !self.declares_same(&declaration) {
                self.declarations.push(declaration);
            }
        }
        true
    }

    fn declares_same(&self, declaration: &Declaration) -> bool {
        self.declarations
            .iter()
            .any(|existing| match (existing, declaration) {
                (Declaration::Contract { key: a, .. }, Declaration::Contract { key: b, .. }) => {
                    a == b
                }
                (
                    Declaration::Foreign { contract: a },
                    Declaration::Foreign { contract: b },
                ) => a == b,
                _ => false,
            })
    }
}

impl fmt::Debug for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateType")
            .field("handler", &self.handler)
            .field("declarations", &self.declarations)
            .finish()
    }
}

type Constructor<T> = Arc<dyn Fn(&ServiceProvider) -> T + Send + Sync>;

/// Builder returned by [`CandidateType::of`] and [`CandidateType::with_factory`].
pub struct CandidateBuilder<T> {
    make: Constructor<T>,
    declarations: Vec<Declaration>,
}

impl<T> CandidateBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Declares `T: CommandHandler<C>`.
    pub fn handles<C>(mut self) -> Self
    where
        T: CommandHandler<C>,
        C: Send + 'static,
    {
        let make = Arc::clone(&self.make);
        let factory: ServiceFactory = Arc::new(move |provider: &ServiceProvider| {
            let handler: Arc<dyn CommandHandler<C>> = Arc::new(make(provider));
            Arc::new(handler) as ServiceArc
        });
        self.declarations.push(Declaration::Contract {
            shape: Shape::CommandHandler {
                command: MessageType::of::<C>(),
            },
            key: ServiceKey::of::<dyn CommandHandler<C>>(),
            factory,
        });
        self
    }

    /// Declares `T: CommandHandlerWithResponse<C, R>`.
    pub fn responds<C, R>(mut self) -> Self
    where
        T: CommandHandlerWithResponse<C, R>,
        C: Send + 'static,
        R: Send + 'static,
    {
        let make = Arc::clone(&self.make);
        let factory: ServiceFactory = Arc::new(move |provider: &ServiceProvider| {
            let handler: Arc<dyn CommandHandlerWithResponse<C, R>> = Arc::new(make(provider));
            Arc::new(handler) as ServiceArc
        });
        self.declarations.push(Declaration::Contract {
            shape: Shape::CommandHandlerWithResponse {
                command: MessageType::of::<C>(),
                response: MessageType::of::<R>(),
            },
            key: ServiceKey::of::<dyn CommandHandlerWithResponse<C, R>>(),
            factory,
        });
        self
    }

    /// Declares `T: EventSubscriber<E>`.
    pub fn subscribes<E>(mut self) -> Self
    where
        T: EventSubscriber<E>,
        E: Sync + 'static,
    {
        let make = Arc::clone(&self.make);
        let factory: ServiceFactory = Arc::new(move |provider: &ServiceProvider| {
            let subscriber: Arc<dyn EventSubscriber<E>> = Arc::new(make(provider));
            Arc::new(subscriber) as ServiceArc
        });
        self.declarations.push(Declaration::Contract {
            shape: Shape::EventSubscriber {
                event: MessageType::of::<E>(),
            },
            key: ServiceKey::of::<dyn EventSubscriber<E>>(),
            factory,
        });
        self
    }

    /// Records a contract the mediator does not handle.
    pub fn declares(mut self, contract: &'static str) -> Self {
        self.declarations.push(Declaration::Foreign { contract });
        self
    }

    /// Finishes the description.
    pub fn build(self) -> CandidateType {
        CandidateType {
            handler: TypeKey::of::<T>(),
            declarations: self.declarations,
        }
    }
}

impl<T: Send + Sync + 'static> From<CandidateBuilder<T>> for CandidateType {
    fn from(builder: CandidateBuilder<T>) -> Self {
        builder.build()
    }
}
