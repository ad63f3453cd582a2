//! Handler-shape descriptors produced by the classifier.

use std::fmt;

use crate::key::{MessageType, ServiceKey, TypeKey};
use crate::locator::ServiceFactory;

/// The capability shape a handler registration satisfies, with the message
/// type(s) it is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `CommandHandler<command>`
    CommandHandler { command: MessageType },
    /// `CommandHandlerWithResponse<command, response>`
    CommandHandlerWithResponse {
        command: MessageType,
        response: MessageType,
    },
    /// `EventSubscriber<event>`
    EventSubscriber { event: MessageType },
}

impl Shape {
    /// The message type this shape is keyed on.
    pub fn message(&self) -> MessageType {
        match self {
            Self::CommandHandler { command } => *command,
            Self::CommandHandlerWithResponse { command, .. } => *command,
            Self::EventSubscriber { event } => *event,
        }
    }

    /// The response type, for `CommandHandlerWithResponse` only.
    pub fn response(&self) -> Option<MessageType> {
        match self {
            Self::CommandHandlerWithResponse { response, .. } => Some(*response),
            _ => None,
        }
    }

    /// Subscriber entries collect every registration; command entries resolve
    /// to a single handler.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::EventSubscriber { .. })
    }

    /// Name of the contract, without type parameters.
    pub fn contract(&self) -> &'static str {
        match self {
            Self::CommandHandler { .. } => "CommandHandler",
            Self::CommandHandlerWithResponse { .. } => "CommandHandlerWithResponse",
            Self::EventSubscriber { .. } => "EventSubscriber",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.response() {
            Some(response) => write!(f, "{}<{}, {}>", self.contract(), self.message(), response),
            None => write!(f, "{}<{}>", self.contract(), self.message()),
        }
    }
}

/// One classified `(handler type implements shape)` pair, ready to be
/// registered into a [`ServiceCollection`](crate::ServiceCollection).
#[derive(Clone)]
pub struct HandlerDescriptor {
    handler: TypeKey,
    shape: Shape,
    key: ServiceKey,
    factory: ServiceFactory,
}

impl HandlerDescriptor {
    pub(crate) fn new(
        handler: TypeKey,
        shape: Shape,
        key: ServiceKey,
        factory: ServiceFactory,
    ) -> Self {
        Self {
            handler,
            shape,
            key,
            factory,
        }
    }

    /// The concrete handler type.
    pub fn handler(&self) -> TypeKey {
        self.handler
    }

    /// The shape this registration satisfies.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The locator key, i.e. the contract trait object.
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    /// Factory yielding an erased `Arc<dyn Contract<..>>`.
    pub fn factory(&self) -> &ServiceFactory {
        &self.factory
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("handler", &self.handler)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ship;
    struct Receipt;
    struct Shipped;

    #[test]
    fn test_shape_accessors() {
        let command = Shape::CommandHandler {
            command: MessageType::of::<Ship>(),
        };
        assert_eq!(command.message(), MessageType::of::<Ship>());
        assert_eq!(command.response(), None);
        assert!(!command.is_multi_valued());

        let request = Shape::CommandHandlerWithResponse {
            command: MessageType::of::<Ship>(),
            response: MessageType::of::<Receipt>(),
        };
        assert_eq!(request.response(), Some(MessageType::of::<Receipt>()));

        let event = Shape::EventSubscriber {
            event: MessageType::of::<Shipped>(),
        };
        assert!(event.is_multi_valued());
        assert_eq!(event.contract(), "EventSubscriber");
    }

    #[test]
    fn test_shape_display() {
        let request = Shape::CommandHandlerWithResponse {
            command: MessageType::of::<Ship>(),
            response: MessageType::of::<Receipt>(),
        };
        let text = request.to_string();
        assert!(text.starts_with("CommandHandlerWithResponse<"));
        assert!(text.contains("Ship, "));
        assert!(text.ends_with("Receipt>"));
    }
}
