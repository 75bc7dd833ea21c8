use crate::Queue;
use std::sync::Arc;
use thiserror::Error;

/// Defines the extent to which the message [`Publisher`](crate::Publisher)
/// should confirm successful sending.
///
/// If the confirmation level is set to the
/// [lowest level](ConfirmationLevel::Transmitted), then the confirmation of the
/// message is going to be a no-op, without any network communication. If,
/// however, the confirmation level is anywhere higher, the confirmation is
/// performed against the RabbitMQ broker asynchronously, and the publishing
/// implicitly switches to at-least-once publishing guarantee, which means that
/// some of the messages may be published multiple times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfirmationLevel {
    /// Ensures network transmission.
    Transmitted,

    /// Ensures network transmission **and** broker-side acceptance.
    Accepted,

    /// Ensures network transmission **and** broker-side acceptance **and** routing to a queue.
    Routed,
}

/// Defines the outbound path for messages being sent into a RabbitMQ broker.
///
/// The exchange is always the built-in default (unnamed) exchange, which
/// routes a message directly to the queue whose name equals the routing key.
/// For that reason an egress carries no exchange name and no separate routing
/// key: the [`Queue`] definition covers both addressing and declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Egress {
    name: Arc<str>,
    queue: Queue,
    confirmation: ConfirmationLevel,
}

impl Egress {
    /// Creates a new [`EgressBuilder`].
    pub fn builder() -> EgressBuilder {
        EgressBuilder::new()
    }
}

impl Egress {
    /// Reports the egress name for this definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the queue definition as part of this egress definition.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Reports the egress routing key, which on the default exchange is the
    /// queue name.
    pub fn routing_key(&self) -> &str {
        self.queue.name()
    }

    /// Reports the egress confirmation level for this definition.
    pub fn confirmation(&self) -> ConfirmationLevel {
        self.confirmation
    }
}

impl Egress {
    /// Reports whether this definition requires any sending confirmation beyond
    /// the bare minimum of network transmission. If so, this should prompt the
    /// publisher to enable publisher confirms on the RabbitMQ channel.
    pub(crate) fn requires_any_confirmation(&self) -> bool {
        match self.confirmation {
            ConfirmationLevel::Transmitted => false,
            ConfirmationLevel::Accepted => true,
            ConfirmationLevel::Routed => true,
        }
    }

    /// Reports whether this definition warrants a `mandatory` flag on the
    /// RabbitMQ `basic_publish` call.
    pub(crate) fn requires_mandatory_publish(&self) -> bool {
        match self.confirmation {
            ConfirmationLevel::Transmitted => false,
            ConfirmationLevel::Accepted => false,
            ConfirmationLevel::Routed => true,
        }
    }
}

/// Builds an [`Egress`] incrementally and validates it on the final stage.
#[derive(Debug)]
pub struct EgressBuilder {
    name: Arc<str>,
    queue: Queue,
    confirmation: ConfirmationLevel,
}

impl EgressBuilder {
    /// Creates a new [`Egress`] builder.
    pub fn new() -> Self {
        Self {
            name: Arc::from(Egress::default_name()),
            queue: Queue::named(""),
            confirmation: Egress::default_confirmation(),
        }
    }

    /// Recreates this egress definition builder with the given name.
    pub fn with_name(self, name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            ..self
        }
    }

    /// Recreates this egress definition builder with the given queue.
    pub fn with_queue(self, queue: Queue) -> Self {
        Self { queue, ..self }
    }

    /// Recreates this egress definition builder with a queue with the given
    /// name.
    pub fn with_queue_named(self, queue: impl AsRef<str>) -> Self {
        Self {
            queue: Queue::named(queue),
            ..self
        }
    }

    /// Recreates this egress definition builder with the given confirmation
    /// level.
    pub fn with_confirmation(self, confirmation: ConfirmationLevel) -> Self {
        Self {
            confirmation,
            ..self
        }
    }

    /// Finalizes the builder, validates its state, and, assuming valid state,
    /// returns the [`Egress`].
    ///
    /// On the default exchange the queue name doubles as the routing key, so
    /// an egress with an empty queue name is unroutable and is rejected here.
    pub fn build(self) -> Result<Egress, EgressError> {
        if self.queue.is_empty() {
            return Err(EgressError::MissingQueueName {
                egress: self.name.to_string(),
            });
        }

        Ok(Egress {
            name: self.name,
            queue: self.queue,
            confirmation: self.confirmation,
        })
    }
}

impl Egress {
    fn default_name() -> &'static str {
        "default"
    }

    fn default_confirmation() -> ConfirmationLevel {
        ConfirmationLevel::Transmitted
    }
}

/// Represents the error states of a RabbitMQ egress definition.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EgressError {
    /// Indicates the absence of a queue name where it is required.
    #[error(
        "invalid configuration for egress '{egress}': the default exchange requires a non-empty queue name"
    )]
    MissingQueueName {
        /// Egress name
        egress: String,
    },
}

impl AsRef<Egress> for Egress {
    fn as_ref(&self) -> &Egress {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_defaults() {
        // When
        let egress = Egress::builder().with_queue_named("test_queue").build().unwrap();

        // Then
        assert_eq!(egress.name(), "default");
        assert_eq!(egress.queue().name(), "test_queue");
        assert_eq!(egress.routing_key(), "test_queue");
        assert_eq!(egress.confirmation(), ConfirmationLevel::Transmitted);
        assert!(!egress.requires_any_confirmation());
        assert!(!egress.requires_mandatory_publish());
    }

    #[test]
    fn builder_full() {
        // When
        let egress = Egress::builder()
            .with_name("test_egress")
            .with_queue(Queue::named("test_queue").with_durable(true))
            .with_confirmation(ConfirmationLevel::Routed)
            .build()
            .unwrap();

        // Then
        assert_eq!(egress.name(), "test_egress");
        assert!(egress.queue().durable());
        assert!(egress.requires_any_confirmation());
        assert!(egress.requires_mandatory_publish());
    }

    #[test]
    fn builder_rejects_empty_queue_name() {
        // When
        let result = Egress::builder().with_name("test_egress").build();

        // Then
        assert_eq!(
            result.unwrap_err(),
            EgressError::MissingQueueName {
                egress: "test_egress".to_string(),
            },
        );
    }

    #[test]
    fn confirmation_levels() {
        // Given
        let accepted = Egress::builder()
            .with_queue_named("test_queue")
            .with_confirmation(ConfirmationLevel::Accepted)
            .build()
            .unwrap();

        // Then
        assert!(accepted.requires_any_confirmation());
        assert!(!accepted.requires_mandatory_publish());
    }
}
