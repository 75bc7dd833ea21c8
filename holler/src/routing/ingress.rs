use crate::Queue;
use std::sync::Arc;
use thiserror::Error;

/// Defines the inbound path for messages being consumed from a RabbitMQ
/// broker.
///
/// An ingress names the queue to consume from; the name under which the
/// ingress itself is known is used as a prefix when composing a unique
/// consumer tag for every [`Subscriber`](crate::Subscriber) started from this
/// definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingress {
    name: Arc<str>,
    queue: Queue,
}

impl Ingress {
    /// Creates a new [`IngressBuilder`].
    pub fn builder() -> IngressBuilder {
        IngressBuilder::new()
    }
}

impl Ingress {
    /// Reports the ingress name for this definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the queue definition as part of this ingress definition.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

/// Builds an [`Ingress`] incrementally and validates it on the final stage.
#[derive(Debug)]
pub struct IngressBuilder {
    name: Arc<str>,
    queue: Queue,
}

impl IngressBuilder {
    /// Creates a new [`Ingress`] builder.
    pub fn new() -> Self {
        Self {
            name: Arc::from(Ingress::default_name()),
            queue: Queue::named(""),
        }
    }

    /// Recreates this ingress definition builder with the given name.
    pub fn with_name(self, name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            ..self
        }
    }

    /// Recreates this ingress definition builder with the given queue.
    pub fn with_queue(self, queue: Queue) -> Self {
        Self { queue, ..self }
    }

    /// Recreates this ingress definition builder with a queue with the given
    /// name.
    pub fn with_queue_named(self, queue: impl AsRef<str>) -> Self {
        Self {
            queue: Queue::named(queue),
            ..self
        }
    }

    /// Finalizes the builder, validates its state, and, assuming valid state,
    /// returns the [`Ingress`].
    ///
    /// The consumer must address the same queue the producer addresses, so an
    /// ingress with an empty queue name (which would make the broker generate
    /// a random one) is rejected here.
    pub fn build(self) -> Result<Ingress, IngressError> {
        if self.queue.is_empty() {
            return Err(IngressError::MissingQueueName {
                ingress: self.name.to_string(),
            });
        }

        Ok(Ingress {
            name: self.name,
            queue: self.queue,
        })
    }
}

impl Ingress {
    fn default_name() -> &'static str {
        "default"
    }
}

/// Represents the error states of a RabbitMQ ingress definition.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IngressError {
    /// Indicates the absence of a queue name where it is required.
    #[error(
        "invalid configuration for ingress '{ingress}': expected a non-empty queue name"
    )]
    MissingQueueName {
        /// Ingress name
        ingress: String,
    },
}

impl AsRef<Ingress> for Ingress {
    fn as_ref(&self) -> &Ingress {
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
        let ingress = Ingress::builder().with_queue_named("test_queue").build().unwrap();

        // Then
        assert_eq!(ingress.name(), "default");
        assert_eq!(ingress.queue().name(), "test_queue");
    }

    #[test]
    fn builder_full() {
        // When
        let ingress = Ingress::builder()
            .with_name("test_ingress")
            .with_queue(Queue::named("test_queue").with_exclusive(true))
            .build()
            .unwrap();

        // Then
        assert_eq!(ingress.name(), "test_ingress");
        assert!(ingress.queue().exclusive());
    }

    #[test]
    fn builder_rejects_empty_queue_name() {
        // When
        let result = Ingress::builder().build();

        // Then
        assert_eq!(
            result.unwrap_err(),
            IngressError::MissingQueueName {
                ingress: "default".to_string(),
            },
        );
    }
}
