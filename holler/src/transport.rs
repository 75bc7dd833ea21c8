use crate::routing::queue::Queue;
use crate::ConnectionError;
use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Error as LapinError, Queue as LapinQueue};
use thiserror::Error;

/// Transports incoming messages
pub mod inbound;

/// Transports outgoing messages
pub mod outbound;

/// Represents failure to issue the declarations that are required before a
/// [`Publisher`](crate::Publisher) or a [`Subscriber`](crate::Subscriber) can
/// exchange messages with the broker.
///
/// Queue declarations are repeatable (assuming the queue properties don’t
/// change), so a declaration failure normally means that a queue by the same
/// name already exists on the broker with different properties. Such failures
/// are not fixable within the application.
#[derive(Error, Debug)]
pub enum DeclarationError {
    /// Failed to open the channel on which the declarations were to be issued.
    #[error("failed to open a RabbitMQ channel for '{name}': {source}")]
    Channel {
        /// The name of the publisher or subscriber that requested the channel.
        name: String,
        /// The underlying connection error.
        #[source]
        source: ConnectionError,
    },
    /// The queue declaration was rejected by the broker.
    #[error("failed to declare the RabbitMQ queue '{queue}' for '{name}': {source}")]
    Queue {
        /// The name of the publisher or subscriber that issued the declaration.
        name: String,
        /// The name of the queue that was being declared.
        queue: String,
        /// The underlying client error.
        #[source]
        source: LapinError,
    },
    /// Publisher confirms could not be enabled on the channel.
    #[error("failed to enable publisher confirms on a RabbitMQ channel for '{name}': {source}")]
    ConfirmMode {
        /// The name of the publisher that requested publisher confirms.
        name: String,
        /// The underlying client error.
        #[source]
        source: LapinError,
    },
}

impl DeclarationError {
    /// Reports whether this error may reasonably be expected to go away on a
    /// retry against a healthy deployment. A declaration rejected by the broker
    /// is not transient: it indicates a conflicting queue definition that must
    /// be fixed outside the application.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Channel { source, .. } => source.is_transient(),
            Self::Queue { source, .. } => crate::gateway::is_transient_lapin_error(source),
            Self::ConfirmMode { source, .. } => crate::gateway::is_transient_lapin_error(source),
        }
    }
}

/// Declares the given [`Queue`] on the given [`Channel`], on behalf of the
/// publisher or subscriber named `name`.
pub(crate) async fn declare_queue(
    channel: &Channel,
    name: &str,
    queue: &Queue,
) -> Result<LapinQueue, DeclarationError> {
    channel
        .queue_declare(
            queue.name(),
            QueueDeclareOptions {
                passive: false,
                durable: queue.durable(),
                exclusive: queue.exclusive(),
                auto_delete: queue.auto_delete(),
                nowait: false,
            },
            FieldTable::default(),
        )
        .await
        .map_err(|source| DeclarationError::Queue {
            name: name.to_string(),
            queue: queue.name().to_string(),
            source,
        })
}
