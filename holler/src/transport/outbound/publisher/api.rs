use crate::transport::outbound::publisher::inner::{NotConfirmed, NotTransmitted};
use crate::Dispatch;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Shorthand for a result of a single publishing attempt.
pub type PublishingResult = Result<Dispatch, PublishingError>;

/// Represents a failed publishing of a single RabbitMQ message.
#[derive(Error, Debug)]
#[error("failed to publish a RabbitMQ message: {failure}")]
pub struct PublishingError {
    /// The message that failed to get published.
    pub dispatch: Dispatch,
    /// The high-level explanation of the failure.
    pub failure: PublishingFailure,
}

/// Explains what exactly went wrong in publishing a single RabbitMQ message.
#[derive(Debug)]
pub enum PublishingFailure {
    /// The message was not transmitted to the broker.
    NotTransmitted,
    /// The message was negatively acknowledged by the broker (not routed to an
    /// exchange or a queue, depending on confirmation level).
    NegativelyAcknowledged,
    /// The broker suffered an internal error during acknowledgement of the
    /// message.
    BrokerError,
    /// Failed to retrieve the acknowledgement from the broker.
    CommunicationError,
}

impl PublishingError {
    /// Reports whether this error may reasonably be expected to go away when
    /// the same message is published again against a healthy deployment.
    pub fn is_transient(&self) -> bool {
        self.failure.is_transient()
    }
}

impl PublishingFailure {
    /// Reports whether this failure may reasonably be expected to go away when
    /// the same message is published again against a healthy deployment.
    ///
    /// A negative acknowledgement means the broker had nowhere to route the
    /// message, which is a topology problem that a retry alone will not fix.
    /// The other failures describe connectivity or broker hiccups.
    pub fn is_transient(&self) -> bool {
        match self {
            PublishingFailure::NegativelyAcknowledged => false,
            PublishingFailure::NotTransmitted
            | PublishingFailure::BrokerError
            | PublishingFailure::CommunicationError => true,
        }
    }
}

impl Display for PublishingFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishingFailure::NotTransmitted => {
                f.write_str("the message was not transmitted to the broker")
            }
            PublishingFailure::NegativelyAcknowledged => f.write_str(concat!(
                "the message was negatively acknowledged by the broker",
                " (not routed to an exchange or a queue, depending on",
                " confirmation level)",
            )),
            PublishingFailure::BrokerError => f.write_str(
                "the broker suffered an internal error during acknowledgement of the message",
            ),
            PublishingFailure::CommunicationError => {
                f.write_str("failed to retrieve the acknowledgement from the broker")
            }
        }
    }
}

impl From<NotTransmitted> for PublishingError {
    fn from(value: NotTransmitted) -> Self {
        Self {
            dispatch: value.dispatch,
            failure: PublishingFailure::NotTransmitted,
        }
    }
}

impl From<NotConfirmed> for PublishingError {
    fn from(value: NotConfirmed) -> Self {
        match value {
            NotConfirmed::Negative(dispatch, _return) => Self {
                dispatch,
                failure: PublishingFailure::NegativelyAcknowledged,
            },
            NotConfirmed::BrokerError(dispatch, _return) => Self {
                dispatch,
                failure: PublishingFailure::BrokerError,
            },
            NotConfirmed::ConfirmationError(dispatch, _error) => Self {
                dispatch,
                failure: PublishingFailure::CommunicationError,
            },
        }
    }
}
