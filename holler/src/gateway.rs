use crate::Handle;
use lapin::{Channel, Connection, ConnectionProperties, Error as LapinError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// An established connection to a RabbitMQ broker, created from a [`Handle`].
///
/// A gateway makes a single connection attempt when [created](Gateway::connect)
/// and holds exactly one [`Connection`] for its entire lifetime. It hands out
/// fresh [`Channel`]s on that connection on demand, and it is expected to be
/// explicitly [closed](Gateway::close) before the process exits.
///
/// There is no reconnection logic: if the connection is lost, the operations on
/// the channels created from this gateway start failing, and the failures
/// surface as errors to the caller. Recovering means closing this gateway and
/// connecting a new one.
pub struct Gateway {
    /// The password-free identifier of the [`Handle`] behind this gateway, for
    /// logging/debugging purposes.
    identifier: Arc<str>,
    /// The connection to the RabbitMQ broker.
    connection: Connection,
}

impl Gateway {
    /// Makes a single attempt to connect to the RabbitMQ broker behind the
    /// given [`Handle`].
    ///
    /// Both an unreachable broker and a rejected authentication surface here as
    /// a [`ConnectionError`]. Use
    /// [`is_transient`](ConnectionError::is_transient) on the error to tell the
    /// two apart.
    pub async fn connect(handle: impl AsRef<Handle>) -> Result<Self, ConnectionError> {
        let handle = handle.as_ref();
        let identifier: Arc<str> = Arc::from(handle.identifier());

        // Set up the connection properties to use the current Tokio context
        let connection_properties = ConnectionProperties::default()
            .with_executor(tokio_executor_trait::Tokio::current())
            .with_reactor(tokio_reactor_trait::Tokio);

        // Establish a connection
        let connection_result =
            Connection::connect(handle.dsn().unsecure(), connection_properties).await;

        // Check the result
        match connection_result {
            Ok(connection) => {
                info!(
                    identifier = identifier.as_ref(),
                    "Connected to RabbitMQ",
                );

                Ok(Self {
                    identifier,
                    connection,
                })
            }
            Err(error) => {
                warn!(
                    identifier = identifier.as_ref(),
                    ?error,
                    error_message = %error,
                    "Failed to establish a RabbitMQ connection",
                );

                Err(ConnectionError::Connection {
                    identifier,
                    source: error,
                })
            }
        }
    }

    /// Creates a fresh [`Channel`] on this gateway’s connection.
    pub async fn open_channel(&self) -> Result<Channel, ConnectionError> {
        // Try to create a channel
        let channel_result = self.connection.create_channel().await;

        // Inspect the result
        match channel_result {
            Ok(channel) => Ok(channel),
            Err(error) => {
                warn!(
                    identifier = self.identifier.as_ref(),
                    ?error,
                    error_message = %error,
                    "Failed to create a RabbitMQ channel",
                );

                Err(ConnectionError::Channel {
                    identifier: Arc::clone(&self.identifier),
                    source: error,
                })
            }
        }
    }

    /// Reports the password-free identifier of the [`Handle`] behind this
    /// gateway.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Closes the underlying connection, consuming this gateway.
    ///
    /// The outcome is reported in the logs but otherwise swallowed: a
    /// connection that was already lost has nothing left to close, and by the
    /// time this method is called the process is normally on its way out.
    pub async fn close(self) {
        // Close the connection
        let result = self.connection.close(0, "Client shutdown").await;

        // Check and report the outcome
        match result {
            Ok(_) => info!(
                identifier = self.identifier.as_ref(),
                "Closed the RabbitMQ connection",
            ),
            Err(LapinError::InvalidConnectionState(_)) => info!(
                identifier = self.identifier.as_ref(),
                "Discarded a previously lost RabbitMQ connection",
            ),
            Err(LapinError::InvalidChannelState(state)) => info!(
                identifier = self.identifier.as_ref(),
                "Ignored a channel in the invalid state '{:?}' while closing the RabbitMQ connection",
                state,
            ),
            Err(error) => warn!(
                identifier = self.identifier.as_ref(),
                ?error,
                error_message = %error,
                "Failed to cleanly close the RabbitMQ connection",
            ),
        }
    }
}

/// Represents failure to establish a session with the RabbitMQ broker: either
/// the connection itself could not be made, or the connection stands but a
/// channel could not be created on it.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish the connection to the broker. Covers both an
    /// unreachable broker and a rejected authentication.
    #[error("failed to connect to RabbitMQ at '{identifier}': {source}")]
    Connection {
        /// The password-free identifier of the [`Handle`] that was used.
        identifier: Arc<str>,
        /// The underlying client error.
        #[source]
        source: LapinError,
    },
    /// The connection stands, but a channel could not be created on it.
    #[error("failed to open a RabbitMQ channel at '{identifier}': {source}")]
    Channel {
        /// The password-free identifier of the [`Handle`] that was used.
        identifier: Arc<str>,
        /// The underlying client error.
        #[source]
        source: LapinError,
    },
}

impl ConnectionError {
    /// Reports the password-free identifier of the [`Handle`] that was used in
    /// the failed attempt.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Connection { identifier, .. } => identifier,
            Self::Channel { identifier, .. } => identifier,
        }
    }

    /// Reports whether this error may reasonably be expected to go away on a
    /// retry against a healthy deployment.
    ///
    /// An unreachable broker or a lost connection is transient. A rejected
    /// authentication, which arrives as a protocol error, is not: the
    /// credentials must change before a retry can succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { source, .. } => is_transient_lapin_error(source),
            Self::Channel { source, .. } => is_transient_lapin_error(source),
        }
    }
}

/// Judges whether the given client error describes a connectivity failure (and
/// could thus resolve on its own) rather than a protocol-level rejection (which
/// requires a configuration change).
pub(crate) fn is_transient_lapin_error(error: &LapinError) -> bool {
    matches!(
        error,
        LapinError::IOError(_)
            | LapinError::InvalidConnectionState(_)
            | LapinError::InvalidChannelState(_)
    )
}
