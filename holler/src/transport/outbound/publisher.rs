use crate::transport::outbound::publisher::api::PublishingResult;
use crate::transport::outbound::publisher::inner::{
    NotTransmitted, TransmissionResult, Transmitted,
};
use crate::transport::{declare_queue, DeclarationError};
use crate::{Dispatch, Egress, Gateway};
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::{BasicProperties, Channel, Error as LapinError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod api;
mod inner;

/// Publishes outgoing [`Dispatch`]es to the RabbitMQ broker.
///
/// ## Connection
///
/// A publisher [opens](Publisher::open) a dedicated [`Channel`] from a
/// [`Gateway`] and keeps that channel for its entire lifetime. Opening a
/// publisher also declares the target queue of its [`Egress`], so that
/// published messages have somewhere to land even when the consuming side has
/// not come up yet.
///
/// ## Configuration
///
/// All publishing configuration is off-loaded to [`Egress`].
///
/// One important part of the egress configuration is
/// [`ConfirmationLevel`](crate::ConfirmationLevel). This level has significant
/// consequences for the publishing process, as described in its documentation.
///
/// ## Publishing
///
/// Publishing a [`Dispatch`] to RabbitMQ is a two-step process:
///
/// 1. **Transmit** the dispatch payload over network to the broker.
/// 2. **Confirm** with the broker the successful reception of the message.
///
/// The [`publish`](Publisher::publish) method performs both steps and fails
/// fast: the first step that goes wrong surfaces as a
/// [`PublishingError`](crate::PublishingError), which carries the undelivered
/// dispatch. There is no internal retrying.
pub struct Publisher {
    /// The globally unique name of this publisher, for logging/debugging
    /// purposes.
    name: Arc<str>,
    /// The [`Egress`] used by this publisher to transport outgoing dispatches.
    egress: Egress,
    /// The dedicated [`Channel`] of this publisher.
    channel: Channel,
}

impl Publisher {
    /// Opens a new [`Publisher`] for the given [`Egress`] on a fresh
    /// [`Channel`] created from the given [`Gateway`].
    ///
    /// Opening includes declaring the egress queue and, if the egress
    /// [requires confirmation](crate::ConfirmationLevel), enabling publisher
    /// confirms on the channel. Every step is attempted once, and the first
    /// failure surfaces as a [`DeclarationError`].
    pub async fn open(gateway: &Gateway, egress: Egress) -> Result<Self, DeclarationError> {
        let name = Self::compose_name(&egress);

        // Open a dedicated channel
        let channel =
            gateway
                .open_channel()
                .await
                .map_err(|source| DeclarationError::Channel {
                    name: name.to_string(),
                    source,
                })?;

        // Declare the target queue
        declare_queue(&channel, &name, egress.queue()).await?;

        // Check if publisher confirms are required on the channel
        if egress.requires_any_confirmation() {
            // Enable publisher confirms
            let result = channel
                .confirm_select(ConfirmSelectOptions { nowait: false })
                .await;

            // Check the result
            if let Err(error) = result {
                // Report
                error!(
                    alert = true,
                    publisher = name.as_ref(),
                    ?error,
                    error_message = %error,
                    "Failed to enable publisher confirms on a RabbitMQ channel",
                );

                return Err(DeclarationError::ConfirmMode {
                    name: name.to_string(),
                    source: error,
                });
            }
        }

        Ok(Self {
            name,
            egress,
            channel,
        })
    }

    /// Composes a globally unique, human-readable name for this [`Publisher`].
    fn compose_name(egress: &Egress) -> Arc<str> {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        Arc::from(format!(
            "rabbitmq:pub:{}:{}",
            egress.name(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
        ))
    }
}

impl Publisher {
    /// Reports the name of this [`Publisher`].
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Publisher {
    /// Attempts once to publish a single [`Dispatch`] and returns an error as
    /// soon as something goes wrong.
    ///
    /// The provided dispatch is returned back to the caller, both in the happy
    /// path and in the case of an error. It is up to the caller to then either
    /// drop the dispatch or use it for a different purpose (e.g., publish it
    /// via a different [`Publisher`]).
    ///
    /// Note that the [`ConfirmationLevel`](crate::ConfirmationLevel) on this
    /// publisher’s [`Egress`] will significantly affect the publishing
    /// semantics.
    pub async fn publish(&self, dispatch: impl Into<Dispatch>) -> PublishingResult {
        // Dive in
        let dispatch = dispatch.into();

        // Transmit and fail fast
        let transmitted = self.try_transmit(dispatch).await?;

        // Confirm and fail fast again
        let confirmed = transmitted.confirm(self.name.as_ref()).await?;

        // Return the confirmed dispatch
        Ok(Dispatch::from(confirmed))
    }

    /// Closes the dedicated channel, consuming this publisher.
    ///
    /// The outcome is reported in the logs but otherwise swallowed.
    pub async fn close(self) {
        // Close the channel
        let result = self.channel.close(0, "Publisher closed").await;

        // Check and report the outcome
        match result {
            Ok(_) => info!(
                publisher = self.name.as_ref(),
                "Closed the RabbitMQ channel",
            ),
            Err(LapinError::InvalidChannelState(_)) | Err(LapinError::InvalidConnectionState(_)) => {
                info!(
                    publisher = self.name.as_ref(),
                    "Discarded a previously lost RabbitMQ channel",
                )
            }
            Err(error) => warn!(
                publisher = self.name.as_ref(),
                ?error,
                error_message = %error,
                "Failed to cleanly close a RabbitMQ channel",
            ),
        }
    }
}

impl Publisher {
    /// Attempts to transmit the given [`Dispatch`] once, and gives up as soon
    /// as anything goes wrong.
    async fn try_transmit(&self, dispatch: Dispatch) -> TransmissionResult {
        // Publish the message and store the initial result
        let result = self
            .channel
            .basic_publish(
                "", // the default exchange routes on the queue name
                self.egress.routing_key(),
                BasicPublishOptions {
                    mandatory: self.egress.requires_mandatory_publish(),
                    immediate: false, // this flag is not supported and ignored by RabbitMQ v3+
                },
                dispatch.bytes(),
                BasicProperties::default(),
            )
            .await;

        // Inspect whether the message was pushed successfully
        match result {
            // RabbitMQ received the message
            Ok(future_confirm) => Ok(Transmitted {
                dispatch,
                future_confirm,
            }),

            // RabbitMQ did not receive the message (likely a connectivity issue)
            Err(error) => {
                error!(
                    alert = true,
                    publisher = self.name.as_ref(),
                    ?error,
                    error_message = %error,
                    byte_preview = String::from_utf8_lossy(dispatch.bytes()).as_ref(),
                    "Failed to publish a message to RabbitMQ (did not transmit over network)",
                );
                Err(NotTransmitted { dispatch, error })
            }
        }
    }
}
