use crate::gateway::is_transient_lapin_error;
use crate::transport::inbound::envelope::DecoderError;
use crate::transport::{declare_queue, DeclarationError};
use crate::{Decoder, Envelope, Gateway, Ingress, NoopDecoder, StringDecoder};
use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::BasicConsumeOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Consumer as LapinConsumer, Error as LapinError, Result as LapinResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

/// Shorthand for a [`Subscriber`] that does not decode consumed messages.
pub type UndecodedSubscriber = Subscriber<(), NoopDecoder>;

/// Shorthand for a [`Subscriber`] that decodes messages into [`String`]s.
pub type StringSubscriber = Subscriber<String, StringDecoder>;

/// Receives incoming [`Envelope`]s from the RabbitMQ broker, passing them
/// through a pre-set [`Decoder`] before returning to the caller.
///
/// ## Connection
///
/// A subscriber [opens](Subscriber::open) a dedicated [`Channel`] from a
/// [`Gateway`], declares the queue of its [`Ingress`], and starts a single
/// consumer on that queue. Messages are consumed without acknowledgment: the
/// broker forgets a message the moment it is sent down the wire, so delivery
/// is at-most-once.
///
/// There is no reconnection logic. Once the underlying delivery stream ends
/// (normally because the connection is gone), [`receive`](Subscriber::receive)
/// keeps returning [`None`], and the subscriber is only good for
/// [closing](Subscriber::close).
pub struct Subscriber<T, D>
where
    D: Decoder<Result = T>,
{
    name: Arc<str>,
    channel: Channel,
    consumer: AsyncMutex<Option<LapinConsumer>>,
    decoder: D,
}

/// Represents the outcome of polling a single message from a [`LapinConsumer`].
enum PollOutcome<T> {
    /// Successfully polled and decoded an [`Envelope`].
    Envelope(Envelope<T>),
    /// A [`LapinError`] delivered from the [`LapinConsumer`].
    ConsumerError,
    /// A message is successfully polled, but could not be decoded.
    Gibberish,
    /// The [`LapinConsumer`] is permanently out of messages and cannot be used
    /// any further.
    OutOfMessages,
}

/// Represents failure to open a [`Subscriber`]: either the declarations that
/// must precede consuming could not be issued, or the consumer itself could
/// not be started on the declared queue.
#[derive(Error, Debug)]
pub enum SubscriptionError {
    /// Failed to declare the source queue, or to open a channel to declare it
    /// on.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    /// The consumer could not be started on the declared queue.
    #[error("failed to start a RabbitMQ consumer '{subscriber}': {source}")]
    ConsumerStart {
        /// The name of the subscriber that tried to start the consumer.
        subscriber: String,
        /// The underlying client error.
        #[source]
        source: LapinError,
    },
}

impl SubscriptionError {
    /// Reports whether this error may reasonably be expected to go away on a
    /// retry against a healthy deployment.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Declaration(error) => error.is_transient(),
            Self::ConsumerStart { source, .. } => is_transient_lapin_error(source),
        }
    }
}

impl<T, D> Subscriber<T, D>
where
    D: Decoder<Result = T>,
{
    /// Opens a new [`Subscriber`] for the given [`Ingress`] and [`Decoder`] on
    /// a fresh [`Channel`] created from the given [`Gateway`].
    ///
    /// Opening includes declaring the ingress queue and starting a consumer on
    /// it. Every step is attempted once, and the first failure surfaces as a
    /// [`SubscriptionError`].
    pub async fn open(
        gateway: &Gateway,
        ingress: Ingress,
        decoder: D,
    ) -> Result<Self, SubscriptionError> {
        let name = Self::compose_name(&ingress);

        // Open a dedicated channel
        let channel =
            gateway
                .open_channel()
                .await
                .map_err(|source| DeclarationError::Channel {
                    name: name.to_string(),
                    source,
                })?;

        // Declare the source queue
        let queue = declare_queue(&channel, &name, ingress.queue()).await?;

        // Initiate consuming of messages, using this subscriber’s name as the
        // consumer tag
        let consumer_result = channel
            .basic_consume(
                queue.name().as_str(),
                &name,
                BasicConsumeOptions {
                    no_local: false,
                    no_ack: true, // the broker forgets a message as soon as it is sent
                    exclusive: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await;

        // Inspect the result
        let consumer = match consumer_result {
            Ok(consumer) => consumer,
            Err(error) => {
                warn!(
                    alert = true,
                    subscriber = name.as_ref(),
                    ?error,
                    error_message = %error,
                    "Failed to start a RabbitMQ message consumer",
                );

                return Err(SubscriptionError::ConsumerStart {
                    subscriber: name.to_string(),
                    source: error,
                });
            }
        };

        Ok(Self {
            name,
            channel,
            consumer: AsyncMutex::new(Some(consumer)),
            decoder,
        })
    }

    /// Composes a globally unique, human-readable name for this [`Subscriber`].
    fn compose_name(ingress: &Ingress) -> Arc<str> {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        Arc::from(format!(
            "rabbitmq:sub:{}:{}",
            ingress.name(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
        ))
    }
}

impl Subscriber<(), NoopDecoder> {
    /// A shorthand for calling [`open`](Subscriber::open) with a
    /// [`NoopDecoder`].
    pub async fn open_undecoded(
        gateway: &Gateway,
        ingress: Ingress,
    ) -> Result<Self, SubscriptionError> {
        Self::open(gateway, ingress, NoopDecoder).await
    }
}

impl<T, D> Subscriber<T, D>
where
    D: Decoder<Result = T>,
{
    /// Reports the name of this [`Subscriber`].
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T, D> Subscriber<T, D>
where
    D: Decoder<Result = T>,
{
    /// Receives the next decode-able message from the broker, waiting as long
    /// as it takes for one to arrive.
    ///
    /// Returns [`None`] once the underlying delivery stream has permanently
    /// ended. After the first [`None`], all subsequent calls return [`None`]
    /// immediately.
    ///
    /// Messages that arrive but cannot be decoded are reported and skipped,
    /// without surfacing to the caller.
    ///
    /// Dropping the returned future mid-wait (e.g., when racing it against a
    /// shutdown signal) drops the underlying consumer, after which this method
    /// returns [`None`].
    pub async fn receive(&self) -> Option<Envelope<T>> {
        // Grab the consumer (keep the guard until we return)
        let mut consumer_guard = self.consumer.lock().await;
        let mut consumer = consumer_guard.take()?;

        // Poll until a decode-able message arrives or the stream ends
        loop {
            match self.try_poll(&mut consumer).await {
                // Good envelope: put the consumer back under lock and return
                PollOutcome::Envelope(envelope) => {
                    *consumer_guard = Some(consumer);

                    return Some(envelope);
                }

                // Not a message, but the stream may still yield: keep polling
                PollOutcome::ConsumerError | PollOutcome::Gibberish => continue,

                // The stream has dried out: discard the consumer for good
                PollOutcome::OutOfMessages => return None,
            }
        }
    }

    /// Closes the dedicated channel (which also cancels the consumer),
    /// consuming this subscriber.
    ///
    /// The outcome is reported in the logs but otherwise swallowed.
    pub async fn close(self) {
        // Close the channel
        let result = self.channel.close(0, "Subscriber closed").await;

        // Check and report the outcome
        match result {
            Ok(_) => info!(
                subscriber = self.name.as_ref(),
                "Closed the RabbitMQ channel",
            ),
            Err(LapinError::InvalidChannelState(_)) | Err(LapinError::InvalidConnectionState(_)) => {
                info!(
                    subscriber = self.name.as_ref(),
                    "Discarded a previously lost RabbitMQ channel",
                )
            }
            Err(error) => warn!(
                subscriber = self.name.as_ref(),
                ?error,
                error_message = %error,
                "Failed to cleanly close a RabbitMQ channel",
            ),
        }
    }
}

impl<T, D> Subscriber<T, D>
where
    D: Decoder<Result = T>,
{
    /// Abstracts two asynchronous calls (next delivery from the consumer, and
    /// unwrapping of the delivery) into a single asynchronous call.
    async fn try_poll(&self, consumer: &mut LapinConsumer) -> PollOutcome<T> {
        // Fetch and unwrap next delivery
        self.unwrap_delivery(consumer.next().await)
    }

    /// Peels the layers off the given incoming delivery.
    fn unwrap_delivery(
        &self,
        option_delivery_result: Option<LapinResult<Delivery>>,
    ) -> PollOutcome<T> {
        // Unwrap the outer option
        let delivery_result = match option_delivery_result {
            Some(delivery_result) => delivery_result,
            None => {
                debug!(
                    subscriber = self.name.as_ref(),
                    "Ran out of messages on a RabbitMQ consumer",
                );

                return PollOutcome::OutOfMessages;
            }
        };

        // Unwrap the inner result
        let delivery = match delivery_result {
            Ok(delivery) => delivery,
            Err(error) => {
                warn!(
                    alert = true,
                    subscriber = self.name.as_ref(),
                    ?error,
                    error_message = %error,
                    "Received an error from a RabbitMQ consumer",
                );

                return PollOutcome::ConsumerError;
            }
        };

        // Decode an envelope
        let envelope_result = Envelope::try_from(&self.decoder, delivery);

        // Inspect the result
        match envelope_result {
            Ok(envelope) => PollOutcome::Envelope(envelope),
            Err(error) => {
                self.discard_gibberish(error);

                PollOutcome::Gibberish
            }
        }
    }

    /// Handles and discards the given un-decodable inbound message.
    fn discard_gibberish(&self, decoder_error: DecoderError<D>) {
        // Destruct the decoder error
        let DecoderError { bytes, error } = decoder_error;

        // Report the un-decodable message
        error!(
            alert = true,
            subscriber = self.name.as_ref(),
            ?error,
            error_message = %error,
            byte_preview = String::from_utf8_lossy(&bytes).as_ref(),
            "Failed to decode an inbound RabbitMQ message",
        );
    }
}
