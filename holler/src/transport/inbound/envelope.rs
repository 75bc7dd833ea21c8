use crate::Decoder;
use lapin::message::Delivery;
use lapin::types::ShortString;

/// Represents an **incoming** RabbitMQ message.
///
/// This envelope owns both the bytes of the original message’s payload and the
/// decoded (e.g., deserialized) payload `T`. The payload is decoded exactly
/// once, by the [`Subscriber`](crate::Subscriber) that received the message.
#[derive(Debug)]
pub struct Envelope<T> {
    /// The original routing key used to send the message.
    routing_key: ShortString,
    /// The original redelivery flag.
    is_redelivered: bool,
    /// The original bytes.
    bytes: Vec<u8>,
    /// The decoded content of the underlying message, stored alongside its
    /// original bytes.
    payload: T,
}

/// Represents a failed attempt to create an [`Envelope`] from a [`Decoder`] and
/// a [`Delivery`].
pub(crate) struct DecoderError<D>
where
    D: Decoder,
{
    /// The original bytes that were not decoded.
    pub(crate) bytes: Vec<u8>,
    /// The decoder error.
    pub(crate) error: D::Error,
}

impl<T> Envelope<T> {
    /// Attempts to create an envelope from the given [`Delivery`] using the
    /// provided [`Decoder`] implementation for interpreting the message payload.
    pub(crate) fn try_from<D>(
        decoder: &D,
        delivery: Delivery,
    ) -> Result<Envelope<T>, DecoderError<D>>
    where
        D: Decoder<Result = T>,
    {
        // Destructure the input
        let Delivery {
            routing_key,
            redelivered: is_redelivered,
            data: bytes,
            ..
        } = delivery;

        // Attempt to decode the given bytes with the given decoder
        match decoder.decode(&bytes) {
            // Successfully decoded
            Ok(payload) => Ok(Self {
                routing_key,
                is_redelivered,
                bytes,
                payload,
            }),

            // Failed to decode
            Err(error) => Err(DecoderError { bytes, error }),
        }
    }
}

impl<T> Envelope<T> {
    /// Exposes the original routing key used to send the underlying incoming
    /// message. With the default exchange, the routing key is the name of the
    /// queue the message went through.
    pub fn routing_key(&self) -> &str {
        self.routing_key.as_str()
    }

    /// Exposes the original redelivery flag of the underlying incoming message.
    pub fn is_redelivered(&self) -> bool {
        self.is_redelivered
    }

    /// Exposes the original bytes of this message.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Exposes the decoded payload of this message.
    ///
    /// Most [decoders](Decoder) derive the payload from the original
    /// [bytes](Envelope::bytes) of this message. A notable exception is the
    /// [`NoopDecoder`](crate::NoopDecoder).
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes this envelope and returns the decoded payload, discarding the
    /// original bytes.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

#[cfg(test)]
impl<T> Envelope<T> {
    /// Creates a new instance directly from parts.
    pub(crate) fn test_dud(routing_key: &str, bytes: Vec<u8>, payload: T) -> Self {
        Self {
            routing_key: routing_key.into(),
            is_redelivered: false,
            bytes,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exposes_parts() {
        // Given
        let envelope = Envelope::test_dud("hello", b"how are you?".to_vec(), 96);

        // Then
        assert_eq!(envelope.routing_key(), "hello");
        assert!(!envelope.is_redelivered());
        assert_eq!(envelope.bytes(), b"how are you?");
        assert_eq!(envelope.payload(), &96);
    }

    #[test]
    fn moves_out_payload() {
        // Given
        let envelope = Envelope::test_dud("hello", vec![], "decoded".to_owned());

        // When
        let payload = envelope.into_payload();

        // Then
        assert_eq!(payload, "decoded");
    }
}
