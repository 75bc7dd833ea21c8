use std::convert::Infallible;
use std::error::Error;
use std::string::FromUtf8Error;

/// Represents a way of decoding a payload of an incoming message (which is
/// received as a sequence of bytes) into an arbitrary result type.
///
/// It is important to know that both the original bytes (`Vec<u8>`) and the
/// decoded [`Result`](Decoder::Result) will be owned by the same
/// [`Envelope`](crate::Envelope). Given that Rust doesn’t allow
/// self-referential structs, we have to keep in mind that the result type may
/// not contain references to the original bytes.
///
/// For cases where references to the original bytes are needed in the decoded
/// result, the byte slice may be [accessed](crate::Envelope::bytes) on the
/// envelope for manual decoding, and the provided [`NoopDecoder`] may be used
/// as a dud.
pub trait Decoder {
    /// The type of decoded result.
    type Result;

    /// The type of error produced when decoding is not possible.
    type Error: Error;

    /// Decodes the given sequence of bytes into the desired
    /// [`Result`](Decoder::Result), or returns an appropriate
    /// [`Error`](Decoder::Error).
    fn decode(&self, bytes: &[u8]) -> Result<Self::Result, Self::Error>;
}

/// Implements [`Decoder`] for any function or closure that returns a
/// non-referential [`Result`].
///
/// If the result references the given `bytes`, this implementation will not
/// work. See the [`Decoder`] documentation for more details.
impl<F, R, E> Decoder for F
where
    F: Fn(&[u8]) -> Result<R, E>,
    E: Error,
{
    type Result = R;
    type Error = E;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Result, Self::Error> {
        self(bytes)
    }
}

/// In some cases it is not necessary or not desirable to decode the incoming
/// message’s bytes on consumption. This convenience implementation of [`Decoder`]
/// enables such cases by not doing anything and returning a unit type `()`.
///
/// The original, un-decoded [`bytes`](crate::Envelope::bytes) of the
/// message are always available on the [`Envelope`](crate::Envelope).
///
/// See the [`Decoder`] documentation for more details.
pub struct NoopDecoder;

impl Decoder for NoopDecoder {
    type Result = ();
    type Error = Infallible;

    fn decode(&self, _bytes: &[u8]) -> Result<Self::Result, Self::Error> {
        Ok(())
    }
}

/// Implements [`Decoder`] that allocates an owned UTF-8 [`String`] with a copy
/// of the given bytes. This decoder fails with [`FromUtf8Error`] if the given
/// bytes cannot be interpreted as valid UTF-8.
#[derive(Default)]
pub struct StringDecoder;

impl Decoder for StringDecoder {
    type Result = String;
    type Error = FromUtf8Error;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Result, Self::Error> {
        String::from_utf8(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn string_decoder_accepts_utf8() {
        // Given
        let bytes = "¿cómo estás?".as_bytes();

        // When
        let decoded = StringDecoder.decode(bytes);

        // Then
        assert_eq!(decoded.unwrap(), "¿cómo estás?");
    }

    #[test]
    fn string_decoder_rejects_invalid_utf8() {
        // Given
        let bytes: &[u8] = &[0xc0, 0xaf];

        // When
        let decoded = StringDecoder.decode(bytes);

        // Then
        assert!(decoded.is_err());
    }

    #[test]
    fn closure_decoder() {
        // Given
        let decoder = |bytes: &[u8]| -> Result<usize, Infallible> { Ok(bytes.len()) };

        // When
        let decoded = decoder.decode(b"ping");

        // Then
        assert_eq!(decoded, Ok(4));
    }
}
