use std::borrow::Cow;

/// Represents an **outgoing** RabbitMQ message.
///
/// This dispatch owns only the encoded bytes of the outgoing payload, but not
/// the payload itself. Furthermore, this dispatch provides no facilities for
/// encoding the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    bytes: Vec<u8>,
}

impl Dispatch {
    /// Creates a [`Dispatch`] with the payload set to the given bytes.
    ///
    /// This method is specifically made to take an owned `Vec<u8>`, to make sure
    /// no copying occurs and the bytes are simply moved into this dispatch.
    ///
    /// When copying of bytes is acceptable or desired, use
    /// [`from_byte_ref`](Dispatch::from_byte_ref).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Creates a [`Dispatch`] by copying the given bytes to the payload.
    pub fn from_byte_ref(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: bytes.as_ref().to_vec(),
        }
    }
}

impl Dispatch {
    /// Exposes the encoded content of this message.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reports the size of the encoded content of this message, in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Reports whether the encoded content of this message is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Convenience implementations of [`From`] for [`Dispatch`].
const _: () = {
    impl From<String> for Dispatch {
        fn from(value: String) -> Self {
            Dispatch::from_bytes(value.into_bytes())
        }
    }

    impl From<&str> for Dispatch {
        fn from(value: &str) -> Self {
            Dispatch::from_byte_ref(value.as_bytes())
        }
    }

    impl From<Vec<u8>> for Dispatch {
        fn from(value: Vec<u8>) -> Self {
            Dispatch::from_bytes(value)
        }
    }

    impl From<Box<[u8]>> for Dispatch {
        fn from(value: Box<[u8]>) -> Self {
            Dispatch::from_bytes(value.into())
        }
    }

    impl From<&[u8]> for Dispatch {
        fn from(value: &[u8]) -> Self {
            Dispatch::from_byte_ref(value)
        }
    }

    impl<'a> From<Cow<'a, str>> for Dispatch {
        fn from(value: Cow<'a, str>) -> Self {
            Dispatch::from_bytes(value.into_owned().into_bytes())
        }
    }

    impl<'a> From<Cow<'a, [u8]>> for Dispatch {
        fn from(value: Cow<'a, [u8]>) -> Self {
            Dispatch::from_bytes(value.into_owned())
        }
    }
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_conversions() {
        // Given
        let expected_bytes = "how are you?".as_bytes();

        // Then
        assert_eq!(Dispatch::from("how are you?").bytes(), expected_bytes);
        assert_eq!(Dispatch::from("how are you?".to_string()).bytes(), expected_bytes);
        assert_eq!(Dispatch::from(expected_bytes).bytes(), expected_bytes);
        assert_eq!(Dispatch::from(expected_bytes.to_vec()).bytes(), expected_bytes);
        assert_eq!(Dispatch::from(Cow::Borrowed("how are you?")).bytes(), expected_bytes);
    }

    #[test]
    fn accessors() {
        // Given
        let dispatch = Dispatch::from("hi");

        // Then
        assert_eq!(dispatch.len(), 2);
        assert!(!dispatch.is_empty());
        assert!(Dispatch::from_bytes(Vec::new()).is_empty());
    }
}
