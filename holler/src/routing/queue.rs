use crate::util::field::impl_deserialize_field;
use crate::util::slug::eq_as_slugs;
use serde::de::{Error, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;
use std::sync::Arc;

/// Defines a RabbitMQ queue as both sides of this pipeline declare it.
///
/// Every flag defaults to `false`, which matches the broker-side defaults:
/// declaring such a queue when it already exists (with the same flags) is a
/// no-op, so the producer and the consumer may declare it in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    name: Arc<str>,
    durable: bool,
    exclusive: bool,
    auto_delete: bool,
}

impl Queue {
    /// Creates a queue definition with the given name, falling on defaults for
    /// all flags.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            durable: Self::default_durable(),
            exclusive: Self::default_exclusive(),
            auto_delete: Self::default_auto_delete(),
        }
    }

    /// Re-creates this queue definition with the given `durable` flag.
    pub fn with_durable(self, durable: bool) -> Self {
        Self { durable, ..self }
    }

    /// Re-creates this queue definition with the given `exclusive` flag.
    pub fn with_exclusive(self, exclusive: bool) -> Self {
        Self { exclusive, ..self }
    }

    /// Re-creates this queue definition with the given `auto_delete` flag.
    pub fn with_auto_delete(self, auto_delete: bool) -> Self {
        Self {
            auto_delete,
            ..self
        }
    }
}

impl Queue {
    /// Reports the queue name for this definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports whether the queue name for this definition is empty.
    ///
    /// An empty name is a signal to RabbitMQ to generate a random queue name,
    /// which never makes sense for this pipeline: both binaries must address
    /// one and the same queue. The route builders reject an empty name.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Reports the queue `durable` flag for this definition.
    pub fn durable(&self) -> bool {
        self.durable
    }

    /// Reports the queue `exclusive` flag for this definition.
    pub fn exclusive(&self) -> bool {
        self.exclusive
    }

    /// Reports the queue `auto_delete` flag for this definition.
    pub fn auto_delete(&self) -> bool {
        self.auto_delete
    }
}

impl Queue {
    fn default_durable() -> bool {
        false
    }

    fn default_exclusive() -> bool {
        false
    }

    fn default_auto_delete() -> bool {
        false
    }
}

impl AsRef<Queue> for Queue {
    fn as_ref(&self) -> &Queue {
        self
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for Queue {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(QueueVisitor)
        }
    }

    struct QueueVisitor;

    impl<'de> Visitor<'de> for QueueVisitor {
        type Value = Queue;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a map of RabbitMQ queue or a string queue name")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(Queue::named(value))
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut name: Option<String> = None;
            let mut durable = None;
            let mut exclusive = None;
            let mut auto_delete = None;

            while let Some(key) = map.next_key()? {
                match key {
                    QueueField::name => key.poll(&mut map, &mut name)?,
                    QueueField::durable => key.poll(&mut map, &mut durable)?,
                    QueueField::exclusive => key.poll(&mut map, &mut exclusive)?,
                    QueueField::auto_delete => key.poll(&mut map, &mut auto_delete)?,
                    QueueField::__ignore => map.next_value()?,
                };
            }

            let name = name.ok_or_else(|| Error::missing_field("name"))?;

            let mut queue = Queue::named(name);

            if let Some(durable) = durable {
                queue = queue.with_durable(durable);
            }

            if let Some(exclusive) = exclusive {
                queue = queue.with_exclusive(exclusive);
            }

            if let Some(auto_delete) = auto_delete {
                queue = queue.with_auto_delete(auto_delete);
            }

            Ok(queue)
        }
    }

    impl_deserialize_field!(
        QueueField,
        eq_as_slugs,
        name,
        durable,
        exclusive,
        auto_delete,
    );
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_string() {
        // Given
        let input = "test_queue";
        let expected_output = Queue::named("test_queue");

        // When
        let actual_output = serde_yml::from_str::<Queue>(input).unwrap();

        // Then
        assert!(!actual_output.is_empty());
        assert_eq!(expected_output, actual_output);
    }

    #[test]
    fn from_map_sparse() {
        // Given
        let input = r#"
name: test_queue
"#;
        let expected_output = Queue::named("test_queue");

        // When
        let actual_output = serde_yml::from_str::<Queue>(input).unwrap();

        // Then
        assert_eq!(expected_output, actual_output);
        assert_eq!(actual_output.durable(), false);
        assert_eq!(actual_output.exclusive(), false);
        assert_eq!(actual_output.auto_delete(), false);
    }

    #[test]
    fn from_map_full() {
        // Given
        let input = r#"
extra_field: ignored
name: test_queue
durable: true
AUTO_DELETE: true
"#;
        let expected_output = Queue::named("test_queue")
            .with_durable(true)
            .with_auto_delete(true);

        // When
        let actual_output = serde_yml::from_str::<Queue>(input).unwrap();

        // Then
        assert_eq!(expected_output, actual_output);
    }

    #[test]
    fn from_map_without_name() {
        // Given
        let input = r#"
durable: true
"#;

        // When
        let result = serde_yml::from_str::<Queue>(input);

        // Then
        assert!(result.is_err());
    }
}
