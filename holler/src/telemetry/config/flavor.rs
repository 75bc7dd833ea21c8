use crate::util::slug::eq_as_slugs;
use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;

/// Represents a particular preset of configuration for the
/// [event formatter](tracing_subscriber::fmt::format::Format) used by the
/// [formatted layer](tracing_subscriber::fmt::Layer) of the
/// `tracing_subscriber` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatFlavor {
    /// Uses the default [`Full`](tracing_subscriber::fmt::format::Full) event formatting.
    Full,

    /// Uses the [`Compact`](tracing_subscriber::fmt::format::Compact) event formatting.
    Compact,

    /// Uses the multi-line [`Pretty`](tracing_subscriber::fmt::format::Pretty) event formatting.
    Pretty,
}

impl Default for FormatFlavor {
    /// Defines a reasonable default [`FormatFlavor`].
    fn default() -> Self {
        FormatFlavor::Full
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for FormatFlavor {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_str(FormatFlavorVisitor)
        }
    }

    struct FormatFlavorVisitor;

    impl Visitor<'_> for FormatFlavorVisitor {
        type Value = FormatFlavor;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a string value")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if eq_as_slugs(value, "full") {
                Ok(FormatFlavor::Full)
            } else if eq_as_slugs(value, "compact") {
                Ok(FormatFlavor::Compact)
            } else if eq_as_slugs(value, "pretty") {
                Ok(FormatFlavor::Pretty)
            } else {
                Err(Error::unknown_variant(
                    value,
                    &["full", "compact", "pretty"],
                ))
            }
        }
    }
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_name() {
        assert_eq!(serde_yml::from_str::<FormatFlavor>("full").unwrap(), FormatFlavor::Full);
        assert_eq!(serde_yml::from_str::<FormatFlavor>("compact").unwrap(), FormatFlavor::Compact);
        assert_eq!(serde_yml::from_str::<FormatFlavor>("PRETTY").unwrap(), FormatFlavor::Pretty);
    }

    #[test]
    fn from_unknown() {
        assert!(serde_yml::from_str::<FormatFlavor>("json").is_err());
    }
}
