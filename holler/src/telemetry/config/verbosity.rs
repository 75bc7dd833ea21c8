use crate::util::slug::eq_as_slugs;
use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;
use tracing_core::LevelFilter as TracingLevelFilter;

/// A thin abstraction around the `tracing` crate’s
/// [`LevelFilter`](TracingLevelFilter), introduced to provide deserialization.
///
/// A verbosity level is “higher” if it is more verbose. In this sense,
/// [`Trace`](Verbosity::Trace) is higher (more verbose) than
/// [`Error`](Verbosity::Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    /// Log **nothing**.
    Off,

    /// Log at level [`ERROR`](tracing_core::metadata::Level::ERROR) only.
    Error,

    /// Log at level [`WARN`](tracing_core::metadata::Level::WARN) and lower.
    Warn,

    /// Log at level [`INFO`](tracing_core::metadata::Level::INFO) and lower.
    Info,

    /// Log at level [`DEBUG`](tracing_core::metadata::Level::DEBUG) and lower.
    Debug,

    /// Log **everything**.
    Trace,
}

impl Default for Verbosity {
    /// Defines a reasonable default [`Verbosity`].
    fn default() -> Self {
        Self::Info
    }
}

impl Verbosity {
    /// Translates this [`Verbosity`] level to the `tracing` crate’s
    /// [`LevelFilter`](TracingLevelFilter).
    pub fn to_tracing_level_filter(&self) -> TracingLevelFilter {
        match self {
            Self::Off => TracingLevelFilter::OFF,
            Self::Error => TracingLevelFilter::ERROR,
            Self::Warn => TracingLevelFilter::WARN,
            Self::Info => TracingLevelFilter::INFO,
            Self::Debug => TracingLevelFilter::DEBUG,
            Self::Trace => TracingLevelFilter::TRACE,
        }
    }
}

impl From<Verbosity> for TracingLevelFilter {
    fn from(value: Verbosity) -> Self {
        value.to_tracing_level_filter()
    }
}

impl From<&Verbosity> for TracingLevelFilter {
    fn from(value: &Verbosity) -> Self {
        value.to_tracing_level_filter()
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for Verbosity {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_str(VerbosityVisitor)
        }
    }

    struct VerbosityVisitor;

    impl Visitor<'_> for VerbosityVisitor {
        type Value = Verbosity;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a string value")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if eq_as_slugs(value, "off") || eq_as_slugs(value, "no") {
                Ok(Verbosity::Off)
            } else if eq_as_slugs(value, "error") || eq_as_slugs(value, "err") {
                Ok(Verbosity::Error)
            } else if eq_as_slugs(value, "warn") || eq_as_slugs(value, "warning") {
                Ok(Verbosity::Warn)
            } else if eq_as_slugs(value, "info") {
                Ok(Verbosity::Info)
            } else if eq_as_slugs(value, "debug") {
                Ok(Verbosity::Debug)
            } else if eq_as_slugs(value, "trace") {
                Ok(Verbosity::Trace)
            } else {
                Err(Error::unknown_variant(
                    value,
                    &["off", "error", "warn", "info", "debug", "trace"],
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
        assert_eq!(serde_yml::from_str::<Verbosity>("off").unwrap(), Verbosity::Off);
        assert_eq!(serde_yml::from_str::<Verbosity>("error").unwrap(), Verbosity::Error);
        assert_eq!(serde_yml::from_str::<Verbosity>("warn").unwrap(), Verbosity::Warn);
        assert_eq!(serde_yml::from_str::<Verbosity>("info").unwrap(), Verbosity::Info);
        assert_eq!(serde_yml::from_str::<Verbosity>("debug").unwrap(), Verbosity::Debug);
        assert_eq!(serde_yml::from_str::<Verbosity>("trace").unwrap(), Verbosity::Trace);
    }

    #[test]
    fn from_alias() {
        assert_eq!(serde_yml::from_str::<Verbosity>("no").unwrap(), Verbosity::Off);
        assert_eq!(serde_yml::from_str::<Verbosity>("err").unwrap(), Verbosity::Error);
        assert_eq!(serde_yml::from_str::<Verbosity>("WARNING").unwrap(), Verbosity::Warn);
        assert_eq!(serde_yml::from_str::<Verbosity>("Info").unwrap(), Verbosity::Info);
    }

    #[test]
    fn from_unknown() {
        assert!(serde_yml::from_str::<Verbosity>("loud").is_err());
    }

    #[test]
    fn into_level_filter() {
        use tracing_core::LevelFilter;

        assert_eq!(LevelFilter::from(Verbosity::Off), LevelFilter::OFF);
        assert_eq!(LevelFilter::from(Verbosity::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(Verbosity::default()), LevelFilter::INFO);
    }
}
