use crate::util::field::impl_deserialize_field;
use crate::util::slug::eq_as_slugs;
use crate::{FormatFlavor, Verbosity};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::Formatter;

pub mod flavor;
pub mod verbosity;

/// Represents the application-level configuration section that covers everything
/// related to pre-configuring the [formatted layer](tracing_subscriber::fmt::Layer)
/// provided by the `tracing` crate. In essence, this is the application
/// **logging** configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    verbosity: Verbosity,
    flavor: FormatFlavor,
    color: bool,
    targets: BTreeMap<String, Verbosity>,
}

impl TracingConfig {
    /// Merges an extra per-target [`Verbosity`] level into this config.
    pub fn with_target(
        mut self,
        target: impl Into<String>,
        verbosity: impl Into<Verbosity>,
    ) -> Self {
        self.targets.insert(target.into(), verbosity.into());

        self
    }
}

impl TracingConfig {
    /// Reports the root [verbosity level](Verbosity) for this logging
    /// configuration.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Reports the [formatting flavor](FormatFlavor) for this logging
    /// configuration.
    pub fn flavor(&self) -> FormatFlavor {
        self.flavor
    }

    /// Reports whether this logging configuration enables
    /// [colored](tracing_subscriber::fmt::Layer::with_ansi) output.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Reports the
    /// [customized](tracing_subscriber::filter::targets::Targets::with_targets)
    /// per-[target](tracing_subscriber::filter::targets::Targets) verbosity for
    /// this logging configuration.
    pub fn targets(&self) -> &BTreeMap<String, Verbosity> {
        &self.targets
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            flavor: FormatFlavor::default(),
            color: Self::default_color(),
            targets: BTreeMap::default(),
        }
    }
}

impl TracingConfig {
    fn default_color() -> bool {
        true
    }
}

impl AsRef<TracingConfig> for TracingConfig {
    fn as_ref(&self) -> &TracingConfig {
        self
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for TracingConfig {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(TracingConfigVisitor)
        }
    }

    struct TracingConfigVisitor;

    impl<'de> Visitor<'de> for TracingConfigVisitor {
        type Value = TracingConfig;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a map of tracing (logging) configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut level = None;
            let mut flavor = None;
            let mut color = None;
            let mut targets = None;

            while let Some(key) = map.next_key()? {
                match key {
                    TracingConfigField::verbosity => key.poll(&mut map, &mut level)?,
                    TracingConfigField::flavor => key.poll(&mut map, &mut flavor)?,
                    TracingConfigField::color => key.poll(&mut map, &mut color)?,
                    TracingConfigField::targets => key.poll(&mut map, &mut targets)?,
                    TracingConfigField::__ignore => map.next_value()?,
                };
            }

            Ok(TracingConfig {
                verbosity: level.unwrap_or_default(),
                flavor: flavor.unwrap_or_default(),
                color: color.unwrap_or_else(TracingConfig::default_color),
                targets: targets.unwrap_or_default(),
            })
        }
    }

    impl_deserialize_field!(
        TracingConfigField,
        eq_as_slugs,
        verbosity | level,
        flavor | flavour,
        color | with_color | colour | with_colour | show_color | show_colour,
        targets | custom_targets | target_verbosity,
    );
};

#[cfg(test)]
mod tests {
    use crate::{FormatFlavor, TracingConfig, Verbosity};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn from_empty() {
        // Given
        let input = "{}";
        let expected_output = TracingConfig::default();

        // When
        let actual_output = serde_yml::from_str::<TracingConfig>(input).unwrap();

        // Then
        assert_eq!(expected_output, actual_output);
    }

    #[test]
    fn from_map_sparse() {
        // Given
        let input = r#"
verbosity: off
"#;
        let expected_output = TracingConfig {
            verbosity: Verbosity::Off,
            ..TracingConfig::default()
        };

        // When
        let actual_output = serde_yml::from_str::<TracingConfig>(input).unwrap();

        // Then
        assert_eq!(expected_output, actual_output);
    }

    #[test]
    fn from_map_full() {
        // Given
        let input = r#"
level: warn
flavour: pretty
show_color: false
targets:
    lapin: off
    holler::gateway: error
"#;
        let expected_output = TracingConfig {
            verbosity: Verbosity::Warn,
            flavor: FormatFlavor::Pretty,
            color: false,
            targets: BTreeMap::from([
                ("lapin".to_string(), Verbosity::Off),
                ("holler::gateway".to_string(), Verbosity::Error),
            ]),
        };

        // When
        let actual_output = serde_yml::from_str::<TracingConfig>(input).unwrap();

        // Then
        assert_eq!(expected_output, actual_output);
    }
}
