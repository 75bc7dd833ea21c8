use crate::util::field::impl_deserialize_field;
use crate::util::slug::eq_as_slugs;
use crate::{Handle, Queue, TracingConfig};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::de::{Error, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_value::Value;
use std::collections::BTreeMap;
use std::fmt::Formatter;
use std::path::PathBuf;
use std::sync::{Once, OnceLock};

const ENV_CONFIG_FILE: &str = "HOLLER_CONFIG";
const FILE_CONFIG_DEFAULT: &str = "holler.yaml";

const ENV_PREFIX: &str = "HOLLER";
const ENV_SEPARATOR: &str = "_";

const FILE_DOT_ENV_LOCAL: &str = ".env.local";
const FILE_DOT_ENV_GLOBAL: &str = ".env";

/// The statically stored [`AppConfig`].
static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Represents the application’s externalized configuration.
///
/// This struct is the root of the configuration tree. It is resolved once
/// during application startup and is immutable for the lifetime of the
/// process.
///
/// The primary way to access the configuration is via [`AppConfig::get`],
/// which returns a static reference to the fully parsed `AppConfig` instance.
///
/// ## Sources
///
/// The configuration is assembled from the following sources, each overriding
/// the previous one:
///
/// 1. Hard-coded defaults (matching a stock local broker installation).
/// 2. An optional config file. The path is taken from the `HOLLER_CONFIG`
///    environment variable and defaults to `holler.yaml` in the working
///    directory. A missing file is silently skipped.
/// 3. Environment variables prefixed with `HOLLER_`, with `_` separating
///    nested keys (e.g. `HOLLER_BROKER_HOST`).
///
/// Before the environment is consulted, [`DotEnv`] taps the `.env.local` and
/// `.env` files, if present.
///
/// ## Leniency
///
/// Keys are matched case- and separator-insensitively, and most of them
/// respond to a few aliases. Unrecognized top-level keys are not an error:
/// when no `broker` section is given, they are collected and interpreted as
/// loose DSN chunks for the broker [`Handle`], which allows the flattened
/// layout of `host`/`port`/`user` directly at the top level.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    broker: Handle,
    queue: Queue,
    greeting: String,
    tracing: TracingConfig,
}

/// Methods that use [`AppConfig`] as a facade.
impl AppConfig {
    /// Returns a static reference to the resolved `AppConfig`.
    ///
    /// # Panics
    ///
    /// Panics if called before the configuration has been resolved, which
    /// normally happens early within [`App::boot`](crate::App::boot).
    pub fn get() -> &'static Self {
        APP_CONFIG
            .get()
            .expect("the application configuration should not be accessed before initialization")
    }

    /// Resolves the application configuration from its sources, stores it
    /// statically, and returns a static reference to it.
    ///
    /// This function is called internally during startup and should not be
    /// called manually.
    ///
    /// Configuration is the basis for bootstrapping the application, and thus
    /// it must fail fast.
    ///
    /// # Panics
    ///
    /// Panics if any of the sources cannot be read or deserialized, and if
    /// called more than once.
    pub(crate) fn resolve() -> &'static Self {
        let proxy_config = Self::assemble_builder()
            .build()
            .expect("it should be possible to read the application configuration sources");

        let app_config = proxy_config
            .try_deserialize::<AppConfig>()
            .expect("it should be possible to deserialize the application configuration");

        APP_CONFIG
            .set(app_config)
            .expect("the application configuration should not be resolved more than once");

        Self::get()
    }

    /// Assembles the [`ConfigBuilder`] with the file and environment sources
    /// attached.
    fn assemble_builder() -> ConfigBuilder<DefaultState> {
        // Take the config file location from the environment, if given
        let config_file = std::env::var_os(ENV_CONFIG_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(FILE_CONFIG_DEFAULT));

        ConfigBuilder::<DefaultState>::default()
            .add_source(File::from(config_file).required(false))
            .add_source(
                Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR),
            )
    }
}

impl AppConfig {
    /// Returns the [`Handle`] of the broker to connect to.
    pub fn broker(&self) -> &Handle {
        &self.broker
    }

    /// Returns the [`Queue`] that both binaries declare and use.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Returns the greeting text that the producer publishes.
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Returns the configuration for the tracing stack.
    pub fn tracing(&self) -> &TracingConfig {
        &self.tracing
    }
}

impl AppConfig {
    fn default_queue() -> Queue {
        Queue::named("hello")
    }

    fn default_greeting() -> &'static str {
        "how are you?"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            broker: Handle::default(),
            queue: Self::default_queue(),
            greeting: Self::default_greeting().to_owned(),
            tracing: TracingConfig::default(),
        }
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for AppConfig {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(AppConfigVisitor)
        }
    }

    struct AppConfigVisitor;

    impl<'de> Visitor<'de> for AppConfigVisitor {
        type Value = AppConfig;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a map of application configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut broker = None;
            let mut queue = None;
            let mut greeting: Option<String> = None;
            let mut tracing = None;

            let mut discarded = BTreeMap::new();

            while let Some(key) = map.next_key::<Value>()? {
                let field = AppConfigField::deserialize(key.clone()).map_err(Error::custom)?;

                match field {
                    AppConfigField::broker => field.poll(&mut map, &mut broker)?,
                    AppConfigField::queue => field.poll(&mut map, &mut queue)?,
                    AppConfigField::greeting => field.poll(&mut map, &mut greeting)?,
                    AppConfigField::tracing => field.poll(&mut map, &mut tracing)?,
                    AppConfigField::__ignore => {
                        discarded.insert(key, map.next_value()?);
                        IgnoredAny
                    }
                };
            }

            // Loose top-level keys are interpreted as DSN chunks for the
            // broker handle, unless an explicit broker section is given
            if broker.is_none() {
                broker = Some(Handle::deserialize(Value::Map(discarded)).map_err(Error::custom)?);
            }

            Ok(AppConfig {
                broker: broker.unwrap_or_default(),
                queue: queue.unwrap_or_else(AppConfig::default_queue),
                greeting: greeting.unwrap_or_else(|| AppConfig::default_greeting().to_owned()),
                tracing: tracing.unwrap_or_default(),
            })
        }
    }

    impl_deserialize_field!(
        AppConfigField,
        eq_as_slugs,
        broker | rabbitmq | amqp,
        queue,
        greeting | message,
        tracing | logging,
    );
};

/// A facade for loading environment variables from `.env` files.
///
/// Variables are loaded from the `.env.local` and `.env` files located in the
/// working directory, without overriding variables that are already set.
///
/// Use [`tap`](DotEnv::tap) for a safe, one-time load operation.
pub(crate) struct DotEnv;

impl DotEnv {
    /// Ensures environment variables from dot-env files are loaded.
    ///
    /// This function guarantees that the loading operation is performed at
    /// most once during the application’s lifecycle. Subsequent calls have no
    /// effect.
    pub(crate) fn tap() {
        static INIT: Once = Once::new();

        INIT.call_once(Self::load);
    }

    /// Loads environment variables from dot-env files into the environment.
    ///
    /// This method does not override any environment variables that are
    /// already set. The files are loaded in the following order, with
    /// variables from earlier files taking precedence:
    ///
    /// 1. `.env.local`
    /// 2. `.env`
    ///
    /// A missing file is silently ignored.
    fn load() {
        // Load local file (first priority)
        let _ = dotenvy::from_path(FILE_DOT_ENV_LOCAL);

        // Load global file (second priority)
        let _ = dotenvy::from_path(FILE_DOT_ENV_GLOBAL);
    }
}
