use crate::{FormatFlavor, TracingConfig, Verbosity};
use std::collections::BTreeMap;
use tracing_core::Subscriber;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::layer as make_fmt_layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Installs the global `tracing` subscriber based on the given
/// [config](TracingConfig).
///
/// This is done once per process, at boot time. Panics if a global subscriber
/// has already been installed.
pub fn init_tracing(config: impl AsRef<TracingConfig>) {
    tracing_subscriber::registry()
        .with(make_layer(config))
        .init();
}

/// Creates a [formatted `Layer`](tracing_subscriber::fmt::Layer) based on the
/// given [config](TracingConfig).
pub fn make_layer<S>(config: impl AsRef<TracingConfig>) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let config = config.as_ref();
    let targets = make_targets(config);
    let color = config.color();

    match config.flavor() {
        FormatFlavor::Full => {
            Box::new(make_fmt_layer().with_ansi(color).with_filter(targets))
        }
        FormatFlavor::Compact => Box::new(
            make_fmt_layer()
                .compact()
                .with_ansi(color)
                .with_filter(targets),
        ),
        FormatFlavor::Pretty => Box::new(
            make_fmt_layer()
                .pretty()
                .with_ansi(color)
                .with_filter(targets),
        ),
    }
}

/// Creates [per-target filter](Targets) based on the choices in the given
/// [`config`](TracingConfig).
fn make_targets(config: &TracingConfig) -> Targets {
    let mut targets = Targets::new();

    targets = targets.with_default(config.verbosity());
    targets = add_custom_targets(targets, config.targets());

    targets
}

/// Composes custom targets, as configured in [`TracingConfig`].
fn add_custom_targets(targets: Targets, custom_targets: &BTreeMap<String, Verbosity>) -> Targets {
    targets.with_targets(custom_targets)
}
