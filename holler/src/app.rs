use crate::config::DotEnv;
use crate::telemetry::fmt::init_tracing;
use crate::{AppConfig, AppContext};
use std::process::ExitCode;
use tokio::runtime::{Builder, Runtime};
use tracing::info;

/// The primary entry point for running a holler binary.
///
/// This struct provides a high-level facade that wires up the ambient
/// machinery shared by both binaries: dot-env files, the application
/// configuration, the tracing stack, the Tokio runtime, and the OS shutdown
/// signal listener. Use [`App::boot`] to run an async entrypoint within that
/// machinery.
pub struct App;

impl App {
    /// Starts the application around the given `async_main`.
    ///
    /// This function performs the startup sequence:
    ///
    /// 1. Taps the dot-env files into the process environment.
    /// 2. Resolves the [`AppConfig`] from its sources (the one fail-fast,
    ///    panicky part of the sequence).
    /// 3. Installs the global `tracing` subscriber.
    /// 4. Builds a multi-threaded Tokio runtime.
    /// 5. Starts intercepting OS shutdown signals: the first signal
    ///    [terminates](AppContext::terminate) the [`AppContext`], a repeated
    ///    signal exits the process with a non-zero status.
    /// 6. Blocks on `async_main` and reports its [`ExitCode`].
    ///
    /// The `async_main` future is always driven to completion. A long-running
    /// entrypoint is expected to watch [`AppContext::terminated`] and wind
    /// down on its own once a shutdown signal trips the context: that is what
    /// keeps the teardown logic of the entrypoint running on the signal path
    /// instead of being dropped mid-flight.
    ///
    /// ## Example
    ///
    /// ```
    /// use holler::App;
    /// use std::process::ExitCode;
    ///
    /// fn main() -> ExitCode {
    ///     App::boot(async_main())
    /// }
    ///
    /// async fn async_main() -> ExitCode {
    ///     println!("Executing the main logic");
    ///
    ///     ExitCode::SUCCESS
    /// }
    /// ```
    pub fn boot<Main>(async_main: Main) -> ExitCode
    where
        Main: Future<Output = ExitCode>,
    {
        // Prepare the environment
        DotEnv::tap();

        // Resolve the application configuration
        let config = AppConfig::resolve();

        // Install the global tracing subscriber
        init_tracing(config.tracing());

        // Make the asynchronous runtime
        let runtime = Self::make_runtime();

        // Announce startup
        info!(
            "Starting {} against RabbitMQ broker '{}' and queue '{}'",
            env!("CARGO_PKG_NAME"),
            config.broker(),
            config.queue().name(),
        );

        // Proceed to the application’s main asynchronous logic
        runtime.block_on(Self::run_async_main(async_main))
    }

    /// Builds the Tokio [`Runtime`] that carries the application’s
    /// asynchronous logic.
    fn make_runtime() -> Runtime {
        Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("it should be possible to build the asynchronous runtime")
    }

    /// Wraps the main future with the application context machinery.
    async fn run_async_main<Main>(async_main: Main) -> ExitCode
    where
        Main: Future<Output = ExitCode>,
    {
        // Start listening for OS shutdown signals
        AppContext::auto_terminate().await;

        // Run the application’s main asynchronous logic
        let exit_code = async_main.await;

        // Terminate the context in case it is not terminated yet
        AppContext::terminate();

        exit_code
    }
}
