//! Publishes the configured greeting to the configured queue, then exits.

use holler::{
    App, AppConfig, ConnectionError, DeclarationError, Egress, EgressError, Gateway, Publisher,
    PublishingError,
};
use std::process::ExitCode;
use thiserror::Error;
use tracing::error;

fn main() -> ExitCode {
    App::boot(run())
}

/// Publishes the greeting and reports the outcome.
async fn run() -> ExitCode {
    match publish_greeting().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(
                alert = true,
                transient = error.is_transient(),
                error_message = %error,
                "Failed to deliver the greeting",
            );

            ExitCode::FAILURE
        }
    }
}

/// Connects to the broker and delivers the greeting, releasing the
/// connection on both exit paths.
async fn publish_greeting() -> Result<(), ProducerError> {
    let config = AppConfig::get();

    let gateway = Gateway::connect(config.broker()).await?;

    let outcome = transmit_greeting(&gateway, config).await;

    gateway.close().await;

    outcome
}

/// Opens a publisher on the given gateway, pushes the greeting through it,
/// and closes the publisher channel on both exit paths.
async fn transmit_greeting(gateway: &Gateway, config: &AppConfig) -> Result<(), ProducerError> {
    let egress = Egress::builder()
        .with_name("greeting")
        .with_queue(config.queue().clone())
        .build()?;

    let publisher = Publisher::open(gateway, egress).await?;

    let outcome = publisher.publish(config.greeting()).await;

    publisher.close().await;

    let dispatch = outcome?;

    println!(" [x] Sent '{}'", String::from_utf8_lossy(dispatch.bytes()));

    Ok(())
}

/// Covers everything that may go wrong while delivering the greeting.
#[derive(Error, Debug)]
enum ProducerError {
    #[error(transparent)]
    Egress(#[from] EgressError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error(transparent)]
    Publishing(#[from] PublishingError),
}

impl ProducerError {
    /// Reports whether a retry in an otherwise healthy deployment could
    /// plausibly succeed.
    fn is_transient(&self) -> bool {
        match self {
            Self::Egress(_) => false,
            Self::Connection(error) => error.is_transient(),
            Self::Declaration(error) => error.is_transient(),
            Self::Publishing(error) => error.is_transient(),
        }
    }
}
