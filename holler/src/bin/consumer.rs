//! Prints every message arriving on the configured queue until terminated.

use holler::{
    App, AppConfig, AppContext, ConnectionError, Gateway, Ingress, IngressError, StringDecoder,
    Subscriber, SubscriptionError,
};
use std::process::ExitCode;
use thiserror::Error;
use tokio::select;
use tracing::{error, warn};

fn main() -> ExitCode {
    App::boot(run())
}

/// Consumes greetings and reports the outcome.
async fn run() -> ExitCode {
    match consume_greetings().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(
                alert = true,
                transient = error.is_transient(),
                error_message = %error,
                "Failed to consume greetings",
            );

            ExitCode::FAILURE
        }
    }
}

/// Connects to the broker and receives greetings until the application
/// context terminates, releasing the connection on both exit paths.
async fn consume_greetings() -> Result<(), ConsumerError> {
    let config = AppConfig::get();

    let gateway = Gateway::connect(config.broker()).await?;

    let outcome = receive_greetings(&gateway, config).await;

    gateway.close().await;

    outcome
}

/// Opens a subscriber on the given gateway and prints decoded deliveries as
/// they arrive. Returns once the application context terminates, closing the
/// subscriber channel on the way out.
async fn receive_greetings(gateway: &Gateway, config: &AppConfig) -> Result<(), ConsumerError> {
    let ingress = Ingress::builder()
        .with_name("greeting")
        .with_queue(config.queue().clone())
        .build()?;

    let subscriber = Subscriber::open(gateway, ingress, StringDecoder).await?;

    println!(" [*] Waiting for messages. To exit press CTRL+C");

    loop {
        select! {
            biased;
            _ = AppContext::terminated() => break,
            envelope = subscriber.receive() => match envelope {
                Some(envelope) => println!(" [x] Received '{}'", envelope.payload()),
                None => {
                    // The broker will not resume a cancelled subscription:
                    // stay up for operator inspection, but stop polling
                    warn!("The delivery stream has ended; standing by until shutdown");
                    AppContext::terminated().await;
                    break;
                }
            },
        }
    }

    subscriber.close().await;

    Ok(())
}

/// Covers everything that may go wrong while consuming greetings.
#[derive(Error, Debug)]
enum ConsumerError {
    #[error(transparent)]
    Ingress(#[from] IngressError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

impl ConsumerError {
    /// Reports whether a retry in an otherwise healthy deployment could
    /// plausibly succeed.
    fn is_transient(&self) -> bool {
        match self {
            Self::Ingress(_) => false,
            Self::Connection(error) => error.is_transient(),
            Self::Subscription(error) => error.is_transient(),
        }
    }
}
