#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the application configuration tree.
mod config;
pub use self::config::AppConfig;

/// Exposes a handle for defining a set of connection credentials.
mod handle;
pub use self::handle::{DsnChunks, Handle};

/// Exposes various types for defining outbound and inbound message routes.
mod routing {
    pub mod egress;
    pub mod ingress;
    pub mod queue;
}

// Re-export routing types
pub use self::routing::egress::{ConfirmationLevel, Egress, EgressBuilder, EgressError};
pub use self::routing::ingress::{Ingress, IngressBuilder, IngressError};
pub use self::routing::queue::Queue;

/// Exposes machinery for maintaining a connection to a RabbitMQ broker.
mod gateway;
pub use self::gateway::{ConnectionError, Gateway};

/// Exposes machinery for transporting incoming and outgoing messages.
mod transport;

// Re-export shared transport types
pub use self::transport::DeclarationError;

// Re-export inbound types
pub use self::transport::inbound::decoder::{Decoder, NoopDecoder, StringDecoder};
pub use self::transport::inbound::envelope::Envelope;
pub use self::transport::inbound::subscriber::{
    StringSubscriber, Subscriber, SubscriptionError, UndecodedSubscriber,
};

// Re-export outbound types
pub use self::transport::outbound::dispatch::Dispatch;
pub use self::transport::outbound::publisher::api::{
    PublishingError, PublishingFailure, PublishingResult,
};
pub use self::transport::outbound::publisher::Publisher;

/// Exposes the global application context.
mod context;
pub use self::context::AppContext;

/// Exposes the application logging machinery.
mod telemetry {
    pub mod config;
    pub mod fmt;
}

// Re-export telemetry types
pub use self::telemetry::config::flavor::FormatFlavor;
pub use self::telemetry::config::verbosity::Verbosity;
pub use self::telemetry::config::TracingConfig;
pub use self::telemetry::fmt::{init_tracing, make_layer};

/// Implements the [`App`] facade.
mod app;
pub use self::app::App;

/// Internal helpers shared by the hand-written deserialization code.
mod util {
    pub mod field;
    pub mod slug;
}
