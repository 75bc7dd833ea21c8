/// Defines a decoder for incoming messages
pub mod decoder;

/// Defines the type to represent incoming messages
pub mod envelope;

/// Defines the inbound transporting mechanism
pub mod subscriber;
