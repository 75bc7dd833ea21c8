/// Defines the type to represent outgoing messages
pub mod dispatch;

/// Defines the outbound transporting mechanism
pub mod publisher;
