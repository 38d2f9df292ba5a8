//! Error types for the state bus.

/// Errors that can occur in the pub/sub layer.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// A NATS connect, subscribe, or stream operation failed.
    #[error("bus error: {0}")]
    Nats(String),
}
