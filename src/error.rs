use std::collections::TryReserveError;
use thiserror::Error;

/// Failure classes for a transfer. On the server every variant is local to
/// one connection; on the client any variant aborts the run with a non-zero
/// exit.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Bad CLI input, bad file path, bad address.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Could not allocate the receive buffer.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Oversized or unterminated filename, malformed field.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Any read/write/connect/accept/persist failure, including deadline
    /// expiry.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// Cannot bind, listen, or create a required directory.
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<TryReserveError> for TransferError {
    fn from(err: TryReserveError) -> Self {
        TransferError::ResourceExhausted(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
