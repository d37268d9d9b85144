use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("device rejected command with status {0}")]
    Rejected(u16),
    #[error("timeout")]
    Timeout,
    #[error("I/O error: {0}")]
    Io(String),
    #[error("transport closed")]
    Closed,
}
