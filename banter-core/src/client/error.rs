//! Network Error Types
//!
//! Error types for transport and session operations.

use thiserror::Error;

use crate::protocol::ProtocolError;

/// Network and transport error types.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timed out")]
    Timeout,

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Message receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Transport not connected")]
    NotConnected,

    #[error("Max retries exceeded")]
    MaxRetriesExceeded,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
