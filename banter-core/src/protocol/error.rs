//! Protocol Error Types
//!
//! Error types for framing and message parsing.

use thiserror::Error;

/// Framing and message format error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload length does not fit in the fixed-width header.
    #[error("Frame too large: {len} bytes")]
    FrameTooLarge { len: u64 },

    /// The length header is not a decimal number.
    #[error("Malformed frame header: {header:?}")]
    MalformedHeader { header: String },

    /// The payload has no `sender: content` separator.
    #[error("Malformed message: missing sender separator")]
    MalformedMessage,

    /// The payload is not valid UTF-8.
    #[error("Frame payload is not valid UTF-8")]
    InvalidPayload,
}
