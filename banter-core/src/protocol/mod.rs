//! Wire Protocol
//!
//! Framing and message format shared by the relay server and clients.
//!
//! A frame is a 10-byte ASCII decimal length header (left-justified,
//! space-padded) followed by that many bytes of UTF-8 payload. The first
//! frame a client sends is its bare display name (the handshake); every
//! frame the server sends carries a message in the textual form
//! `"<sender>: <content>"`.

mod error;
mod frame;
mod message;

// Error types
pub use error::ProtocolError;

// Framing
pub use frame::{decode_header, encode_frame, header_for_len, HEADER_LEN, MAX_PAYLOAD_LEN};

// Message format
pub use message::{is_valid_sender, Message, MAX_SENDER_LEN, SYSTEM_SENDER};
