//! Banter Core Library
//!
//! Shared protocol and client machinery for the banter chat system. The
//! relay server, terminal client, and bot all build on this crate.
//!
//! The wire protocol is a minimal length-prefixed framing over TCP: each
//! frame carries a 10-byte ASCII decimal length header followed by that many
//! bytes of UTF-8 payload. See [`protocol`] for the framing functions and
//! [`client`] for the reconnecting session state machine.

pub mod client;
pub mod names;
pub mod protocol;

pub use client::{
    ChatSession, ConnectionManager, MockHandle, MockTransport, NetworkError, SessionEvent,
    SessionState, TcpTransport, Transport, TransportConfig, TransportResult,
};
pub use names::random_display_name;
pub use protocol::{
    decode_header, encode_frame, is_valid_sender, Message, ProtocolError, HEADER_LEN,
    MAX_PAYLOAD_LEN, SYSTEM_SENDER,
};
