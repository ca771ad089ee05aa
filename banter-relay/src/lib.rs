//! Banter Relay Server
//!
//! A TCP chat relay: each client opens a connection, hands over a
//! display name in its first frame, and from then on every frame it
//! sends is rebroadcast to all other registered clients. Exposed as a
//! library so integration tests can drive a real server in-process.

pub mod codec;
pub mod config;
pub mod handler;
pub mod hub;
pub mod registry;
pub mod server;
