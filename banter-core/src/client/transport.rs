//! Transport Trait
//!
//! Platform-agnostic abstraction for the chat connection.

use std::time::Duration;

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Client session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected, eligible for a connect attempt.
    Disconnected,
    /// TCP connect in progress.
    Connecting,
    /// Connected, sending the display-name handshake.
    Registering,
    /// Registered and exchanging messages.
    Connected,
    /// Shut down; no further reconnect attempts.
    Terminated,
}

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server address as `host:port`.
    pub server_addr: String,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Write timeout in milliseconds.
    pub write_timeout_ms: u64,
    /// Read poll interval in milliseconds. A receive call returns `None`
    /// after this long without a complete frame; it is not a liveness limit.
    pub poll_interval_ms: u64,
    /// Retry budget, applied uniformly to initial connect and reconnect.
    pub max_retries: u32,
    /// Base delay for exponential backoff (milliseconds).
    pub retry_base_delay_ms: u64,
    /// Upper bound for a single backoff delay (milliseconds).
    pub retry_max_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_addr: "127.0.0.1:8000".to_string(),
            connect_timeout_ms: 10_000,
            write_timeout_ms: 30_000,
            poll_interval_ms: 250,
            max_retries: 5,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 30_000,
        }
    }
}

impl TransportConfig {
    /// Creates a config for the given server address.
    pub fn for_addr(addr: &str) -> Self {
        TransportConfig {
            server_addr: addr.to_string(),
            ..Default::default()
        }
    }

    /// Backoff delay before the given retry attempt (capped exponential).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.retry_base_delay_ms * (1 << attempt.min(6));
        Duration::from_millis(delay_ms.min(self.retry_max_delay_ms))
    }
}

/// Transport trait for the chat connection.
///
/// This trait abstracts the underlying stream (TCP in production, a mock in
/// tests). Payloads are frame contents: the sent payload is either the bare
/// display name (handshake) or message content; received payloads are the
/// server's `"<sender>: <content>"` lines.
///
/// # Synchronous Interface
///
/// This trait uses synchronous methods for simplicity in the core library.
///
/// # Example
///
/// ```ignore
/// use banter_core::client::{MockTransport, Transport, TransportConfig};
///
/// let mut transport = MockTransport::new();
/// transport.connect(&TransportConfig::default())?;
/// transport.send("alice")?;
/// let line = transport.receive()?;
/// transport.disconnect()?;
/// ```
pub trait Transport: Send {
    /// Connects to the chat server.
    ///
    /// Returns `Ok(())` on successful connection.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Disconnects from the chat server.
    ///
    /// Safe to call even if not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns true if the connection is open.
    fn is_connected(&self) -> bool;

    /// Sends one frame carrying the given payload.
    ///
    /// This is a blocking call that waits for the send to complete.
    /// Returns an error if not connected.
    fn send(&mut self, payload: &str) -> TransportResult<()>;

    /// Receives the next frame payload.
    ///
    /// Returns `Ok(None)` if no complete frame arrived within the poll
    /// interval. Partial frames are accumulated and completed by later
    /// calls, never surfaced truncated.
    fn receive(&mut self) -> TransportResult<Option<String>>;
}
