//! Connection Manager
//!
//! The client connection state machine: connect, register, exchange
//! frames, and account every attempt against one uniform retry budget.

use std::time::Duration;

use crate::protocol::Message;

use super::error::NetworkError;
use super::transport::{SessionState, Transport, TransportConfig, TransportResult};

/// Connection state machine over a [`Transport`].
///
/// Owns the transport handle and the display name, and drives the
/// `Disconnected → Connecting → Registering → Connected` cycle. A single
/// retry budget covers both the initial connect and every mid-session
/// reconnect; the attempt counter resets whenever a connect succeeds, so an
/// established session that later drops gets the full budget again.
///
/// The manager never sleeps. Backoff delays are computed here but waiting
/// is left to the caller (the session worker), so the state machine stays
/// synchronous and testable.
///
/// # Example
///
/// ```ignore
/// use banter_core::client::{ConnectionManager, MockTransport, TransportConfig};
///
/// let mut conn = ConnectionManager::new(
///     MockTransport::new(),
///     TransportConfig::default(),
///     "alice".into(),
/// );
/// conn.begin_attempt()?;
/// conn.connect_and_register()?;
/// ```
pub struct ConnectionManager<T: Transport> {
    transport: T,
    config: TransportConfig,
    display_name: String,
    state: SessionState,
    connect_attempt: u32,
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates a new connection manager.
    pub fn new(transport: T, config: TransportConfig, display_name: String) -> Self {
        ConnectionManager {
            transport,
            config,
            display_name,
            state: SessionState::Disconnected,
            connect_attempt: 0,
        }
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the display name sent in the handshake.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Charges one connect attempt against the retry budget.
    ///
    /// Returns the 0-based attempt number. Once the budget is spent the
    /// manager transitions to [`SessionState::Terminated`] and every further
    /// call fails with [`NetworkError::MaxRetriesExceeded`], the only
    /// unrecoverable path.
    pub fn begin_attempt(&mut self) -> TransportResult<u32> {
        if self.state == SessionState::Terminated {
            return Err(NetworkError::MaxRetriesExceeded);
        }
        if self.connect_attempt >= self.config.max_retries {
            self.terminate();
            return Err(NetworkError::MaxRetriesExceeded);
        }

        let attempt = self.connect_attempt;
        self.connect_attempt += 1;
        Ok(attempt)
    }

    /// Backoff delay to wait before the given 0-based attempt.
    ///
    /// The first attempt of a cycle is immediate; each later attempt waits
    /// the capped exponential delay for the failure that preceded it.
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            self.config.retry_delay(attempt - 1)
        }
    }

    /// Opens the connection and sends the display-name handshake.
    ///
    /// The handshake is the first frame on the wire and carries the bare
    /// name, not a `"name: content"` pair. On success the attempt counter
    /// resets and the state becomes [`SessionState::Connected`].
    pub fn connect_and_register(&mut self) -> TransportResult<()> {
        self.state = SessionState::Connecting;
        if let Err(e) = self.transport.connect(&self.config) {
            self.state = SessionState::Disconnected;
            return Err(e);
        }

        self.state = SessionState::Registering;
        if let Err(e) = self.transport.send(&self.display_name) {
            let _ = self.transport.disconnect();
            self.state = SessionState::Disconnected;
            return Err(e);
        }

        self.state = SessionState::Connected;
        self.connect_attempt = 0;
        Ok(())
    }

    /// Sends one frame of message content.
    ///
    /// Content goes out bare; the relay prepends the registered name before
    /// re-broadcasting. A send failure drops the connection.
    pub fn send_content(&mut self, content: &str) -> TransportResult<()> {
        if self.state != SessionState::Connected {
            return Err(NetworkError::NotConnected);
        }

        self.transport.send(content).inspect_err(|_| {
            self.mark_disconnected();
        })
    }

    /// Polls for the next broadcast message.
    ///
    /// Returns `Ok(None)` when no complete frame arrived within the
    /// transport's poll interval. Any I/O failure drops the connection, and a
    /// malformed payload is treated like a connection reset.
    pub fn poll_message(&mut self) -> TransportResult<Option<Message>> {
        if self.state != SessionState::Connected {
            return Err(NetworkError::NotConnected);
        }

        match self.transport.receive() {
            Ok(None) => Ok(None),
            Ok(Some(payload)) => match Message::parse(&payload) {
                Ok(message) => Ok(Some(message)),
                Err(e) => {
                    self.mark_disconnected();
                    Err(e.into())
                }
            },
            Err(e) => {
                self.mark_disconnected();
                Err(e)
            }
        }
    }

    /// Drops the connection and returns the state machine to
    /// [`SessionState::Disconnected`], ready for a reconnect cycle.
    pub fn mark_disconnected(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        let _ = self.transport.disconnect(); // Ignore errors on close
        self.state = SessionState::Disconnected;
    }

    /// Shuts the session down for good.
    ///
    /// Closes the transport out-of-band so a read blocked in another thread
    /// unblocks, and pins the state at [`SessionState::Terminated`].
    pub fn terminate(&mut self) {
        let _ = self.transport.disconnect();
        self.state = SessionState::Terminated;
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
