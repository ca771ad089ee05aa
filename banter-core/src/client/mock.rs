//! Mock Transport
//!
//! Mock implementation of the Transport trait for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::NetworkError;
use super::transport::{Transport, TransportConfig, TransportResult};

/// How long an empty receive() simulates the poll interval.
const MOCK_POLL_WAIT: Duration = Duration::from_millis(2);

/// Shared state behind a mock transport and its control handles.
#[derive(Debug, Default)]
struct MockState {
    connected: bool,
    /// Payloads that have been sent.
    sent: Vec<String>,
    /// Payloads to return on receive().
    receive_queue: VecDeque<String>,
    /// Errors to return from upcoming connect() calls, in order.
    connect_failures: VecDeque<NetworkError>,
    /// Error to inject on the next send or receive.
    inject_error: Option<NetworkError>,
    /// Total connect() calls observed.
    connect_calls: u32,
}

/// Mock transport for testing.
///
/// Allows injection of responses and tracking of sent payloads. Because a
/// transport is moved into the session that owns it, the mock exposes a
/// [`MockHandle`] that shares its state, so tests can keep scripting
/// failures and inspecting traffic from the outside.
///
/// # Example
///
/// ```ignore
/// use banter_core::client::{MockTransport, Transport, TransportConfig};
///
/// let transport = MockTransport::new();
/// let handle = transport.handle();
///
/// // Queue a payload to be returned by receive()
/// handle.queue_receive("bob: hi there");
///
/// // ... hand `transport` to the code under test ...
///
/// assert_eq!(handle.sent(), vec!["alice".to_string()]);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

/// Cross-thread control handle for a [`MockTransport`].
#[derive(Debug, Clone)]
pub struct MockHandle {
    inner: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Returns a handle sharing this transport's state.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl MockHandle {
    /// Queues a payload to be returned by an upcoming receive() call.
    pub fn queue_receive(&self, payload: impl Into<String>) {
        self.lock().receive_queue.push_back(payload.into());
    }

    /// Returns all payloads that have been sent.
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Clears the sent payload log.
    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }

    /// Scripts the next `count` connect() calls to fail.
    pub fn fail_next_connects(&self, count: u32) {
        let mut state = self.lock();
        for _ in 0..count {
            state
                .connect_failures
                .push_back(NetworkError::ConnectionFailed("scripted failure".into()));
        }
    }

    /// Injects an error to be returned by the next send or receive.
    ///
    /// The transport also drops its connection, as a real stream error
    /// would leave the socket unusable.
    pub fn inject_error(&self, error: NetworkError) {
        self.lock().inject_error = Some(error);
    }

    /// Returns true while the mock is connected.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Returns the number of connect() calls observed so far.
    pub fn connect_calls(&self) -> u32 {
        self.lock().connect_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().expect("mock state poisoned")
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _config: &TransportConfig) -> TransportResult<()> {
        let mut state = self.inner.lock().expect("mock state poisoned");
        state.connect_calls += 1;

        if let Some(err) = state.connect_failures.pop_front() {
            state.connected = false;
            return Err(err);
        }

        state.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        let mut state = self.inner.lock().expect("mock state poisoned");
        state.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().expect("mock state poisoned").connected
    }

    fn send(&mut self, payload: &str) -> TransportResult<()> {
        let mut state = self.inner.lock().expect("mock state poisoned");

        if let Some(err) = state.inject_error.take() {
            state.connected = false;
            return Err(err);
        }
        if !state.connected {
            return Err(NetworkError::NotConnected);
        }

        state.sent.push(payload.to_string());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<String>> {
        let next = {
            let mut state = self.inner.lock().expect("mock state poisoned");

            if let Some(err) = state.inject_error.take() {
                state.connected = false;
                return Err(err);
            }
            if !state.connected {
                return Err(NetworkError::NotConnected);
            }

            state.receive_queue.pop_front()
        };

        if next.is_none() {
            // Simulate the poll tick of a real transport so callers that
            // spin on receive() do not busy-loop in tests
            std::thread::sleep(MOCK_POLL_WAIT);
        }
        Ok(next)
    }
}
