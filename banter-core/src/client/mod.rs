//! Client Connection Layer
//!
//! Resilient client-side connection management for the banter relay.
//!
//! # Architecture
//!
//! The client layer consists of:
//! - **Transport trait**: interface over the framed connection (TCP in
//!   production, a mock in tests)
//! - **Connection manager**: the `Disconnected → Connecting → Registering →
//!   Connected` state machine with a uniform retry budget
//! - **Chat session**: the concurrency wrapper pairing a caller-driven send
//!   path with a worker-thread receive/reconnect path over one shared handle
//!
//! # Example
//!
//! ```ignore
//! use banter_core::client::{ChatSession, TcpTransport, TransportConfig};
//!
//! let config = TransportConfig::for_addr("127.0.0.1:8000");
//! let (session, events) = ChatSession::start(TcpTransport::new(), config, "alice".into());
//!
//! session.send("hello, room")?;
//! for event in events {
//!     println!("{:?}", event);
//! }
//! ```

mod connection;
mod error;
mod mock;
mod session;
mod tcp;
mod transport;

// Error types
pub use error::NetworkError;

// Transport abstraction
pub use transport::{SessionState, Transport, TransportConfig, TransportResult};

// TCP transport for production
pub use tcp::TcpTransport;

// Mock transport for testing
pub use mock::{MockHandle, MockTransport};

// Connection management
pub use connection::ConnectionManager;

// Concurrent session
pub use session::{ChatSession, SessionEvent};
