//! Relay Configuration
//!
//! All settings come from environment variables with sensible defaults,
//! so a bare `banter-relay` starts a working local server.

use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MAX_FRAME_BYTES: u64 = 1024 * 1024;
const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_EVENT_QUEUE: usize = 1024;

/// Runtime configuration for the relay server.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the TCP listener binds to.
    pub listen_addr: String,
    /// Upper bound on a single frame's payload; larger declared lengths
    /// are rejected before any buffer is allocated.
    pub max_frame_bytes: u64,
    /// How long a fresh connection may take to send its handshake frame.
    pub handshake_timeout_ms: u64,
    /// Capacity of the hub event queue shared by all connection tasks.
    pub event_queue: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            event_queue: DEFAULT_EVENT_QUEUE,
        }
    }
}

impl RelayConfig {
    /// Builds the configuration from `BANTER_*` environment variables.
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            listen_addr: env::var("BANTER_LISTEN_ADDR")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string()),
            max_frame_bytes: env_parse("BANTER_MAX_FRAME_BYTES", DEFAULT_MAX_FRAME_BYTES),
            handshake_timeout_ms: env_parse(
                "BANTER_HANDSHAKE_TIMEOUT_MS",
                DEFAULT_HANDSHAKE_TIMEOUT_MS,
            ),
            event_queue: env_parse("BANTER_EVENT_QUEUE", DEFAULT_EVENT_QUEUE),
        }
    }

    /// Handshake timeout as a [`Duration`].
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
