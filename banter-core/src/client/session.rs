//! Chat Session
//!
//! Concurrency wrapper around the connection state machine.
//!
//! A session runs two execution paths over one shared connection handle:
//! the caller's thread drives sends, and a worker thread drives receives
//! plus the reconnect cycle. Every inspect-state-then-use-handle sequence
//! happens under a single mutex, so neither path can write to a handle the
//! other has closed and replaced during a reconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::protocol::Message;

use super::connection::ConnectionManager;
use super::error::NetworkError;
use super::transport::{SessionState, Transport, TransportConfig, TransportResult};

/// Slice length for backoff sleeps, so a stop request is noticed promptly.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Events emitted by a [`ChatSession`] to its consumer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Connected and registered with the relay.
    Connected,

    /// The connection dropped; a reconnect cycle follows.
    Disconnected {
        /// What broke, for the operator console.
        error: String,
    },

    /// Waiting out the backoff delay before the next connect attempt.
    Reconnecting {
        /// 0-based attempt number about to run.
        attempt: u32,
        /// How long the session backs off first.
        delay: Duration,
    },

    /// A broadcast message arrived.
    Message(Message),

    /// The session is over and the worker has exited.
    ///
    /// `reason` is set when the retry budget ran out; `None` means an
    /// orderly stop.
    Terminated { reason: Option<String> },
}

/// A live chat session with concurrent send and receive paths.
///
/// [`ChatSession::start`] spawns the worker thread and hands back the event
/// receiver; the caller keeps the session for [`send`](ChatSession::send)
/// and [`stop`](ChatSession::stop). While a reconnect cycle is in progress,
/// sends fail with [`NetworkError::NotConnected`]; nothing is queued.
///
/// # Example
///
/// ```ignore
/// use banter_core::client::{ChatSession, TcpTransport, TransportConfig};
///
/// let config = TransportConfig::for_addr("127.0.0.1:8000");
/// let (session, events) = ChatSession::start(TcpTransport::new(), config, "alice".into());
///
/// std::thread::spawn(move || {
///     for event in events {
///         println!("{:?}", event);
///     }
/// });
///
/// session.send("hello, room")?;
/// ```
pub struct ChatSession<T: Transport> {
    manager: Arc<Mutex<ConnectionManager<T>>>,
    finished: Arc<AtomicBool>,
    events: mpsc::Sender<SessionEvent>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Transport + 'static> ChatSession<T> {
    /// Starts a session: spawns the worker thread, which immediately begins
    /// the first connect cycle.
    ///
    /// Returns the session and the receiving end of its event stream.
    pub fn start(
        transport: T,
        config: TransportConfig,
        display_name: String,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let manager = Arc::new(Mutex::new(ConnectionManager::new(
            transport,
            config,
            display_name,
        )));
        let finished = Arc::new(AtomicBool::new(false));
        let (events_tx, events_rx) = mpsc::channel();

        let worker = {
            let manager = Arc::clone(&manager);
            let finished = Arc::clone(&finished);
            let events = events_tx.clone();
            thread::Builder::new()
                .name("banter-session".into())
                .spawn(move || run_worker(&manager, &finished, &events))
                .expect("failed to spawn session worker")
        };

        let session = ChatSession {
            manager,
            finished,
            events: events_tx,
            worker: Some(worker),
        };
        (session, events_rx)
    }
}

impl<T: Transport> ChatSession<T> {
    /// Sends one frame of message content to the relay.
    ///
    /// Fails with [`NetworkError::NotConnected`] while a reconnect cycle is
    /// in progress. A failure on the wire drops the connection, emits
    /// [`SessionEvent::Disconnected`], and leaves the reconnect to the
    /// worker.
    pub fn send(&self, content: &str) -> TransportResult<()> {
        let mut manager = lock(&self.manager);
        manager.send_content(content).inspect_err(|e| {
            if !matches!(e, NetworkError::NotConnected) {
                let _ = self.events.send(SessionEvent::Disconnected {
                    error: e.to_string(),
                });
            }
        })
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        lock(&self.manager).state()
    }

    /// Returns true while connected and registered.
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Returns the display name this session registers with.
    pub fn display_name(&self) -> String {
        lock(&self.manager).display_name().to_string()
    }

    /// Requests an orderly shutdown and waits for the worker to exit.
    ///
    /// Sets the finished flag, then closes the handle out-of-band so a read
    /// blocked in the worker unblocks. The worker emits
    /// [`SessionEvent::Terminated`] on its way out. Safe to call twice.
    pub fn stop(&mut self) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        lock(&self.manager).terminate();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl<T: Transport> Drop for ChatSession<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T: Transport>(
    manager: &Mutex<ConnectionManager<T>>,
) -> MutexGuard<'_, ConnectionManager<T>> {
    manager.lock().expect("session state poisoned")
}

/// The worker loop: receive path plus reconnect cycle.
///
/// Each iteration takes the lock once, acts on the observed state, and
/// releases it before sleeping, so the send path is never starved for
/// longer than one poll interval.
fn run_worker<T: Transport>(
    manager: &Mutex<ConnectionManager<T>>,
    finished: &AtomicBool,
    events: &mpsc::Sender<SessionEvent>,
) {
    let reason = loop {
        if finished.load(Ordering::SeqCst) {
            break None;
        }

        let state = lock(manager).state();
        match state {
            SessionState::Terminated => break None,

            SessionState::Connected => match lock(manager).poll_message() {
                Ok(Some(message)) => {
                    let _ = events.send(SessionEvent::Message(message));
                }
                Ok(None) => {} // Poll interval elapsed without a frame
                Err(e) => {
                    // A stop() between the state read and the poll also
                    // surfaces as an error here; that is not a disconnect
                    if !finished.load(Ordering::SeqCst) {
                        let _ = events.send(SessionEvent::Disconnected {
                            error: e.to_string(),
                        });
                    }
                }
            },

            // Disconnected (also the freshly started session): run one
            // connect attempt against the shared budget
            _ => {
                let attempt = match lock(manager).begin_attempt() {
                    Ok(attempt) => attempt,
                    Err(e) => break Some(e.to_string()),
                };

                let delay = lock(manager).backoff_before(attempt);
                if !delay.is_zero() {
                    let _ = events.send(SessionEvent::Reconnecting { attempt, delay });
                    sleep_interruptible(delay, finished);
                    if finished.load(Ordering::SeqCst) {
                        break None;
                    }
                }

                // A failed attempt loops straight back into begin_attempt
                if lock(manager).connect_and_register().is_ok() {
                    let _ = events.send(SessionEvent::Connected);
                }
            }
        }
    };

    let _ = events.send(SessionEvent::Terminated { reason });
}

/// Sleeps up to `duration`, waking early if `finished` is set.
fn sleep_interruptible(duration: Duration, finished: &AtomicBool) {
    let deadline = Instant::now() + duration;
    while !finished.load(Ordering::SeqCst) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(SHUTDOWN_POLL));
    }
}
