//! Hub Event Loop
//!
//! One task owns the registry and serializes every join, frame, and
//! leave through a single queue. The order events drain in is the order
//! every recipient observes, so broadcasts are totally ordered without
//! any locking.

use std::net::SocketAddr;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use banter_core::protocol::Message;

use crate::registry::{ConnId, Peer, Registry};

/// Everything a connection task can ask of the hub.
pub enum HubEvent {
    /// A connection finished its handshake and wants to be registered.
    Join {
        id: ConnId,
        name: String,
        addr: SocketAddr,
        writer: OwnedWriteHalf,
        shutdown: oneshot::Sender<()>,
    },
    /// A registered connection read one chat frame off its socket.
    Frame { id: ConnId, content: String },
    /// A connection's reader ended (clean close, error, or truncation).
    Leave { id: ConnId, reason: String },
}

/// Owns the registry and drains the event queue until every sender
/// handle (one per connection task) is gone.
pub struct Hub {
    events: mpsc::Receiver<HubEvent>,
    registry: Registry,
}

impl Hub {
    pub fn new(events: mpsc::Receiver<HubEvent>) -> Self {
        Self {
            events,
            registry: Registry::new(),
        }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.dispatch(event);
        }
        debug!("event queue closed, hub exiting");
    }

    fn dispatch(&mut self, event: HubEvent) {
        match event {
            HubEvent::Join {
                id,
                name,
                addr,
                writer,
                shutdown,
            } => self.join(id, name, addr, writer, shutdown),
            HubEvent::Frame { id, content } => self.frame(id, content),
            HubEvent::Leave { id, reason } => self.leave(id, reason),
        }
    }

    fn join(
        &mut self,
        id: ConnId,
        name: String,
        addr: SocketAddr,
        writer: OwnedWriteHalf,
        shutdown: oneshot::Sender<()>,
    ) {
        let welcome = Message::system(format!("Welcome to the chatroom, {name}!"));
        self.registry
            .insert(id, Peer::new(name.clone(), addr, writer, shutdown));
        if !self.registry.unicast(id, &welcome) {
            // unicast already evicted the peer
            info!("{} ({}) dropped before its welcome", name, id);
            return;
        }
        info!(
            "{} joined from {} ({} connected)",
            name,
            addr,
            self.registry.len()
        );
    }

    fn frame(&mut self, id: ConnId, content: String) {
        // A frame can race its own sender's eviction; stale frames are
        // dropped rather than attributed to nobody.
        let Some(sender) = self.registry.name(id).map(str::to_string) else {
            debug!("discarding frame from unregistered {}", id);
            return;
        };
        let message = Message::new(sender, content);
        let delivered = self.registry.broadcast(&message, id);
        debug!("{} -> {} recipients", message.sender, delivered);
    }

    fn leave(&mut self, id: ConnId, reason: String) {
        if let Some(peer) = self.registry.remove(id) {
            info!(
                "{} left after {:?}: {} ({} connected)",
                peer.name,
                peer.joined_at.elapsed(),
                reason,
                self.registry.len()
            );
        }
    }
}
