//! Connection Registry
//!
//! Owns the write half and identity of every registered peer. The
//! registry is only ever touched from the hub task, which is what keeps
//! broadcast order total without locks.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::oneshot;
use tracing::warn;

use banter_core::protocol::{encode_frame, Message};

/// Stable identifier for one accepted connection. Monotonic per server
/// run, never reused, and never derived from the socket handle itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl ConnId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A registered peer: display name plus the write side of its socket.
pub struct Peer {
    pub name: String,
    pub addr: SocketAddr,
    pub joined_at: Instant,
    writer: OwnedWriteHalf,
    shutdown: oneshot::Sender<()>,
}

impl Peer {
    pub fn new(
        name: String,
        addr: SocketAddr,
        writer: OwnedWriteHalf,
        shutdown: oneshot::Sender<()>,
    ) -> Self {
        Self {
            name,
            addr,
            joined_at: Instant::now(),
            writer,
            shutdown,
        }
    }

    /// Tears the peer down: signals its reader task to stop, then drops
    /// the write half, closing our side of the socket.
    fn close(self) {
        let _ = self.shutdown.send(());
    }

    /// Hands one encoded frame to the kernel without blocking. Anything
    /// short of a complete write counts as failure: a partial write
    /// would tear the frame, and a full socket buffer means the
    /// recipient has stopped draining.
    fn try_send(&self, frame: &[u8]) -> bool {
        match self.writer.try_write(frame) {
            Ok(n) => n == frame.len(),
            Err(_) => false,
        }
    }
}

/// All currently registered peers, keyed by connection id.
#[derive(Default)]
pub struct Registry {
    peers: HashMap<ConnId, Peer>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ConnId, peer: Peer) {
        self.peers.insert(id, peer);
    }

    /// Removes a peer without signalling it, for when its reader task
    /// has already exited. Returns the entry if it was still registered.
    pub fn remove(&mut self, id: ConnId) -> Option<Peer> {
        self.peers.remove(&id)
    }

    pub fn name(&self, id: ConnId) -> Option<&str> {
        self.peers.get(&id).map(|peer| peer.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Fans a message out to every peer except `exclude`. The frame is
    /// encoded once; peers whose sockets cannot take all of it right now
    /// are evicted, so one dead or stalled recipient never holds up the
    /// rest. Returns how many peers received the frame.
    pub fn broadcast(&mut self, message: &Message, exclude: ConnId) -> usize {
        let Ok(frame) = encode_frame(&message.to_string()) else {
            warn!("dropping unencodable broadcast from {}", message.sender);
            return 0;
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (&id, peer) in &self.peers {
            if id == exclude {
                continue;
            }
            if peer.try_send(&frame) {
                delivered += 1;
            } else {
                failed.push(id);
            }
        }
        for id in failed {
            self.evict(id);
        }
        delivered
    }

    /// Writes a message to a single peer, evicting it on failure.
    /// Returns whether the frame was delivered.
    pub fn unicast(&mut self, id: ConnId, message: &Message) -> bool {
        let Ok(frame) = encode_frame(&message.to_string()) else {
            warn!("dropping unencodable unicast to {}", id);
            return false;
        };
        let Some(peer) = self.peers.get(&id) else {
            return false;
        };
        if peer.try_send(&frame) {
            return true;
        }
        self.evict(id);
        false
    }

    fn evict(&mut self, id: ConnId) {
        if let Some(peer) = self.peers.remove(&id) {
            warn!("evicting {} ({}): socket not writable", peer.name, id);
            peer.close();
        }
    }
}
