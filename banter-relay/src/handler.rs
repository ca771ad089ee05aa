//! Connection Handler
//!
//! One task per accepted socket: runs the handshake, registers with the
//! hub, then pumps frames until the peer goes away or the hub evicts it.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, warn};

use banter_core::protocol::is_valid_sender;

use crate::codec::read_frame;
use crate::hub::HubEvent;
use crate::registry::ConnId;

/// Drives one connection from accept to teardown. The read half stays
/// here; the write half is handed to the hub at registration and only
/// ever touched from there.
pub async fn handle_connection(
    id: ConnId,
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::Sender<HubEvent>,
    max_frame_bytes: u64,
    handshake_timeout: Duration,
) {
    let (mut reader, writer) = stream.into_split();

    // The first frame is the handshake: a bare display name.
    let name = match timeout(handshake_timeout, read_frame(&mut reader, max_frame_bytes)).await {
        Ok(Ok(Some(name))) => name,
        Ok(Ok(None)) => {
            debug!("{} ({}) closed before the handshake", addr, id);
            return;
        }
        Ok(Err(e)) => {
            debug!("{} ({}) sent a broken handshake: {}", addr, id, e);
            return;
        }
        Err(_) => {
            debug!("{} ({}) handshake timed out", addr, id);
            return;
        }
    };
    if !is_valid_sender(&name) {
        warn!("{} ({}) rejected: invalid display name {:?}", addr, id, name);
        return;
    }

    let (shutdown, mut evicted) = oneshot::channel();
    let join = HubEvent::Join {
        id,
        name,
        addr,
        writer,
        shutdown,
    };
    if events.send(join).await.is_err() {
        return;
    }

    let reason = loop {
        tokio::select! {
            // The hub dropped us after a write failure. Our registry
            // entry is already gone, so exit without a Leave.
            _ = &mut evicted => {
                debug!("{} reader stopping: evicted by the hub", id);
                return;
            }
            frame = read_frame(&mut reader, max_frame_bytes) => match frame {
                Ok(Some(content)) => {
                    if events.send(HubEvent::Frame { id, content }).await.is_err() {
                        return;
                    }
                }
                Ok(None) => break "connection closed".to_string(),
                Err(e) => break e.to_string(),
            },
        }
    };

    let _ = events.send(HubEvent::Leave { id, reason }).await;
}
