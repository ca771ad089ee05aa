//! Accept Loop
//!
//! Takes a ready listener rather than binding one, so integration tests
//! can bind port zero and read the address back. Each accepted socket
//! gets the next monotonic connection id and its own reader task.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::RelayConfig;
use crate::handler::handle_connection;
use crate::hub::Hub;
use crate::registry::ConnId;

/// Runs the relay on `listener` until accepting fails.
pub async fn serve(listener: TcpListener, config: RelayConfig) {
    let (events, queue) = mpsc::channel(config.event_queue);
    tokio::spawn(Hub::new(queue).run());

    let max_frame_bytes = config.max_frame_bytes;
    let handshake_timeout = config.handshake_timeout();

    let mut next_id: u64 = 0;
    while let Ok((stream, addr)) = listener.accept().await {
        let id = ConnId::new(next_id);
        next_id += 1;
        info!("New connection from {} ({})", addr, id);

        let events = events.clone();
        tokio::spawn(handle_connection(
            id,
            stream,
            addr,
            events,
            max_frame_bytes,
            handshake_timeout,
        ));
    }
}
