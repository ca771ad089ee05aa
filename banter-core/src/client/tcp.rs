//! TCP Transport
//!
//! Blocking TCP transport with length-prefixed framing.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::protocol::{decode_header, encode_frame, ProtocolError, HEADER_LEN};

use super::error::NetworkError;
use super::transport::{Transport, TransportConfig, TransportResult};

/// Bytes read from the socket per call.
const READ_CHUNK: usize = 4096;

/// Inbound frames declaring more than this are treated as protocol violations.
const MAX_INBOUND_PAYLOAD: u64 = 1_048_576;

/// TCP transport for chat communication.
///
/// Reads use the configured poll interval as a read timeout; bytes received
/// so far are accumulated internally, so a frame split across any number of
/// TCP segments is always surfaced whole.
///
/// # Example
///
/// ```ignore
/// use banter_core::client::{TcpTransport, Transport, TransportConfig};
///
/// let mut transport = TcpTransport::new();
/// transport.connect(&TransportConfig::for_addr("127.0.0.1:8000"))?;
/// transport.send("alice")?;
/// ```
pub struct TcpTransport {
    stream: Option<TcpStream>,
    buffer: Vec<u8>,
    connected: bool,
}

impl TcpTransport {
    /// Creates a new TCP transport.
    pub fn new() -> Self {
        TcpTransport {
            stream: None,
            buffer: Vec::new(),
            connected: false,
        }
    }

    /// Resolves `host:port` to a socket address.
    fn resolve_addr(addr: &str) -> Result<SocketAddr, NetworkError> {
        addr.to_socket_addrs()
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?
            .next()
            .ok_or_else(|| {
                NetworkError::ConnectionFailed(format!("Address did not resolve: {}", addr))
            })
    }

    /// Extracts one complete frame payload from the accumulation buffer.
    ///
    /// Returns `Ok(None)` while the buffered bytes do not yet form a whole
    /// frame.
    fn take_buffered_frame(&mut self) -> TransportResult<Option<String>> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&self.buffer[..HEADER_LEN]);
        let len = decode_header(&header)?;

        if len > MAX_INBOUND_PAYLOAD {
            return Err(ProtocolError::FrameTooLarge { len }.into());
        }

        let total = HEADER_LEN + len as usize;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let payload_bytes = self.buffer[HEADER_LEN..total].to_vec();
        self.buffer.drain(..total);

        let payload =
            String::from_utf8(payload_bytes).map_err(|_| ProtocolError::InvalidPayload)?;
        Ok(Some(payload))
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        if self.connected {
            return Ok(());
        }

        let addr = Self::resolve_addr(&config.server_addr)?;
        let stream =
            TcpStream::connect_timeout(&addr, Duration::from_millis(config.connect_timeout_ms))
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                        NetworkError::Timeout
                    }
                    _ => NetworkError::ConnectionFailed(e.to_string()),
                })?;

        stream
            .set_read_timeout(Some(Duration::from_millis(config.poll_interval_ms)))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        stream
            .set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        let _ = stream.set_nodelay(true);

        self.stream = Some(stream);
        self.buffer.clear();
        self.connected = true;

        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both); // Ignore errors on close
        }
        self.buffer.clear();
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected && self.stream.is_some()
    }

    fn send(&mut self, payload: &str) -> TransportResult<()> {
        let stream = self.stream.as_mut().ok_or(NetworkError::NotConnected)?;
        let frame = encode_frame(payload)?;

        match stream.write_all(&frame) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.connected = false;
                Err(NetworkError::SendFailed(e.to_string()))
            }
        }
    }

    fn receive(&mut self) -> TransportResult<Option<String>> {
        // Serve a buffered frame before touching the socket
        if let Some(payload) = self.take_buffered_frame()? {
            return Ok(Some(payload));
        }

        let stream = self.stream.as_mut().ok_or(NetworkError::NotConnected)?;
        let mut chunk = [0u8; READ_CHUNK];

        match stream.read(&mut chunk) {
            Ok(0) => {
                self.connected = false;
                Err(NetworkError::ConnectionClosed)
            }
            Ok(n) => {
                self.buffer.extend_from_slice(&chunk[..n]);
                self.take_buffered_frame()
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Poll interval elapsed without data
                Ok(None)
            }
            Err(e) => {
                self.connected = false;
                Err(NetworkError::ReceiveFailed(e.to_string()))
            }
        }
    }
}

// INLINE_TEST_REQUIRED: Tests private buffer accumulation against a real localhost listener
#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    fn test_config(addr: &str) -> TransportConfig {
        TransportConfig {
            server_addr: addr.to_string(),
            connect_timeout_ms: 2_000,
            poll_interval_ms: 20,
            ..Default::default()
        }
    }

    /// Polls receive() until a frame arrives or the deadline passes.
    fn receive_within(transport: &mut TcpTransport, secs: u64) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(secs);
        while Instant::now() < deadline {
            match transport.receive() {
                Ok(Some(payload)) => return Some(payload),
                Ok(None) => continue,
                Err(_) => return None,
            }
        }
        None
    }

    #[test]
    fn test_tcp_transport_connection_refused() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut transport = TcpTransport::new();
        let result = transport.connect(&test_config(&addr));

        assert!(matches!(result, Err(NetworkError::ConnectionFailed(_))));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_tcp_transport_not_connected() {
        let mut transport = TcpTransport::new();

        assert!(matches!(
            transport.send("x"),
            Err(NetworkError::NotConnected)
        ));
        assert!(matches!(
            transport.receive(),
            Err(NetworkError::NotConnected)
        ));

        // Disconnect is safe when not connected
        transport.disconnect().unwrap();
    }

    #[test]
    fn test_tcp_transport_send_receive() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 64];
            let n = stream.read(&mut buf).unwrap();
            stream
                .write_all(&encode_frame("server: hi").unwrap())
                .unwrap();
            buf[..n].to_vec()
        });

        let mut transport = TcpTransport::new();
        transport.connect(&test_config(&addr)).unwrap();
        assert!(transport.is_connected());

        transport.send("hello").unwrap();
        let received = receive_within(&mut transport, 5).expect("no frame received");
        assert_eq!(received, "server: hi");

        let sent = server.join().unwrap();
        assert_eq!(sent, encode_frame("hello").unwrap());

        transport.disconnect().unwrap();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_tcp_transport_accumulates_partial_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let frame = encode_frame("alice: split delivery").unwrap();
            // Dribble the frame a few bytes at a time
            for chunk in frame.chunks(7) {
                stream.write_all(chunk).unwrap();
                stream.flush().unwrap();
                thread::sleep(Duration::from_millis(10));
            }
        });

        let mut transport = TcpTransport::new();
        transport.connect(&test_config(&addr)).unwrap();

        let received = receive_within(&mut transport, 5).expect("no frame received");
        assert_eq!(received, "alice: split delivery");

        server.join().unwrap();
    }

    #[test]
    fn test_tcp_transport_two_frames_in_one_segment() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut bytes = encode_frame("a: one").unwrap();
            bytes.extend_from_slice(&encode_frame("b: two").unwrap());
            stream.write_all(&bytes).unwrap();
        });

        let mut transport = TcpTransport::new();
        transport.connect(&test_config(&addr)).unwrap();

        assert_eq!(receive_within(&mut transport, 5).as_deref(), Some("a: one"));
        assert_eq!(receive_within(&mut transport, 5).as_deref(), Some("b: two"));

        server.join().unwrap();
    }

    #[test]
    fn test_tcp_transport_detects_peer_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let mut transport = TcpTransport::new();
        transport.connect(&test_config(&addr)).unwrap();
        server.join().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut failed = false;
        while Instant::now() < deadline {
            match transport.receive() {
                Ok(None) => continue,
                Ok(Some(_)) => panic!("no frame was sent"),
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }

        assert!(failed);
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_tcp_transport_rejects_oversized_declared_length() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            // Header declares far more than the inbound limit
            stream.write_all(b"9999999999").unwrap();
            stream.write_all(b"junk").unwrap();
            // Hold the socket open so the error comes from the header check
            thread::sleep(Duration::from_millis(500));
        });

        let mut transport = TcpTransport::new();
        transport.connect(&test_config(&addr)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut result = Ok(None);
        while Instant::now() < deadline {
            result = transport.receive();
            if !matches!(result, Ok(None)) {
                break;
            }
        }

        assert!(matches!(
            result,
            Err(NetworkError::Protocol(ProtocolError::FrameTooLarge { .. }))
        ));

        server.join().unwrap();
    }
}
