//! Async Frame Codec
//!
//! Reads and writes length-prefixed frames over any async byte stream.
//! The wire format itself (10-byte ASCII length header, UTF-8 payload)
//! lives in `banter_core::protocol`; this module adds the I/O driving
//! around it, accumulating headers across partial reads and telling a
//! clean close apart from a truncated frame.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use banter_core::protocol::{decode_header, encode_frame, HEADER_LEN};

/// Reads one complete frame, returning its payload.
///
/// Returns `Ok(None)` when the peer closed the connection cleanly on a
/// frame boundary. A close in the middle of a header or payload is an
/// [`io::ErrorKind::UnexpectedEof`] error, and a header that is
/// malformed, oversized (beyond `max_payload`), or followed by invalid
/// UTF-8 is [`io::ErrorKind::InvalidData`]. The size guard runs before
/// the payload buffer is allocated.
pub async fn read_frame<R>(reader: &mut R, max_payload: u64) -> io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-header",
            ));
        }
        filled += n;
    }

    let len = decode_header(&header).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if len > max_payload {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("declared payload of {len} bytes exceeds the {max_payload} byte limit"),
        ));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;

    let text = String::from_utf8(payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(text))
}

/// Writes one payload as a complete frame.
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame =
        encode_frame(payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    const MAX: u64 = 1024;

    #[tokio::test]
    async fn test_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_frame(&mut client, "alice: hello").await.unwrap();
        let payload = read_frame(&mut server, MAX).await.unwrap();
        assert_eq!(payload.as_deref(), Some("alice: hello"));
    }

    #[tokio::test]
    async fn test_multibyte_payload_uses_byte_length() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_frame(&mut client, "café ☕").await.unwrap();
        let payload = read_frame(&mut server, MAX).await.unwrap();
        assert_eq!(payload.as_deref(), Some("café ☕"));
    }

    #[tokio::test]
    async fn test_empty_payload() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_frame(&mut client, "").await.unwrap();
        let payload = read_frame(&mut server, MAX).await.unwrap();
        assert_eq!(payload.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_two_frames_back_to_back() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_frame(&mut client, "first").await.unwrap();
        write_frame(&mut client, "second").await.unwrap();
        assert_eq!(
            read_frame(&mut server, MAX).await.unwrap().as_deref(),
            Some("first")
        );
        assert_eq!(
            read_frame(&mut server, MAX).await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_accumulates_partial_delivery() {
        let (mut client, mut server) = tokio::io::duplex(256);
        let frame = encode_frame("drip fed").unwrap();
        let writer = tokio::spawn(async move {
            for chunk in frame.chunks(3) {
                client.write_all(chunk).await.unwrap();
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            client
        });
        let payload = read_frame(&mut server, MAX).await.unwrap();
        assert_eq!(payload.as_deref(), Some("drip fed"));
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_clean_eof_on_frame_boundary() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        assert!(read_frame(&mut server, MAX).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_mid_header_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"5    ").await.unwrap();
        drop(client);
        let err = read_frame(&mut server, MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_eof_mid_payload_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"10        abc").await.unwrap();
        drop(client);
        let err = read_frame(&mut server, MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"not-a-len paddingpadding").await.unwrap();
        let err = read_frame(&mut server, MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_oversized_length_is_rejected_before_allocation() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"9999999999").await.unwrap();
        let err = read_frame(&mut server, MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_invalid_utf8_payload_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"4         ").await.unwrap();
        client.write_all(&[0xff, 0xfe, 0xfd, 0xfc]).await.unwrap();
        let err = read_frame(&mut server, MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_limit_applies_to_wellformed_frames_too() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_frame(&mut client, "this payload is fine to write")
            .await
            .unwrap();
        let err = read_frame(&mut server, 8).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
