//! Frame Layer
//!
//! Length-prefixed framing over a byte stream.
//!
//! Format: [length: 10 ASCII bytes, decimal, left-justified, space-padded]
//! [payload: length bytes, UTF-8]

use super::error::ProtocolError;

/// Frame header size (10-byte ASCII decimal length prefix).
pub const HEADER_LEN: usize = 10;

/// Largest payload length representable in the header (10 decimal digits).
pub const MAX_PAYLOAD_LEN: u64 = 9_999_999_999;

/// Builds the length header for a payload of `len` bytes.
///
/// The length is rendered in decimal, left-justified, and padded with
/// spaces to exactly [`HEADER_LEN`] bytes.
pub fn header_for_len(len: u64) -> Result<[u8; HEADER_LEN], ProtocolError> {
    if len > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge { len });
    }

    let digits = len.to_string();
    let mut header = [b' '; HEADER_LEN];
    header[..digits.len()].copy_from_slice(digits.as_bytes());
    Ok(header)
}

/// Serializes a payload to bytes with length framing.
///
/// The length counts payload *bytes*, not characters.
pub fn encode_frame(payload: &str) -> Result<Vec<u8>, ProtocolError> {
    let header = header_for_len(payload.len() as u64)?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(payload.as_bytes());
    Ok(frame)
}

/// Parses the payload length from a frame header.
///
/// Strips the space padding and parses the remaining decimal digits.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<u64, ProtocolError> {
    let text = std::str::from_utf8(header).map_err(|_| ProtocolError::MalformedHeader {
        header: String::from_utf8_lossy(header).into_owned(),
    })?;

    text.trim()
        .parse::<u64>()
        .map_err(|_| ProtocolError::MalformedHeader {
            header: text.trim().to_string(),
        })
}
