//! Tests for the wire protocol
//!
//! Property-based coverage of the framing round-trip law, plus the header
//! and message-format boundaries.

use proptest::prelude::*;

use banter_core::protocol::{
    decode_header, encode_frame, header_for_len, is_valid_sender, Message, HEADER_LEN,
    MAX_PAYLOAD_LEN,
};

/// Splits a frame into its header array and payload bytes.
fn split_frame(frame: &[u8]) -> ([u8; HEADER_LEN], &[u8]) {
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&frame[..HEADER_LEN]);
    (header, &frame[HEADER_LEN..])
}

proptest! {
    /// For any payload whose byte length fits the header, decoding what
    /// encode produced yields the payload back unchanged.
    #[test]
    fn prop_frame_round_trip(payload in ".{0,300}") {
        let frame = encode_frame(&payload).unwrap();
        let (header, body) = split_frame(&frame);

        let len = decode_header(&header).unwrap();
        prop_assert_eq!(len as usize, payload.len());
        prop_assert_eq!(body, payload.as_bytes());
        prop_assert_eq!(std::str::from_utf8(body).unwrap(), payload);
    }

    /// Headers are always exactly 10 bytes: digits first, spaces after.
    #[test]
    fn prop_header_is_left_justified_and_space_padded(len in 0u64..=MAX_PAYLOAD_LEN) {
        let header = header_for_len(len).unwrap();
        let digits = len.to_string();

        prop_assert_eq!(header.len(), HEADER_LEN);
        prop_assert_eq!(&header[..digits.len()], digits.as_bytes());
        prop_assert!(header[digits.len()..].iter().all(|&b| b == b' '));
        prop_assert_eq!(decode_header(&header).unwrap(), len);
    }

    /// The textual message form survives a display/parse round trip for
    /// any valid sender, even when the content contains the separator.
    #[test]
    fn prop_message_wire_form_round_trip(
        sender in "[a-zA-Z][a-zA-Z0-9_-]{0,30}",
        content in ".{0,200}",
    ) {
        prop_assume!(is_valid_sender(&sender));

        let original = Message::new(sender, content);
        let parsed = Message::parse(&original.to_string()).unwrap();
        prop_assert_eq!(parsed, original);
    }

    /// Multi-byte characters count as their UTF-8 byte length.
    #[test]
    fn prop_header_counts_bytes_not_chars(payload in "[αβγ日本語]{1,50}") {
        let frame = encode_frame(&payload).unwrap();
        let (header, body) = split_frame(&frame);

        prop_assert_eq!(decode_header(&header).unwrap() as usize, payload.len());
        prop_assert!(payload.len() > payload.chars().count());
        prop_assert_eq!(body.len(), payload.len());
    }
}

#[test]
fn test_header_padding_boundary() {
    // The documented example: a 3-byte payload
    let frame = encode_frame("abc").unwrap();
    let (header, _) = split_frame(&frame);

    assert_eq!(&header, b"3         ");
    assert_eq!(decode_header(&header).unwrap(), 3);
}

#[test]
fn test_frames_concatenate_cleanly() {
    // Two frames back to back on a stream stay separable by length alone
    let mut stream = encode_frame("alice: one").unwrap();
    stream.extend_from_slice(&encode_frame("bob: two").unwrap());

    let (first_header, _) = split_frame(&stream);
    let first_len = decode_header(&first_header).unwrap() as usize;
    let second_start = HEADER_LEN + first_len;

    assert_eq!(&stream[HEADER_LEN..second_start], b"alice: one");

    let (second_header, _) = split_frame(&stream[second_start..]);
    let second_len = decode_header(&second_header).unwrap() as usize;
    assert_eq!(
        &stream[second_start + HEADER_LEN..second_start + HEADER_LEN + second_len],
        b"bob: two"
    );
}
