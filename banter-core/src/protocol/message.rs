//! Message Type
//!
//! Chat messages and their textual wire form.

use std::fmt;

use super::error::ProtocolError;

/// Reserved sender identity for server-originated messages.
pub const SYSTEM_SENDER: &str = "System";

/// Maximum display name length in bytes.
pub const MAX_SENDER_LEN: usize = 64;

/// Separator between sender and content in the wire form.
const SENDER_SEPARATOR: &str = ": ";

/// A chat message attributed to a sender.
///
/// The textual wire form is `"<sender>: <content>"`. Parsing splits on the
/// *first* separator, so content may itself contain `": "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name of the sender.
    pub sender: String,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            sender: sender.into(),
            content: content.into(),
        }
    }

    /// Creates a message from the reserved system sender.
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            sender: SYSTEM_SENDER.to_string(),
            content: content.into(),
        }
    }

    /// Parses the textual wire form `"<sender>: <content>"`.
    pub fn parse(payload: &str) -> Result<Self, ProtocolError> {
        let (sender, content) = payload
            .split_once(SENDER_SEPARATOR)
            .ok_or(ProtocolError::MalformedMessage)?;

        Ok(Message {
            sender: sender.to_string(),
            content: content.to_string(),
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.sender, SENDER_SEPARATOR, self.content)
    }
}

/// Checks whether a display name is usable on the wire.
///
/// A valid name is non-empty, at most [`MAX_SENDER_LEN`] bytes, carries no
/// leading or trailing whitespace, no control characters, and does not
/// contain the sender separator (which would corrupt the wire form).
pub fn is_valid_sender(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_SENDER_LEN
        && name.trim() == name
        && !name.contains(SENDER_SEPARATOR)
        && !name.chars().any(|c| c.is_control())
}
