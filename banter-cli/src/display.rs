//! Display Helpers
//!
//! Terminal rendering for chat messages and connection status. Every
//! sender gets a stable color derived from a digest of their name, so
//! the same person looks the same across sessions and machines.

use std::time::Duration;

use console::{style, Style};
use sha2::{Digest, Sha256};

use banter_core::protocol::{Message, SYSTEM_SENDER};

/// Number of colors ordinary senders are spread across. System lines
/// are always red and never drawn from this palette.
const PALETTE_LEN: usize = 5;

/// Prints one chat message, whole line in the sender's color.
pub fn message(message: &Message) {
    println!("{}", sender_style(&message.sender).apply_to(message));
}

/// Style for one sender's lines.
fn sender_style(name: &str) -> Style {
    if name == SYSTEM_SENDER {
        return Style::new().red();
    }
    match palette_index(name) {
        0 => Style::new().green(),
        1 => Style::new().yellow(),
        2 => Style::new().blue(),
        3 => Style::new().magenta(),
        _ => Style::new().cyan(),
    }
}

/// Stable palette slot for a display name: the SHA-256 digest of the
/// name, folded modulo the palette size.
fn palette_index(name: &str) -> usize {
    let digest = Sha256::digest(name.as_bytes());
    fold_mod(&digest, PALETTE_LEN)
}

/// `bytes` read as one big-endian integer, modulo `m`.
fn fold_mod(bytes: &[u8], m: usize) -> usize {
    bytes
        .iter()
        .fold(0usize, |acc, &b| (acc * 256 + b as usize) % m)
}

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Status line for a (re)established session.
pub fn connected(server: &str) {
    success(&format!("Connected to {server}"));
}

/// Status line for a dropped connection.
pub fn disconnected(error_text: &str) {
    warning(&format!("Disconnected: {error_text}"));
}

/// Status line for an upcoming reconnect attempt.
pub fn reconnecting(attempt: u32, delay: Duration) {
    info(&format!("Reconnecting (attempt {}) in {:?}", attempt + 1, delay));
}

/// Final status line when the session is over.
pub fn terminated(reason: Option<&str>) {
    match reason {
        Some(reason) => error(&format!("Session ended: {reason}")),
        None => info("Session ended"),
    }
}
