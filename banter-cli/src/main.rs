//! Banter CLI
//!
//! Interactive terminal client for the banter chat relay: lines typed
//! on stdin go to the room, broadcasts come back colored per sender.

mod display;

use std::io::{self, BufRead};
use std::thread;

use anyhow::Result;
use clap::Parser;

use banter_core::client::{
    ChatSession, SessionEvent, SessionState, TcpTransport, TransportConfig,
};
use banter_core::names::random_display_name;
use banter_core::protocol::is_valid_sender;

#[derive(Parser)]
#[command(name = "banter")]
#[command(version, about = "Terminal client for the banter chat relay")]
struct Cli {
    /// Relay address as host:port
    #[arg(short, long, env = "BANTER_SERVER", default_value = "127.0.0.1:8000")]
    server: String,

    /// Display name shown to the room (default: a random Guest-xxxxx)
    #[arg(short, long, env = "BANTER_NAME")]
    name: Option<String>,

    /// Connect attempts, initial and per reconnect, before giving up
    #[arg(long, default_value_t = 5)]
    max_retries: u32,

    /// Base backoff delay between attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let name = cli
        .name
        .clone()
        .unwrap_or_else(|| random_display_name("Guest"));
    if !is_valid_sender(&name) {
        anyhow::bail!(
            "invalid display name {name:?}: at most 64 bytes, no control characters, \
             no leading or trailing whitespace, no \": \""
        );
    }

    let config = TransportConfig {
        max_retries: cli.max_retries,
        retry_base_delay_ms: cli.retry_delay_ms,
        ..TransportConfig::for_addr(&cli.server)
    };

    display::info(&format!("Joining {} as {}", cli.server, name));
    let (mut session, events) = ChatSession::start(TcpTransport::new(), config, name);

    // Session events render on their own thread; stdin stays on this one.
    let server = cli.server.clone();
    let printer = thread::spawn(move || {
        for event in events {
            match event {
                SessionEvent::Connected => display::connected(&server),
                SessionEvent::Disconnected { error } => display::disconnected(&error),
                SessionEvent::Reconnecting { attempt, delay } => {
                    display::reconnecting(attempt, delay)
                }
                SessionEvent::Message(message) => display::message(&message),
                SessionEvent::Terminated { reason } => {
                    display::terminated(reason.as_deref());
                    break;
                }
            }
        }
    });

    for line in io::stdin().lock().lines() {
        let line = line?;
        if session.state() == SessionState::Terminated {
            break;
        }
        if line.is_empty() {
            continue;
        }
        if let Err(e) = session.send(&line) {
            display::warning(&format!("Message not sent: {e}"));
        }
    }

    session.stop();
    let _ = printer.join();
    Ok(())
}
