//! Banter Bot
//!
//! An automated peer for the banter chat relay: joins like any other
//! client, follows the room, and asks a chat-completions API what to
//! say. Two cadences: reply after every N lines, or send an unprompted
//! opener every N seconds.

mod bot;
mod history;
mod responder;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;

use banter_core::client::{
    ChatSession, SessionEvent, SessionState, TcpTransport, TransportConfig,
};
use banter_core::names::random_display_name;
use banter_core::protocol::is_valid_sender;

use bot::{BotEngine, Mode};
use responder::{OpenAiResponder, DEFAULT_API_URL, DEFAULT_MODEL};

#[derive(Parser)]
#[command(name = "banter-bot")]
#[command(version, about = "Automated AI peer for the banter chat relay")]
struct Cli {
    /// Relay address as host:port
    #[arg(short, long, env = "BANTER_SERVER", default_value = "127.0.0.1:8000")]
    server: String,

    /// Display name shown to the room (default: a random AI-xxxxx)
    #[arg(short, long, env = "BANTER_NAME")]
    name: Option<String>,

    /// Connect attempts, initial and per reconnect, before giving up
    #[arg(long, default_value_t = 5)]
    max_retries: u32,

    /// Base backoff delay between attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,

    /// When the bot speaks
    #[arg(long, value_enum, default_value_t = Mode::Lines)]
    mode: Mode,

    /// Lines between replies (lines mode) or seconds between openers
    /// (interval mode)
    #[arg(long, default_value_t = 5)]
    every: u32,

    /// Chat-completions endpoint
    #[arg(long, env = "BANTER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Model to request
    #[arg(long, env = "BANTER_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API key for the completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let name = cli.name.clone().unwrap_or_else(|| random_display_name("AI"));
    if !is_valid_sender(&name) {
        anyhow::bail!(
            "invalid display name {name:?}: at most 64 bytes, no control characters, \
             no leading or trailing whitespace, no \": \""
        );
    }

    let engine = BotEngine::new(
        OpenAiResponder::new(
            cli.api_url.clone(),
            cli.api_key.clone(),
            cli.model.clone(),
            name.clone(),
        ),
        name.clone(),
        cli.every,
    );

    let config = TransportConfig {
        max_retries: cli.max_retries,
        retry_base_delay_ms: cli.retry_delay_ms,
        ..TransportConfig::for_addr(&cli.server)
    };

    status(&format!(
        "Joining {} as {} ({:?} mode, every {})",
        cli.server, name, cli.mode, cli.every
    ));
    let (session, events) = ChatSession::start(TcpTransport::new(), config, name);

    match cli.mode {
        Mode::Lines => run_lines(session, events, engine),
        Mode::Interval => run_interval(session, events, engine, cli.every),
    }
}

/// Lines mode: one loop over session events. Every received broadcast
/// feeds the engine; when the cadence fires, the reply goes straight
/// back out.
fn run_lines(
    session: ChatSession<TcpTransport>,
    events: mpsc::Receiver<SessionEvent>,
    mut engine: BotEngine<OpenAiResponder>,
) -> Result<()> {
    for event in events {
        match event {
            SessionEvent::Connected => status("Connected"),
            SessionEvent::Disconnected { error } => alert(&format!("Disconnected: {error}")),
            SessionEvent::Reconnecting { attempt, delay } => status(&format!(
                "Reconnecting (attempt {}) in {:?}",
                attempt + 1,
                delay
            )),
            SessionEvent::Message(message) => {
                println!("{message}");
                if let Some(reply) = engine.on_message(&message) {
                    println!("{}: {}", session.display_name(), reply);
                    if let Err(e) = session.send(&reply) {
                        alert(&format!("Reply not sent: {e}"));
                    }
                }
            }
            SessionEvent::Terminated { reason } => {
                if let Some(reason) = reason {
                    anyhow::bail!("session ended: {reason}");
                }
                break;
            }
        }
    }
    Ok(())
}

/// Interval mode: session events print on a worker thread while this
/// one wakes every `every` seconds to send an opener. Openers ignore
/// the conversation, so the engine never needs the received lines.
fn run_interval(
    session: ChatSession<TcpTransport>,
    events: mpsc::Receiver<SessionEvent>,
    mut engine: BotEngine<OpenAiResponder>,
    every: u32,
) -> Result<()> {
    let printer = thread::spawn(move || {
        let mut failure = None;
        for event in events {
            match event {
                SessionEvent::Connected => status("Connected"),
                SessionEvent::Disconnected { error } => alert(&format!("Disconnected: {error}")),
                SessionEvent::Reconnecting { attempt, delay } => status(&format!(
                    "Reconnecting (attempt {}) in {:?}",
                    attempt + 1,
                    delay
                )),
                SessionEvent::Message(message) => println!("{message}"),
                SessionEvent::Terminated { reason } => {
                    failure = reason;
                    break;
                }
            }
        }
        failure
    });

    let pause = Duration::from_secs(u64::from(every.max(1)));
    while session.state() != SessionState::Terminated {
        thread::sleep(pause);
        if session.state() == SessionState::Terminated {
            break;
        }
        let opener = engine.opener();
        println!("{}: {}", session.display_name(), opener);
        if let Err(e) = session.send(&opener) {
            alert(&format!("Opener not sent: {e}"));
        }
    }

    match printer.join() {
        Ok(Some(reason)) => anyhow::bail!("session ended: {reason}"),
        _ => Ok(()),
    }
}

fn status(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

fn alert(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}
