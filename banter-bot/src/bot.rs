//! Bot Engine
//!
//! Cadence and conversation tracking for the automated peer: counts the
//! room's lines, remembers everything said, and decides when to speak.

use clap::ValueEnum;

use banter_core::protocol::Message;

use crate::history::{ChatTurn, ConversationLog};
use crate::responder::Responder;

/// System prompt when replying within an ongoing conversation.
pub const RESPOND_PROMPT: &str =
    "You are a joyful chat participant. respond in the context of the conversation.";

/// System prompt when opening a conversation unprompted.
pub const OPENER_PROMPT: &str =
    "You are a joyful chat participant. Initiate a conversation with a random sentence.";

/// Sent to the room when the responder fails, so the bot stays audible
/// instead of silently skipping its turn.
pub const FALLBACK_REPLY: &str = "I had something to say but encountered a technical issue.";

/// When the bot speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Reply after every N received lines.
    Lines,
    /// Send an opener every N seconds, ignoring the conversation.
    Interval,
}

/// Drives one bot: counts incoming lines, keeps the conversation log,
/// and produces the lines to send.
pub struct BotEngine<R> {
    responder: R,
    log: ConversationLog,
    display_name: String,
    every: u32,
    lines_seen: u32,
}

impl<R: Responder> BotEngine<R> {
    pub fn new(responder: R, display_name: String, every: u32) -> Self {
        Self {
            responder,
            log: ConversationLog::new(),
            display_name,
            every: every.max(1),
            lines_seen: 0,
        }
    }

    /// Records one received broadcast. On the lines cadence, returns the
    /// reply to send once `every` lines have arrived since the last one.
    pub fn on_message(&mut self, message: &Message) -> Option<String> {
        self.log
            .push(ChatTurn::new(message.sender.clone(), message.content.clone()));
        self.lines_seen += 1;
        if self.lines_seen < self.every {
            return None;
        }
        self.lines_seen = 0;
        Some(self.generate(RESPOND_PROMPT, false))
    }

    /// Produces an unprompted conversation opener.
    pub fn opener(&mut self) -> String {
        self.generate(OPENER_PROMPT, true)
    }

    /// Everything the engine has seen or said, oldest first.
    pub fn conversation(&self) -> &[ChatTurn] {
        self.log.turns()
    }

    fn generate(&mut self, prompt: &str, fresh: bool) -> String {
        let result = if fresh {
            self.responder.reply(&[], prompt)
        } else {
            self.responder.reply(self.log.turns(), prompt)
        };
        let reply = result.unwrap_or_else(|e| {
            eprintln!("responder error: {e}");
            FALLBACK_REPLY.to_string()
        });
        self.log
            .push(ChatTurn::new(self.display_name.clone(), reply.clone()));
        reply
    }
}
