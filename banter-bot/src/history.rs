//! Conversation History
//!
//! The bot's memory of the room: every broadcast it has seen plus its
//! own replies, oldest first, with the token accounting used to keep
//! API requests inside the model's input window.

/// Per-message envelope cost in the chat-completions token accounting.
const TURN_OVERHEAD_TOKENS: u32 = 4;

/// Every reply is primed with an assistant header.
const REPLY_PRIMER_TOKENS: u32 = 2;

/// One line of conversation: who said it and what they said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub sender: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }

    /// Approximate prompt tokens this turn costs to send.
    pub fn estimated_tokens(&self) -> u32 {
        TURN_OVERHEAD_TOKENS + approx_tokens(&self.sender) + approx_tokens(&self.content)
    }
}

/// Rough token count for a piece of text, at roughly four bytes per
/// token.
pub fn approx_tokens(text: &str) -> u32 {
    (text.len() as u32).div_ceil(4)
}

/// Everything said in the room since the bot joined, oldest first.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<ChatTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Newest suffix of `turns` that fits `max_tokens` alongside the system
/// prompt and the reply primer. Walks an offset forward from the oldest
/// turn, dropping one at a time until the estimate fits; if nothing
/// fits, the window is empty.
pub fn budget_window<'a>(
    turns: &'a [ChatTurn],
    system_prompt: &str,
    max_tokens: u32,
) -> &'a [ChatTurn] {
    let fixed = TURN_OVERHEAD_TOKENS + approx_tokens(system_prompt) + REPLY_PRIMER_TOKENS;
    let mut total = fixed + turns.iter().map(ChatTurn::estimated_tokens).sum::<u32>();
    let mut start = 0;
    while start < turns.len() && total > max_tokens {
        total -= turns[start].estimated_tokens();
        start += 1;
    }
    &turns[start..]
}
