//! AI Responder
//!
//! The trait seam the bot generates replies through, and its production
//! implementation against an OpenAI-compatible chat-completions API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::{budget_window, ChatTurn};

/// Chat-completions endpoint used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model requested when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Input window the conversation is trimmed to before each request.
pub const DEFAULT_MAX_INPUT_TOKENS: u32 = 4096;

/// Sampling temperature for replies.
const TEMPERATURE: f64 = 0.7;

/// Cap on generated reply length, in tokens.
const MAX_REPLY_TOKENS: u32 = 100;

/// Failures talking to the completion API.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API response carried no reply")]
    EmptyResponse,
}

/// Anything that can turn a conversation window into a reply.
pub trait Responder {
    /// Generates a reply to `history` under `system_prompt`.
    fn reply(&self, history: &[ChatTurn], system_prompt: &str) -> Result<String, ResponderError>;
}

/// [`Responder`] backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiResponder {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    model: String,
    bot_name: String,
    max_input_tokens: u32,
}

impl OpenAiResponder {
    pub fn new(api_url: String, api_key: String, model: String, bot_name: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_url,
            api_key,
            model,
            bot_name,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        }
    }

    /// Maps a conversation window onto API messages: the system prompt
    /// first, then each turn as `user` or, for the bot's own lines,
    /// `assistant`, with the sender carried in `name`.
    fn build_messages<'a>(&self, window: &'a [ChatTurn], prompt: &'a str) -> Vec<ApiMessage<'a>> {
        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(ApiMessage {
            role: "system",
            content: prompt,
            name: None,
        });
        for turn in window {
            let role = if turn.sender == self.bot_name {
                "assistant"
            } else {
                "user"
            };
            messages.push(ApiMessage {
                role,
                content: &turn.content,
                name: Some(&turn.sender),
            });
        }
        messages
    }
}

impl Responder for OpenAiResponder {
    fn reply(&self, history: &[ChatTurn], system_prompt: &str) -> Result<String, ResponderError> {
        let prompt = normalize_whitespace(system_prompt);
        let window = budget_window(history, &prompt, self.max_input_tokens);
        let request = ChatRequest {
            model: &self.model,
            messages: self.build_messages(window, &prompt),
            temperature: TEMPERATURE,
            max_tokens: MAX_REPLY_TOKENS,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| ResponderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ResponderError::Request(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ResponderError::EmptyResponse)
    }
}

/// Collapses whitespace runs (including newlines) to single spaces, so
/// multi-line prompt literals read as one sentence on the wire.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// INLINE_TEST_REQUIRED: request construction is private to this module.
#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> OpenAiResponder {
        OpenAiResponder::new(
            DEFAULT_API_URL.to_string(),
            "sk-test".to_string(),
            DEFAULT_MODEL.to_string(),
            "AI-tester".to_string(),
        )
    }

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("a  b\n\tc"), "a b c");
        assert_eq!(normalize_whitespace("  lead and trail  "), "lead and trail");
    }

    #[test]
    fn test_messages_open_with_the_system_prompt() {
        let window = vec![ChatTurn::new("alice", "hi")];
        let messages = responder().build_messages(&window, "be joyful");
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "be joyful");
        assert!(messages[0].name.is_none());
    }

    #[test]
    fn test_own_lines_become_assistant_turns() {
        let window = vec![
            ChatTurn::new("alice", "hello"),
            ChatTurn::new("AI-tester", "hello alice"),
        ];
        let messages = responder().build_messages(&window, "p");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].name, Some("alice"));
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].name, Some("AI-tester"));
    }

    #[test]
    fn test_request_body_shape() {
        let r = responder();
        let window = vec![ChatTurn::new("alice", "hi")];
        let request = ChatRequest {
            model: &r.model,
            messages: r.build_messages(&window, "prompt"),
            temperature: TEMPERATURE,
            max_tokens: MAX_REPLY_TOKENS,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 100);
        assert_eq!(body["messages"][0]["role"], "system");
        // The system message carries no name field at all
        assert!(body["messages"][0].get("name").is_none());
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["name"], "alice");
        assert_eq!(body["messages"][1]["content"], "hi");
    }
}
