use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonValue>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, context: JsonValue) -> Self {
        Self { role: "user".to_string(), content: content.into(), context: Some(context) }
    }

    pub fn assistant(content: impl Into<String>, context: JsonValue) -> Self {
        Self { role: "assistant".to_string(), content: content.into(), context: Some(context) }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
}

fn default_max_tokens() -> Option<u32> {
    Some(1000)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub usage: Usage,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl Usage {
    /// Naive word-count estimate, not a real tokenizer.
    pub fn estimate(messages: &[ChatMessage], reply: &str) -> Self {
        let prompt_tokens: usize = messages
            .iter()
            .map(|m| word_count(&m.content))
            .sum();
        let completion_tokens = word_count(reply) + 100;
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
