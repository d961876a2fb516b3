use serde::{Deserialize, Serialize};

use crate::field::field_model::FieldDescriptor;

pub const SYSTEM_PROMPT: &str = "You generate JSON to fill web forms for QA. Return only a JSON object. Use concise realistic test data.";

pub const FILL_INSTRUCTION: &str = "Given the fields, return a JSON object mapping best field keys to values. Use keys from candidates when possible. Use Chinese for string values. Return JSON only.";

/// Endpoint and credentials of an OpenAI-compatible chat completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// User message body: instruction plus the descriptors as plain data.
#[derive(Debug, Serialize)]
pub struct FillPrompt<'a> {
    pub instruction: &'static str,
    pub fields: &'a [FieldDescriptor],
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}
