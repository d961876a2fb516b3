use std::cell::{Cell, RefCell};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::FillError;
use crate::field::field_model::FieldDescriptor;
use crate::service::service_model::{
    ChatMessage, ChatRequest, ChatResponse, FILL_INSTRUCTION, FillPrompt, SYSTEM_PROMPT, ServiceConfig,
};

/// External value generator: turns the page's descriptors into a flat
/// key→value record.
pub trait ValueService {
    fn generate(&self, fields: &[FieldDescriptor]) -> Result<Map<String, Value>, FillError>;
}

// ============================================================================
// URL and reply helpers
// ============================================================================

/// Trim and drop one trailing `/`.
pub fn normalize_base_url(input: &str) -> String {
    let trimmed = input.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

fn versioned(base: &str, path: &str) -> String {
    let base = normalize_base_url(base);
    if base.ends_with("/v1") {
        format!("{}/{}", base, path)
    } else {
        format!("{}/v1/{}", base, path)
    }
}

pub fn chat_completions_url(base: &str) -> String {
    versioned(base, "chat/completions")
}

pub fn models_url(base: &str) -> String {
    versioned(base, "models")
}

/// Parse the outermost `{…}` span of free-form model output.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Turn the assistant's reply text into a record; anything but a JSON
/// object is malformed.
pub fn parse_reply(content: &str) -> Result<Map<String, Value>, FillError> {
    match extract_json_object(content) {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(FillError::MalformedResponse(preview(content, 160))),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Chat completion backend
// ============================================================================

/// OpenAI-compatible chat completion client (blocking).
pub struct ChatCompletionService {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl ChatCompletionService {
    /// Validate the configuration without touching the network.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, FillError> {
        let base_url = required(&config.base_url).map(|b| normalize_base_url(&b));
        let model = required(&config.model);
        let api_key = required(&config.api_key);

        let (Some(base_url), Some(model), Some(api_key)) = (base_url, model, api_key) else {
            return Err(FillError::Configuration(
                "set base URL, model, and API key".into(),
            ));
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FillError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            model,
            api_key,
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        chat_completions_url(&self.base_url)
    }

    pub fn build_request(&self, fields: &[FieldDescriptor]) -> Result<ChatRequest, FillError> {
        let prompt = FillPrompt {
            instruction: FILL_INSTRUCTION,
            fields,
        };
        let user = serde_json::to_string(&prompt)
            .map_err(|e| FillError::MalformedResponse(format!("could not encode fields: {}", e)))?;

        Ok(ChatRequest {
            model: self.model.clone(),
            temperature: 0.2,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user,
                },
            ],
        })
    }
}

impl ValueService for ChatCompletionService {
    fn generate(&self, fields: &[FieldDescriptor]) -> Result<Map<String, Value>, FillError> {
        let request = self.build_request(fields)?;
        let url = self.endpoint();
        info!(url = %url, model = %self.model, fields = fields.len(), "Requesting field values");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| FillError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "Value service returned an error");
            return Err(FillError::Transport(format!(
                "{} {}",
                status.as_u16(),
                preview(&body, 160)
            )));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| FillError::MalformedResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        debug!(chars = content.len(), "Value service replied");

        parse_reply(&content)
    }
}

/// Call `<base>/v1/models` with the configured key.
pub fn check_connection(config: &ServiceConfig) -> Result<(), FillError> {
    let base_url = required(&config.base_url);
    let api_key = required(&config.api_key);
    let (Some(base_url), Some(api_key)) = (base_url, api_key) else {
        return Err(FillError::Configuration("set base URL and API key".into()));
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| FillError::Transport(e.to_string()))?;

    let response = client
        .get(models_url(&base_url))
        .bearer_auth(api_key)
        .send()
        .map_err(|e| FillError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().unwrap_or_default();
        Err(FillError::Transport(format!(
            "{} {}",
            status.as_u16(),
            preview(&body, 120)
        )))
    }
}

// ============================================================================
// Mock backend (for testing without a service)
// ============================================================================

/// Canned service: replies with fixed assistant text, or fails with a
/// transport error. Records what it was asked.
pub struct MockValueService {
    reply: Result<String, String>,
    calls: Cell<usize>,
    last_fields: RefCell<Vec<FieldDescriptor>>,
}

impl MockValueService {
    pub fn reply(content: &str) -> Self {
        Self {
            reply: Ok(content.to_string()),
            calls: Cell::new(0),
            last_fields: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Cell::new(0),
            last_fields: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_fields(&self) -> Vec<FieldDescriptor> {
        self.last_fields.borrow().clone()
    }
}

impl ValueService for MockValueService {
    fn generate(&self, fields: &[FieldDescriptor]) -> Result<Map<String, Value>, FillError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_fields.borrow_mut() = fields.to_vec();
        match &self.reply {
            Ok(content) => parse_reply(content),
            Err(message) => Err(FillError::Transport(message.clone())),
        }
    }
}
