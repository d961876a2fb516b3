pub mod client;
pub mod service_model;

pub use client::{
    ChatCompletionService, MockValueService, ValueService, chat_completions_url, check_connection,
    extract_json_object, models_url, normalize_base_url, parse_reply,
};
pub use service_model::ServiceConfig;
