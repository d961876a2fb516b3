use serde_json::{Map, Value};

use crate::error::FillError;
use crate::service::client::ValueService;

/// Persisted mode name, as stored in config and accepted on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Heuristic,
    Service,
    Record,
}

impl FillMode {
    /// Unknown or empty names fall back to heuristic.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "service" | "llm" => FillMode::Service,
            "record" | "json" => FillMode::Record,
            _ => FillMode::Heuristic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::Heuristic => "heuristic",
            FillMode::Service => "service",
            FillMode::Record => "record",
        }
    }
}

/// Where the values of one run come from.
pub enum FillPlan<'a> {
    Heuristic,
    Service(&'a dyn ValueService),
    Record(Map<String, Value>),
}

impl FillPlan<'_> {
    pub fn mode(&self) -> FillMode {
        match self {
            FillPlan::Heuristic => FillMode::Heuristic,
            FillPlan::Service(_) => FillMode::Service,
            FillPlan::Record(_) => FillMode::Record,
        }
    }
}

/// Parse a user-supplied record. Only a JSON object is accepted.
pub fn parse_record(text: Option<&str>) -> Result<Map<String, Value>, FillError> {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FillError::RecordParse("provide JSON or switch mode".into()))?;

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Err(FillError::RecordParse("JSON must be an object, not null".into())),
        Ok(Value::Array(_)) => Err(FillError::RecordParse("JSON must be an object, not an array".into())),
        Ok(_) => Err(FillError::RecordParse("JSON must be an object".into())),
        Err(e) => Err(FillError::RecordParse(e.to_string())),
    }
}
