use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::field::field_model::{FieldDescriptor, Framework};
use crate::run::report::RunReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Field,
    Run,
}

/// One JSONL line of a fill trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub request_id: String,
    pub kind: TraceKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

impl TraceEvent {
    fn base(request_id: &str, kind: TraceKind) -> Self {
        Self {
            timestamp_ms: now_ms(),
            request_id: request_id.to_string(),
            kind,
            index: None,
            widget: None,
            framework: None,
            candidates: vec![],
            matched: None,
            applied: None,
            report: None,
            error: None,
        }
    }

    /// Field event; `index` is 1-based like the progress counter.
    pub fn field(request_id: &str, index: usize, descriptor: &FieldDescriptor) -> Self {
        let mut event = Self::base(request_id, TraceKind::Field);
        event.index = Some(index);
        event.widget = Some(descriptor.widget_type().to_string());
        event.framework = Some(descriptor.framework());
        event.candidates = descriptor.candidates().to_vec();
        event
    }

    pub fn run(request_id: &str) -> Self {
        Self::base(request_id, TraceKind::Run)
    }

    pub fn with_outcome(mut self, matched: bool, applied: bool) -> Self {
        self.matched = Some(matched);
        self.applied = Some(applied);
        self
    }

    pub fn with_report(mut self, report: &RunReport) -> Self {
        self.report = Some(*report);
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
