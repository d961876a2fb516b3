use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::info;

/// Receives status updates keyed by the run's correlation id. `ongoing`
/// is false for the terminal update of a run.
pub trait ProgressSink {
    fn report(&self, request_id: &str, text: &str, ongoing: bool);
}

impl<T: ProgressSink + ?Sized> ProgressSink for Rc<T> {
    fn report(&self, request_id: &str, text: &str, ongoing: bool) {
        (**self).report(request_id, text, ongoing)
    }
}

/// Progress through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, request_id: &str, text: &str, ongoing: bool) {
        info!(request_id, ongoing, "{}", text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub request_id: String,
    pub text: String,
    pub ongoing: bool,
}

/// Keeps every update in memory.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: RefCell<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.text.clone()).collect()
    }

    pub fn last(&self) -> Option<ProgressEvent> {
        self.events.borrow().last().cloned()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, request_id: &str, text: &str, ongoing: bool) {
        self.events.borrow_mut().push(ProgressEvent {
            request_id: request_id.to_string(),
            text: text.to_string(),
            ongoing,
        });
    }
}

/// `850ms`, `1.2s`.
pub fn format_duration(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
