use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::trace::trace::TraceEvent;

/// Per-run JSONL trace: one line per field attempt plus one per run.
///
/// A trace file that cannot be opened disables tracing for the run instead
/// of failing it; write errors are only logged.
pub struct TraceLogger {
    path: PathBuf,
    sink: Option<Mutex<File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let sink = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                debug!(path = %path.display(), "Tracing fill runs");
                Some(Mutex::new(file))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Trace file unavailable; tracing disabled");
                None
            }
        };
        Self { path, sink }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(kind = ?event.kind, error = %e, "Unserializable trace event dropped");
                return;
            }
        };

        let Ok(mut file) = sink.lock() else {
            warn!(path = %self.path.display(), "Trace file lock poisoned; event dropped");
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            warn!(path = %self.path.display(), error = %e, "Trace write failed");
        }
    }
}
