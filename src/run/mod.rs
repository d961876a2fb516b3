pub mod orchestrator;
pub mod plan;
pub mod progress;
pub mod report;

pub use orchestrator::{Orchestrator, RunOutcome, new_request_id};
pub use plan::{FillMode, FillPlan, parse_record};
pub use progress::{LogProgress, ProgressEvent, ProgressSink, RecordingProgress, format_duration};
pub use report::{RunReport, match_rate};
