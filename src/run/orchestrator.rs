use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use sha1::{Digest, Sha1};
use tracing::{debug, info, warn};

use crate::apply::Applicator;
use crate::dom::page::Page;
use crate::error::FillError;
use crate::field::discover::discover;
use crate::field::field_model::FieldDescriptor;
use crate::resolve::{Resolution, resolve};
use crate::run::plan::FillPlan;
use crate::run::progress::{LogProgress, ProgressSink, format_duration};
use crate::run::report::RunReport;
use crate::trace::{TraceEvent, TraceLogger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Another run on the same orchestrator was still in progress.
    Busy,
}

/// Correlation id `<millis>-<8 hex>`.
pub fn new_request_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha1::new();
    hasher.update(millis.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(seq.to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());

    format!("{}-{}", millis, &digest[..8])
}

/// Clears the run flag when the run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives discover → resolve → apply over one page, at most one run at a time.
pub struct Orchestrator {
    applicator: Applicator,
    progress: Box<dyn ProgressSink>,
    tracer: Option<TraceLogger>,
    running: AtomicBool,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Applicator::default())
    }
}

impl Orchestrator {
    pub fn new(applicator: Applicator) -> Self {
        Self {
            applicator,
            progress: Box::new(LogProgress),
            tracer: None,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Fill every discoverable field of `page` from `plan`.
    ///
    /// Only service and configuration failures abort; per-field trouble
    /// shows up in the report tallies.
    pub fn run(&self, page: &mut dyn Page, plan: FillPlan<'_>) -> Result<RunOutcome, FillError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("Fill already in progress; rejecting overlapping run");
            return Ok(RunOutcome::Busy);
        };

        let request_id = new_request_id();
        info!(request_id = %request_id, mode = plan.mode().as_str(), "Fill run started");

        match self.execute(&request_id, page, plan) {
            Ok(report) => {
                info!(
                    request_id = %request_id,
                    discovered = report.discovered,
                    matched = report.matched,
                    filled = report.filled,
                    "Fill run completed"
                );
                self.progress.report(&request_id, &report.summary(), false);
                self.trace(TraceEvent::run(&request_id).with_report(&report));
                Ok(RunOutcome::Completed(report))
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Fill run failed");
                self.progress
                    .report(&request_id, &format!("Failed: {}", e), false);
                self.trace(TraceEvent::run(&request_id).with_error(&e));
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        request_id: &str,
        page: &mut dyn Page,
        plan: FillPlan<'_>,
    ) -> Result<RunReport, FillError> {
        self.progress.report(request_id, "Collecting fields...", true);
        let fields = discover(page);
        let total = fields.len();
        self.progress
            .report(request_id, &format!("Found {} fields.", total), false);

        let record = match plan {
            FillPlan::Heuristic => None,
            FillPlan::Record(record) => Some(record),
            FillPlan::Service(service) => {
                self.progress
                    .report(request_id, "Calling value service...", true);
                let descriptors: Vec<FieldDescriptor> =
                    fields.iter().map(|f| f.descriptor.clone()).collect();

                let started = Instant::now();
                let record = service.generate(&descriptors)?;
                self.progress.report(
                    request_id,
                    &format!(
                        "Service responded in {}. Filling...",
                        format_duration(started.elapsed())
                    ),
                    false,
                );
                Some(record)
            }
        };

        let mode = match &record {
            Some(record) => Resolution::Record(record),
            None => Resolution::Heuristic,
        };

        let mut matched = 0;
        let mut filled = 0;

        for (i, field) in fields.iter().enumerate() {
            let index = i + 1;
            let value = resolve(&field.descriptor, mode);

            let is_match = !value.is_undefined();
            let mut applied = false;
            if is_match {
                matched += 1;
                applied = self
                    .applicator
                    .apply(page, field.handle, &field.descriptor, &value);
                if applied {
                    filled += 1;
                }
            }

            debug!(
                request_id,
                index,
                widget = field.descriptor.widget_type(),
                matched = is_match,
                applied,
                "Field processed"
            );
            self.trace(
                TraceEvent::field(request_id, index, &field.descriptor).with_outcome(is_match, applied),
            );

            if index % 5 == 0 || index == total {
                self.progress
                    .report(request_id, &format!("Filling {}/{}...", index, total), true);
            }
        }

        Ok(RunReport::new(total, matched, filled))
    }

    fn trace(&self, event: TraceEvent) {
        if let Some(tracer) = &self.tracer {
            tracer.log(&event);
        }
    }
}
