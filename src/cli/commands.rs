use std::error::Error;

use tracing::{info, warn};

use crate::apply::Applicator;
use crate::browser::session::BrowserSession;
use crate::cli::config::{
    AppConfig, DEFAULT_CONFIG_PATH, FillArgs, PageSource, resolve_mode, save_config, select_plan,
};
use crate::dom::document::Document;
use crate::dom::page::Page;
use crate::dom::snapshot::parse_snapshot;
use crate::field::discover::discover;
use crate::field::field_model::FieldDescriptor;
use crate::run::orchestrator::{Orchestrator, RunOutcome};
use crate::run::plan::FillMode;
use crate::run::progress::LogProgress;
use crate::run::report::RunReport;
use crate::service::client::{ChatCompletionService, ValueService, check_connection};
use crate::service::service_model::ServiceConfig;
use crate::trace::TraceLogger;

// ============================================================================
// Page targets
// ============================================================================

/// A page to work on: an offline snapshot or a live browser session.
pub enum Target {
    Snapshot(Document),
    Live(BrowserSession),
}

impl Target {
    pub fn open(source: &PageSource, config: &AppConfig) -> Result<Self, Box<dyn Error>> {
        match (&source.url, &source.snapshot) {
            (_, Some(path)) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read snapshot '{}': {}", path, e))?;
                let nodes = parse_snapshot(&json)
                    .map_err(|e| format!("Invalid snapshot '{}': {}", path, e))?;
                Ok(Target::Snapshot(Document::from_snapshot(&nodes)))
            }
            (Some(url), None) => {
                let mut session = BrowserSession::launch(&config.browser.server_script)?;
                session.navigate(url)?;
                Ok(Target::Live(session))
            }
            (None, None) => Err("either --url or --snapshot is required".into()),
        }
    }

    pub fn page(&self) -> &dyn Page {
        match self {
            Target::Snapshot(doc) => doc as &dyn Page,
            Target::Live(session) => session,
        }
    }

    pub fn page_mut(&mut self) -> &mut dyn Page {
        match self {
            Target::Snapshot(doc) => doc as &mut dyn Page,
            Target::Live(session) => session,
        }
    }
}

// ============================================================================
// fill subcommand
// ============================================================================

fn record_json(args: &FillArgs, config: &AppConfig) -> Result<Option<String>, Box<dyn Error>> {
    if let Some(data) = &args.data {
        return Ok(Some(data.clone()));
    }
    if let Some(path) = &args.data_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read record file '{}': {}", path, e))?;
        return Ok(Some(text));
    }
    Ok(config.fill.last_json.clone())
}

/// Fill a page and return the run tallies.
pub fn cmd_fill(
    args: &FillArgs,
    config: &AppConfig,
    service_config: &ServiceConfig,
    config_path: Option<&str>,
) -> Result<RunReport, Box<dyn Error>> {
    let mode = resolve_mode(args.mode.as_deref(), config);
    let record = record_json(args, config)?;

    // Configuration and record problems surface before the page is opened
    let service = match mode {
        FillMode::Service => Some(ChatCompletionService::from_config(service_config)?),
        _ => None,
    };
    let plan = select_plan(
        mode,
        record.as_deref(),
        service.as_ref().map(|s| s as &dyn ValueService),
    )?;

    if args.save {
        let mut updated = config.clone();
        updated.fill.last_mode = Some(mode.as_str().to_string());
        if mode == FillMode::Record {
            updated.fill.last_json = record.clone();
        }
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        match save_config(path, &updated) {
            Ok(()) => info!(path, "Saved fill settings"),
            Err(e) => warn!(path, error = %e, "Could not save fill settings"),
        }
    }

    let mut target = Target::open(&args.source, config)?;

    let mut orchestrator =
        Orchestrator::new(Applicator::new(config.wait.policy())).with_progress(LogProgress);
    if let Some(path) = &args.trace {
        orchestrator = orchestrator.with_tracer(TraceLogger::new(path));
    }

    let report = match orchestrator.run(target.page_mut(), plan)? {
        RunOutcome::Completed(report) => report,
        RunOutcome::Busy => return Err("a fill is already in progress".into()),
    };
    println!("{}", report.summary());

    if let Some(output) = &args.output {
        match &target {
            Target::Snapshot(doc) => {
                let json = serde_json::to_string_pretty(&doc.to_snapshot())?;
                std::fs::write(output, json)?;
                info!(path = %output, "Wrote filled snapshot");
            }
            Target::Live(_) => warn!("--output only applies to snapshot sources; ignoring"),
        }
    }

    Ok(report)
}

// ============================================================================
// fields subcommand
// ============================================================================

/// Print the descriptors of every discoverable field as JSON.
pub fn cmd_fields(source: &PageSource, config: &AppConfig) -> Result<Vec<FieldDescriptor>, Box<dyn Error>> {
    let target = Target::open(source, config)?;
    let descriptors: Vec<FieldDescriptor> = discover(target.page())
        .into_iter()
        .map(|f| f.descriptor)
        .collect();

    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(descriptors)
}

// ============================================================================
// check-service subcommand
// ============================================================================

pub fn cmd_check_service(service_config: &ServiceConfig) -> Result<(), Box<dyn Error>> {
    check_connection(service_config)?;
    println!("Connection OK.");
    Ok(())
}
