use std::path::Path;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::apply::WaitPolicy;
use crate::error::FillError;
use crate::run::plan::{FillMode, FillPlan, parse_record};
use crate::service::client::ValueService;
use crate::service::service_model::ServiceConfig;

pub const DEFAULT_CONFIG_PATH: &str = "form-autofill.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Fill web forms with heuristic, record or service-generated test data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Value service base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Value service model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Value service API key
    #[arg(long, global = true)]
    pub api_key: Option<String>,
}

/// Where the page comes from: a live URL or a JSON snapshot file.
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct PageSource {
    /// URL to open in the browser session
    #[arg(long)]
    pub url: Option<String>,

    /// Path to a JSON page snapshot
    #[arg(long)]
    pub snapshot: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FillArgs {
    #[command(flatten)]
    pub source: PageSource,

    /// Fill mode: heuristic (auto), service (llm), record (json)
    #[arg(long)]
    pub mode: Option<String>,

    /// Record JSON for record mode
    #[arg(long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// File holding the record JSON
    #[arg(long)]
    pub data_file: Option<String>,

    /// Write the filled snapshot here (snapshot sources only)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Append a JSONL run trace to this file
    #[arg(long)]
    pub trace: Option<String>,

    /// Remember mode and record JSON in the config file
    #[arg(long)]
    pub save: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill every discoverable field of a page
    Fill(FillArgs),

    /// Print the descriptors of the fields a page exposes
    Fields {
        #[command(flatten)]
        source: PageSource,
    },

    /// Check the value service with the configured credentials
    CheckService,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub wait: WaitConfig,
}

/// Last used mode and record, persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FillConfig {
    #[serde(default)]
    pub last_mode: Option<String>,
    #[serde(default)]
    pub last_json: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl WaitConfig {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy::from_millis(self.timeout_ms, self.poll_ms)
    }
}

// Serde default helpers
fn default_server_script() -> String { "node/browser_server.js".to_string() }
fn default_timeout_ms() -> u64 { 1000 }
fn default_poll_ms() -> u64 { 50 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = config_path, error = %e, "Malformed config file; using defaults");
                AppConfig::default()
            }
        },
        Err(_) => {
            debug!(path = config_path, "No config file; using defaults");
            AppConfig::default()
        }
    }
}

/// Write the config back as YAML.
pub fn save_config(path: impl AsRef<Path>, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Service settings: CLI flag > config file.
pub fn resolve_service_config(
    base_url: Option<&str>,
    model: Option<&str>,
    api_key: Option<&str>,
    config: &AppConfig,
) -> ServiceConfig {
    let pick = |cli: Option<&str>, file: &Option<String>| cli.map(str::to_string).or_else(|| file.clone());
    ServiceConfig {
        base_url: pick(base_url, &config.service.base_url),
        model: pick(model, &config.service.model),
        api_key: pick(api_key, &config.service.api_key),
        timeout_secs: config.service.timeout_secs,
    }
}

/// Mode: CLI flag > remembered mode > heuristic.
pub fn resolve_mode(cli_mode: Option<&str>, config: &AppConfig) -> FillMode {
    cli_mode
        .or(config.fill.last_mode.as_deref())
        .map(FillMode::parse)
        .unwrap_or_default()
}

/// Turn a mode plus its inputs into a plan. Record JSON is validated here,
/// so a bad record fails before the page is touched.
pub fn select_plan<'a>(
    mode: FillMode,
    record_json: Option<&str>,
    service: Option<&'a dyn ValueService>,
) -> Result<FillPlan<'a>, FillError> {
    match mode {
        FillMode::Heuristic => Ok(FillPlan::Heuristic),
        FillMode::Record => parse_record(record_json).map(FillPlan::Record),
        FillMode::Service => service
            .map(FillPlan::Service)
            .ok_or_else(|| FillError::Configuration("no value service configured".into())),
    }
}
