pub mod commands;
pub mod config;

pub use commands::{Target, cmd_check_service, cmd_fields, cmd_fill};
pub use config::{
    AppConfig, Cli, Commands, FillArgs, PageSource, load_config, resolve_mode, resolve_service_config,
    save_config, select_plan,
};
