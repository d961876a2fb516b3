use clap::Parser;
use form_autofill::cli::commands::{cmd_check_service, cmd_fields, cmd_fill};
use form_autofill::cli::config::{Cli, Commands, load_config, resolve_service_config};
use form_autofill::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    // Resolve service settings: CLI > config > defaults
    let service_config = resolve_service_config(
        cli.base_url.as_deref(),
        cli.model.as_deref(),
        cli.api_key.as_deref(),
        &config,
    );

    match &cli.command {
        Commands::Fill(args) => {
            cmd_fill(args, &config, &service_config, cli.config.as_deref())?;
        }
        Commands::Fields { source } => {
            cmd_fields(source, &config)?;
        }
        Commands::CheckService => {
            cmd_check_service(&service_config)?;
        }
    }

    Ok(())
}
