//! transcoder-iac - declarative AWS Elastic Transcoder provisioning
//!
//! This is the main entry point for the transcoder-iac CLI.

mod cli;
mod config;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use config::Config;

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration before logging so its format applies
    let (config, config_error) = match Config::load(cli.config.as_ref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let mut logging = config.logging.clone();
    logging.ansi_colors = logging.ansi_colors && !cli.no_color && config.colors.enabled;
    if let Err(e) = transcoder_iac::telemetry::init_from_verbosity(cli.verbosity(), &logging) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    if cli.verbosity() >= 2 {
        eprintln!("transcoder-iac v{}", VERSION);
    }

    let mut ctx = CommandContext::new(&cli, config);

    if let Some(e) = config_error {
        // An explicitly named config file must load
        if cli.config.is_some() {
            ctx.output.error(&format!("Failed to load config: {:#}", e));
            std::process::exit(5);
        }
        ctx.output
            .warning(&format!("Failed to load config, using defaults: {:#}", e));
    }

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Apply(args) => args.execute(&mut ctx).await?,
        Commands::Plan(args) => args.execute(&mut ctx).await?,
        Commands::Destroy(args) => args.execute(&mut ctx).await?,
        Commands::Validate(args) => args.execute(&mut ctx).await?,
    };

    std::process::exit(exit_code);
}
