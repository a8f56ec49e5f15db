use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::debug;
use verdict_logging::{init_logging_from_config, init_simple_tracing};

mod cli;
mod commands;
mod report;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{
    handle_config_sample, handle_config_show, handle_config_validate, load_config,
};
use commands::run::handle_run;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Run(args) => {
            let config = load_config(cli.config.as_ref())?;
            match &cli.log_level {
                Some(level) => init_simple_tracing(level)?,
                None => init_logging_from_config(&config.logging)?,
            }
            debug!("Configuration loaded");
            handle_run(config, args).await
        }
        // Config subcommands only report problems
        Commands::Config { config_cmd } => {
            init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
            match config_cmd {
                ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
                ConfigCommands::Sample { output, force } => {
                    handle_config_sample(output.as_deref(), *force)
                }
                ConfigCommands::Show { format } => {
                    handle_config_show(cli.config.as_ref(), format)
                }
            }
        }
    }
}
