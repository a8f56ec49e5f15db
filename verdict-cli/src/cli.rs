//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate a load run, score it and print the report
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of sessions, overriding the configuration
    #[arg(long, value_name = "N")]
    pub sessions: Option<usize>,

    /// Maximum concurrent sessions, overriding the configuration
    #[arg(long, value_name = "K")]
    pub concurrency: Option<usize>,

    /// Seed for scenario selection and the synthetic executor
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// YAML or JSON file with findings and measurements to score alongside the run
    #[arg(long, value_name = "PATH")]
    pub observations: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub output: OutputFormat,

    /// Include every session result in json/yaml reports
    #[arg(long)]
    pub include_sessions: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Summary,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Print or write a sample configuration with every default filled in
    Sample {
        /// Output file path; prints to stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}
