use anyhow::{Context, Result};
use backup_plan::{apply_plan_overrides, init_tracing, synth, validate, PlanOverrides};
use backup_plan_config::PlanConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Synthesize AWS Backup plans as CloudFormation templates
#[derive(Parser)]
#[command(name = "backup-plan")]
#[command(version)]
#[command(about = "Synthesize scheduled AWS Backup plans as CloudFormation templates", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    overrides: PlanOverrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a CloudFormation template for the backup plan
    Synth(synth::SynthArgs),
    /// Validate the backup plan and print the resolved policy as JSON
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration
    let mut config = match &cli.config {
        Some(path) => PlanConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PlanConfig::load().context("Failed to load configuration")?,
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_plan_overrides(&mut config, &cli.overrides);
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging);

    match cli.command {
        Command::Synth(args) => tokio::runtime::Builder::new_current_thread()
            .build()
            .context("Failed to build tokio runtime")?
            .block_on(synth::run(&config, args)),
        Command::Validate => validate::run(&config),
    }
}
