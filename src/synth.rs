//! `synth` command - CloudFormation template generator

use anyhow::{bail, Context, Result};
use backup_plan_config::PlanConfig;
use backup_plan_synth::{SynthOptions, TemplateSynthesizer};
use clap::Args;
use dialoguer::Confirm;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Template output path (overrides stack.template_path)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite existing file without asking
    #[arg(long)]
    pub force: bool,
}

pub async fn run(config: &PlanConfig, args: SynthArgs) -> Result<()> {
    let options = SynthOptions {
        description: Some(
            config
                .stack
                .description
                .clone()
                .unwrap_or_else(|| format!("AWS Backup plan {}", config.plan.name)),
        ),
        vault_name: config.stack.vault_name.clone(),
        tags: config.stack.tags.clone(),
        allow_restores: config.stack.allow_restores,
    };

    let template = TemplateSynthesizer::synthesize(options, &config.plan)
        .await
        .context("Failed to synthesize backup plan")?;
    let content = template.render_pretty()?;

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.stack.template_path));

    // Check if file exists
    if output_path.exists() && !args.force {
        if !std::io::stdin().is_terminal() {
            bail!(
                "{} already exists. Pass --force to overwrite.",
                output_path.display()
            );
        }
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", output_path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(&output_path, &content)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!(
        path = %output_path.display(),
        resources = template.resources.len(),
        "Wrote CloudFormation template"
    );

    println!();
    println!("Created {}", output_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Deploy:");
    println!("     aws cloudformation deploy \\");
    println!("       --template-file {} \\", output_path.display());
    println!("       --stack-name {} \\", config.stack.name);
    println!("       --capabilities CAPABILITY_IAM");
    println!("  2. Read the outputs:");
    println!("     aws cloudformation describe-stacks \\");
    println!("       --stack-name {} \\", config.stack.name);
    println!("       --query 'Stacks[0].Outputs'");
    println!();

    Ok(())
}
