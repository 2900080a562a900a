//! `validate` command

use anyhow::{Context, Result};
use backup_plan_config::PlanConfig;
use tracing::info;

pub fn run(config: &PlanConfig) -> Result<()> {
    let descriptor = backup_plan_core::build(&config.plan)?;
    info!(plan = %descriptor.plan_name, "Backup plan is valid");

    let rendered =
        serde_json::to_string_pretty(&descriptor).context("Failed to render backup policy")?;
    println!("{}", rendered);
    Ok(())
}
