// Configuration validation
//
// Checks the stack and logging sections. Plan parameters are left to the
// policy builder so there is exactly one place that enforces them.

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

/// CloudFormation limit on stack name length
const MAX_STACK_NAME_LEN: usize = 128;

/// AWS Backup limit on vault name length
const VAULT_NAME_LEN: std::ops::RangeInclusive<usize> = 2..=50;

pub fn validate_config(config: &PlanConfig) -> Result<()> {
    validate_stack_config(&config.stack)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_stack_config(config: &StackConfig) -> Result<()> {
    if config.name.is_empty() {
        bail!("stack.name must not be empty");
    }

    if config.name.len() > MAX_STACK_NAME_LEN {
        bail!("stack.name must be at most {} characters", MAX_STACK_NAME_LEN);
    }

    let mut chars = config.name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') {
        bail!(
            "stack.name '{}' must start with a letter and contain only letters, digits and hyphens",
            config.name
        );
    }

    if config.template_path.is_empty() {
        bail!("stack.template_path must not be empty");
    }

    if let Some(vault) = &config.vault_name {
        if vault.is_empty() {
            bail!("stack.vault_name must not be empty when set");
        }
        let valid_chars = vault
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !VAULT_NAME_LEN.contains(&vault.len()) || !valid_chars {
            bail!(
                "stack.vault_name '{}' must be 2-50 characters of letters, digits, hyphens and underscores",
                vault
            );
        }
    }

    for (key, value) in &config.tags {
        if key.is_empty() {
            bail!("stack.tags keys must not be empty");
        }
        if key.starts_with("aws:") {
            bail!("stack.tags key '{}' uses the reserved aws: prefix", key);
        }
        if value.is_empty() {
            warn!(tag = %key, "stack tag has an empty value");
        }
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("logging.level must not be empty");
    }
    Ok(())
}
