use crate::{LogFormat, PlanConfig};
use anyhow::{anyhow, Context, Result};
use backup_plan_core::Duration;
use std::str::FromStr;

pub const ENV_PREFIX: &str = "BACKUP_PLAN_";

/// Abstraction over environment-variable lookups so tests (and embedders)
/// can supply their own source of overrides.
pub trait EnvSource {
    /// Get a variable by its key WITHOUT the BACKUP_PLAN_ prefix
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut PlanConfig, env: &E) -> Result<()> {
    // Plan
    if let Some(name) = get_env_string(env, "NAME") {
        config.plan.name = name;
    }
    if let Some(hour) = get_env_parsed::<E, i32>(env, "START_HOUR")? {
        config.plan.start_hour = Some(hour);
    }
    if let Some(minute) = get_env_parsed::<E, i32>(env, "START_MINUTE")? {
        config.plan.start_minute = Some(minute);
    }
    if let Some(window) = get_env_parsed::<E, Duration>(env, "COMPLETION_WINDOW")? {
        config.plan.completion_window = Some(window);
    }
    if let Some(window) = get_env_parsed::<E, Duration>(env, "START_WINDOW")? {
        config.plan.start_window = Some(window);
    }
    if let Some(retention) = get_env_parsed::<E, Duration>(env, "RETENTION")? {
        config.plan.retention = Some(retention);
    }
    if let Some(after) = get_env_parsed::<E, Duration>(env, "COLD_STORAGE_AFTER")? {
        config.plan.cold_storage_after = Some(after);
    }

    // Stack
    if let Some(name) = get_env_string(env, "STACK_NAME") {
        config.stack.name = name;
    }
    if let Some(vault) = get_env_string(env, "VAULT_NAME") {
        config.stack.vault_name = if vault.is_empty() { None } else { Some(vault) };
    }
    if let Some(path) = get_env_string(env, "TEMPLATE_PATH") {
        config.stack.template_path = path;
    }
    if let Some(allow) = get_env_parsed::<E, bool>(env, "ALLOW_RESTORES")? {
        config.stack.allow_restores = allow;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .with_context(|| format!("Invalid {}LOG_FORMAT value", ENV_PREFIX))?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_parsed<E, T>(env: &E, key: &str) -> Result<Option<T>>
where
    E: EnvSource,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
