// backup-plan-config - Configuration for backup plan synthesis
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from BACKUP_PLAN_CONFIG env var
// 3. Config file contents from BACKUP_PLAN_CONFIG_CONTENT env var
// 4. Default config file locations (./backup-plan.toml, ./.backup-plan.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use backup_plan_core::SchedulingRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use sources::StdEnvSource;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Backup plan parameters; validated by the policy builder, not here.
    #[serde(default)]
    pub plan: SchedulingRequest,

    #[serde(default)]
    pub stack: StackConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployment stack settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default = "default_stack_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_name: Option<String>,

    /// Tags applied to the backup vault and plan
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default = "default_template_path")]
    pub template_path: String,

    /// Grant the backup role the restore policy as well
    #[serde(default)]
    pub allow_restores: bool,
}

fn default_stack_name() -> String {
    "BackupPlanStack".to_string()
}

fn default_template_path() -> String {
    "template.json".to_string()
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: default_stack_name(),
            description: None,
            vault_name: None,
            tags: BTreeMap::new(),
            template_path: default_template_path(),
            allow_restores: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl PlanConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from a specific file, then apply env overrides
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse backup plan config")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
