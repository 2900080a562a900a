//! Declarative backup policy handed to a provisioning layer.

use crate::{CronSchedule, Duration, ResourceSelection};
use serde::{Deserialize, Serialize};

/// A single recurring backup rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub name: String,
    pub schedule: CronSchedule,
    pub completion_window: Duration,
    pub start_window: Duration,
    pub retention: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_storage_after: Option<Duration>,
}

impl ScheduleRule {
    pub const DEFAULT_NAME: &'static str = "ScheduledBackupRule";
}

/// Everything needed to materialize a backup plan and its selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupPolicyDescriptor {
    pub plan_name: String,
    pub rules: Vec<ScheduleRule>,
    pub selection: ResourceSelection,
}

impl BackupPolicyDescriptor {
    /// The plan's primary rule. Descriptors from `build` always have one.
    pub fn rule(&self) -> Option<&ScheduleRule> {
        self.rules.first()
    }
}
