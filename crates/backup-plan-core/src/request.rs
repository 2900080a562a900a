// Scheduling request and its defaulting pass
//
// SchedulingRequest mirrors what a caller (or a config file) supplies: every
// tunable is optional. ResolvedSchedule is the same data after defaults are
// applied, with nothing left to infer. Validation only ever looks at the
// resolved form.

use crate::{Duration, ResourceSelector};
use serde::{Deserialize, Serialize};

pub const DEFAULT_START_HOUR: i32 = 5;
pub const DEFAULT_START_MINUTE: i32 = 0;
pub const DEFAULT_COMPLETION_WINDOW: Duration = Duration::hours(3);
pub const DEFAULT_RETENTION_PERIOD: Duration = Duration::days(90);

/// Gap between the completion window and the default start window.
pub const WINDOW_MARGIN: Duration = Duration::hours(1);

/// User-supplied parameters for a scheduled backup plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// Resources to protect.
    #[serde(default)]
    pub resources: Vec<ResourceSelector>,

    /// Display name of the backup plan.
    #[serde(default, alias = "plan_name")]
    pub name: String,

    /// How long a started job may run before it is canceled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_window: Option<Duration>,

    /// How long a scheduled job may wait to start before it is canceled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_window: Option<Duration>,

    /// Age at which a recovery point is deleted.
    #[serde(default, alias = "retention_period", skip_serializing_if = "Option::is_none")]
    pub retention: Option<Duration>,

    /// Age at which a recovery point moves to cold storage. Never when unset.
    #[serde(
        default,
        alias = "cold_storage_transition",
        skip_serializing_if = "Option::is_none"
    )]
    pub cold_storage_after: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_minute: Option<i32>,
}

impl SchedulingRequest {
    pub fn new(name: impl Into<String>, resources: Vec<ResourceSelector>) -> Self {
        Self {
            resources,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_start_time(mut self, hour: i32, minute: i32) -> Self {
        self.start_hour = Some(hour);
        self.start_minute = Some(minute);
        self
    }

    pub fn with_completion_window(mut self, window: Duration) -> Self {
        self.completion_window = Some(window);
        self
    }

    pub fn with_start_window(mut self, window: Duration) -> Self {
        self.start_window = Some(window);
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    pub fn with_cold_storage_after(mut self, after: Duration) -> Self {
        self.cold_storage_after = Some(after);
        self
    }

    /// Apply defaults. Pure; does not validate.
    pub fn resolve(&self) -> ResolvedSchedule {
        let completion_window = self.completion_window.unwrap_or(DEFAULT_COMPLETION_WINDOW);
        // Start window default chains off the effective completion window
        let start_window = self
            .start_window
            .unwrap_or_else(|| completion_window.saturating_sub(WINDOW_MARGIN));

        ResolvedSchedule {
            start_hour: self.start_hour.unwrap_or(DEFAULT_START_HOUR),
            start_minute: self.start_minute.unwrap_or(DEFAULT_START_MINUTE),
            completion_window,
            start_window,
            retention: self.retention.unwrap_or(DEFAULT_RETENTION_PERIOD),
            cold_storage_after: self.cold_storage_after,
        }
    }
}

/// Scheduling parameters with every default applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedSchedule {
    pub start_hour: i32,
    pub start_minute: i32,
    pub completion_window: Duration,
    pub start_window: Duration,
    pub retention: Duration,
    pub cold_storage_after: Option<Duration>,
}
