// Backup policy builder
//
// build() is the whole contract: resolve defaults, validate, assemble.
// No I/O and no shared state, so it is safe to call from anywhere.

use crate::request::{ResolvedSchedule, SchedulingRequest, WINDOW_MARGIN};
use crate::{
    BackupPolicyDescriptor, CronSchedule, Duration, ResourceSelection, ScheduleRule,
    ValidationError,
};
use tracing::{debug, warn};

/// Provider minimum for the start window.
const MIN_START_WINDOW: Duration = Duration::hours(1);

/// Provider minimum residency in cold storage before deletion.
const MIN_COLD_STORAGE_RESIDENCY: Duration = Duration::days(90);

/// Validate a scheduling request and turn it into a policy descriptor.
///
/// Defaults are applied before any check runs, so a caller that supplies
/// only a completion window can never trip the window-margin check.
/// Validation stops at the first violation.
pub fn build(request: &SchedulingRequest) -> Result<BackupPolicyDescriptor, ValidationError> {
    let resolved = request.resolve();
    debug!(
        plan = %request.name,
        start_hour = resolved.start_hour,
        start_minute = resolved.start_minute,
        completion_window = %resolved.completion_window,
        start_window = %resolved.start_window,
        retention = %resolved.retention,
        "Resolved backup schedule"
    );

    validate(request, &resolved)?;
    warn_on_provider_limits(&resolved);

    let rule = ScheduleRule {
        name: ScheduleRule::DEFAULT_NAME.to_string(),
        schedule: CronSchedule::daily_at(resolved.start_hour, resolved.start_minute),
        completion_window: resolved.completion_window,
        start_window: resolved.start_window,
        retention: resolved.retention,
        cold_storage_after: resolved.cold_storage_after,
    };

    Ok(BackupPolicyDescriptor {
        plan_name: request.name.clone(),
        rules: vec![rule],
        selection: ResourceSelection::new(request.resources.clone()),
    })
}

fn validate(request: &SchedulingRequest, resolved: &ResolvedSchedule) -> Result<(), ValidationError> {
    if !(0..=23).contains(&resolved.start_hour) {
        return Err(ValidationError::StartHourOutOfRange {
            hour: resolved.start_hour,
        });
    }

    let margin = resolved
        .completion_window
        .checked_sub(resolved.start_window)
        .unwrap_or(Duration::ZERO);
    if margin < WINDOW_MARGIN {
        return Err(ValidationError::WindowMarginTooSmall {
            completion: resolved.completion_window,
            start: resolved.start_window,
        });
    }

    if request.name.trim().is_empty() {
        return Err(ValidationError::EmptyPlanName);
    }

    if request.resources.is_empty() {
        return Err(ValidationError::NoResources);
    }

    Ok(())
}

fn warn_on_provider_limits(resolved: &ResolvedSchedule) {
    if resolved.start_window < MIN_START_WINDOW {
        warn!(
            start_window = %resolved.start_window,
            "start window is below the 60 minute minimum AWS Backup accepts"
        );
    }

    if let Some(cold) = resolved.cold_storage_after {
        let residency = resolved.retention.saturating_sub(cold);
        if residency < MIN_COLD_STORAGE_RESIDENCY {
            warn!(
                retention = %resolved.retention,
                cold_storage_after = %cold,
                "retention should be at least 90 days longer than the cold storage transition"
            );
        }
    }
}
