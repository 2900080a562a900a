//! Error types for backup policy construction.

use crate::Duration;
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Start hour outside 0-23
    E001StartHourOutOfRange,
    /// E002: Completion window too close to start window
    E002WindowMargin,
    /// E003: Plan name missing
    E003EmptyPlanName,
    /// E004: No resources selected
    E004NoResources,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001StartHourOutOfRange => "E001",
            Self::E002WindowMargin => "E002",
            Self::E003EmptyPlanName => "E003",
            Self::E004NoResources => "E004",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while turning a scheduling request into a policy descriptor.
///
/// All variants are configuration errors found at build time. None of them
/// are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("[E001] start hour out of range: {hour} (expected 0-23)")]
    StartHourOutOfRange { hour: i32 },

    #[error(
        "[E002] completion window must exceed start window by at least 60 minutes \
         (completion window {completion}, start window {start})"
    )]
    WindowMarginTooSmall { completion: Duration, start: Duration },

    #[error("[E003] backup plan name must not be empty")]
    EmptyPlanName,

    #[error("[E004] at least one resource must be selected for backup")]
    NoResources,
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StartHourOutOfRange { .. } => ErrorCode::E001StartHourOutOfRange,
            Self::WindowMarginTooSmall { .. } => ErrorCode::E002WindowMargin,
            Self::EmptyPlanName => ErrorCode::E003EmptyPlanName,
            Self::NoResources => ErrorCode::E004NoResources,
        }
    }
}
