// Minute-granular durations for backup windows and lifecycle settings
//
// AWS Backup expresses windows in minutes and lifecycle in days, so a minute
// is the smallest unit worth representing. The textual form ("45m", "3h",
// "90d") is what configuration files use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

/// A non-negative span of time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration {
    minutes: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration { minutes: 0 };

    pub const fn minutes(minutes: u64) -> Self {
        Self { minutes }
    }

    pub const fn hours(hours: u64) -> Self {
        Self {
            minutes: hours * MINUTES_PER_HOUR,
        }
    }

    pub const fn days(days: u64) -> Self {
        Self {
            minutes: days * MINUTES_PER_DAY,
        }
    }

    pub const fn to_minutes(&self) -> u64 {
        self.minutes
    }

    /// Whole hours, truncated.
    pub const fn to_hours(&self) -> u64 {
        self.minutes / MINUTES_PER_HOUR
    }

    /// Days rounded up, so a lifecycle setting is never shortened.
    pub const fn to_days_ceil(&self) -> u64 {
        self.minutes.div_ceil(MINUTES_PER_DAY)
    }

    pub fn checked_sub(self, other: Duration) -> Option<Duration> {
        self.minutes.checked_sub(other.minutes).map(Duration::minutes)
    }

    pub fn saturating_sub(self, other: Duration) -> Duration {
        Duration::minutes(self.minutes.saturating_sub(other.minutes))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes;
        if m != 0 && m % MINUTES_PER_DAY == 0 {
            write!(f, "{}d", m / MINUTES_PER_DAY)
        } else if m != 0 && m % MINUTES_PER_HOUR == 0 {
            write!(f, "{}h", m / MINUTES_PER_HOUR)
        } else {
            write!(f, "{}m", m)
        }
    }
}

/// Errors from parsing the textual duration form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDurationError {
    #[error("duration must not be empty")]
    Empty,
    #[error("invalid duration '{0}': expected a number followed by m, h or d (e.g. 3h)")]
    Invalid(String),
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseDurationError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ParseDurationError::Invalid(s.to_string()))?;
        let (number, unit) = s.split_at(split);
        let value: u64 = number
            .parse()
            .map_err(|_| ParseDurationError::Invalid(s.to_string()))?;

        let scale = match unit.trim().to_ascii_lowercase().as_str() {
            "m" | "min" | "mins" | "minutes" => 1,
            "h" | "hr" | "hrs" | "hours" => MINUTES_PER_HOUR,
            "d" | "day" | "days" => MINUTES_PER_DAY,
            _ => return Err(ParseDurationError::Invalid(s.to_string())),
        };

        value
            .checked_mul(scale)
            .map(Duration::minutes)
            .ok_or_else(|| ParseDurationError::Overflow(s.to_string()))
    }
}

impl TryFrom<String> for Duration {
    type Error = ParseDurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Duration> for String {
    fn from(value: Duration) -> Self {
        value.to_string()
    }
}
