use serde::{Deserialize, Serialize};
use std::fmt;

/// A once-a-day recurrence at a fixed minute and hour (UTC).
///
/// Renders in the AWS six-field form: `cron(<minute> <hour> * * ? *)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSchedule {
    pub minute: i32,
    pub hour: i32,
}

impl CronSchedule {
    pub fn daily_at(hour: i32, minute: i32) -> Self {
        Self { minute, hour }
    }

    pub fn expression(&self) -> String {
        format!("cron({} {} * * ? *)", self.minute, self.hour)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}
