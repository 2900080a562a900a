// backup-plan - command line front end
//
// Loads a PlanConfig, builds the backup policy and either prints it
// (validate) or renders it as a CloudFormation template (synth).

use backup_plan_config::PlanConfig;
use clap::Args;

mod init;
pub mod synth;
pub mod validate;

pub use init::init_tracing;

/// Plan parameters that can be set on the command line
#[derive(Args, Debug, Default, Clone)]
pub struct PlanOverrides {
    /// Backup plan name (overrides config file)
    #[arg(long, value_name = "NAME", global = true)]
    pub plan_name: Option<String>,

    /// Hour of day (UTC) to start backups, 0-23
    #[arg(long, value_name = "HOUR", global = true, allow_negative_numbers = true)]
    pub start_hour: Option<i32>,

    /// Minute of the hour to start backups
    #[arg(long, value_name = "MINUTE", global = true, allow_negative_numbers = true)]
    pub start_minute: Option<i32>,
}

pub fn apply_plan_overrides(config: &mut PlanConfig, overrides: &PlanOverrides) {
    if let Some(name) = &overrides.plan_name {
        config.plan.name = name.clone();
    }
    if let Some(hour) = overrides.start_hour {
        config.plan.start_hour = Some(hour);
    }
    if let Some(minute) = overrides.start_minute {
        config.plan.start_minute = Some(minute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = PlanConfig::default();
        config.plan.name = "from-file".to_string();
        config.plan.start_hour = Some(1);

        apply_plan_overrides(
            &mut config,
            &PlanOverrides {
                plan_name: Some("from-cli".to_string()),
                start_hour: None,
                start_minute: Some(15),
            },
        );

        assert_eq!(config.plan.name, "from-cli");
        assert_eq!(config.plan.start_hour, Some(1));
        assert_eq!(config.plan.start_minute, Some(15));
    }
}
