// backup-plan-core - Backup policy builder
//
// This crate holds the PURE policy logic: a scheduling request goes in, a
// validated backup policy descriptor comes out. No I/O, no cloud SDK.
// Provisioning happens behind the BackupProvisioner trait, implemented
// elsewhere (CloudFormation synthesis, test doubles).

mod builder;
mod duration;
mod error;
mod policy;
pub mod provision;
pub mod request;
mod resource;
mod schedule;

pub use builder::build;
pub use duration::{Duration, ParseDurationError};
pub use error::{ErrorCode, ValidationError};
pub use policy::{BackupPolicyDescriptor, ScheduleRule};
pub use provision::{
    deploy, deploy_descriptor, BackupProvisioner, OutputValue, ProvisioningResult, StackOutputs,
};
pub use request::{ResolvedSchedule, SchedulingRequest};
pub use resource::{ResourceSelection, ResourceSelector, TagCondition, TagOperation};
pub use schedule::CronSchedule;
