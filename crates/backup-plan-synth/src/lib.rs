//! CloudFormation synthesis for backup plans.
//!
//! [`TemplateSynthesizer`] is a [`backup_plan_core::BackupProvisioner`] that
//! renders the plan, vault, IAM role, selection and stack outputs into a
//! template deployable with `aws cloudformation deploy`.

mod synthesizer;
pub mod template;

pub use synthesizer::{
    SynthOptions, TemplateSynthesizer, PLAN_LOGICAL_ID, ROLE_LOGICAL_ID, SELECTION_LOGICAL_ID,
    VAULT_LOGICAL_ID,
};
pub use template::{Output, Resource, Template};
