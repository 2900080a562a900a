// Provisioning seam
//
// The builder never touches a cloud SDK. Anything that can turn a descriptor
// into a real plan implements BackupProvisioner:
// - TemplateSynthesizer (backup-plan-synth): CloudFormation resources
// - test doubles recording calls

use crate::{build, BackupPolicyDescriptor, ResourceSelection, SchedulingRequest};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Output name for the plan identifier.
pub const BACKUP_PLAN_ID_OUTPUT: &str = "BackupPlanId";
/// Output name for the plan ARN.
pub const BACKUP_PLAN_ARN_OUTPUT: &str = "BackupPlanArn";

/// An identifier produced by the provisioning layer.
///
/// Live provisioners return literal values. Template-based provisioners only
/// know identifiers after deployment, so they return references that the
/// template engine resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    Literal(String),
    Ref {
        #[serde(rename = "Ref")]
        logical_id: String,
    },
    GetAtt {
        #[serde(rename = "Fn::GetAtt")]
        target: (String, String),
    },
}

impl OutputValue {
    pub fn literal(value: impl Into<String>) -> Self {
        OutputValue::Literal(value.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        OutputValue::Ref {
            logical_id: logical_id.into(),
        }
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        OutputValue::GetAtt {
            target: (logical_id.into(), attribute.into()),
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            OutputValue::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputValue::Literal(value) => write!(f, "{}", value),
            OutputValue::Ref { logical_id } => write!(f, "!Ref {}", logical_id),
            OutputValue::GetAtt {
                target: (logical_id, attribute),
            } => write!(f, "!GetAtt {}.{}", logical_id, attribute),
        }
    }
}

/// Identifiers of a provisioned plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningResult {
    pub plan_id: OutputValue,
    pub plan_arn: OutputValue,
}

/// Named outputs published for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutputs {
    #[serde(rename = "BackupPlanId")]
    pub backup_plan_id: OutputValue,
    #[serde(rename = "BackupPlanArn")]
    pub backup_plan_arn: OutputValue,
}

impl StackOutputs {
    /// Outputs as (name, value) pairs, in publication order.
    pub fn entries(&self) -> [(&'static str, &OutputValue); 2] {
        [
            (BACKUP_PLAN_ID_OUTPUT, &self.backup_plan_id),
            (BACKUP_PLAN_ARN_OUTPUT, &self.backup_plan_arn),
        ]
    }
}

impl From<ProvisioningResult> for StackOutputs {
    fn from(result: ProvisioningResult) -> Self {
        Self {
            backup_plan_id: result.plan_id,
            backup_plan_arn: result.plan_arn,
        }
    }
}

/// Capability interface over an infrastructure provisioning SDK.
#[async_trait]
pub trait BackupProvisioner: Send + Sync {
    /// Create the backup plan described by `descriptor`.
    async fn create_plan(&self, descriptor: &BackupPolicyDescriptor) -> Result<ProvisioningResult>;

    /// Attach a resource selection to a plan created by `create_plan`.
    async fn create_selection(
        &self,
        plan: &ProvisioningResult,
        selection: &ResourceSelection,
    ) -> Result<()>;
}

/// Build the policy for `request` and provision it.
///
/// Validation runs before the provisioner is touched, so an invalid request
/// leaves no partial state behind.
pub async fn deploy<P>(provisioner: &P, request: &SchedulingRequest) -> Result<StackOutputs>
where
    P: BackupProvisioner + ?Sized,
{
    let descriptor = build(request)?;
    deploy_descriptor(provisioner, &descriptor).await
}

/// Provision an already-built descriptor.
pub async fn deploy_descriptor<P>(
    provisioner: &P,
    descriptor: &BackupPolicyDescriptor,
) -> Result<StackOutputs>
where
    P: BackupProvisioner + ?Sized,
{
    let plan = provisioner.create_plan(descriptor).await?;
    provisioner
        .create_selection(&plan, &descriptor.selection)
        .await?;

    info!(
        plan = %descriptor.plan_name,
        plan_id = %plan.plan_id,
        plan_arn = %plan.plan_arn,
        resources = descriptor.selection.resources.len(),
        "Backup plan provisioned"
    );

    Ok(plan.into())
}
