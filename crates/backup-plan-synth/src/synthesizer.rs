// CloudFormation synthesizer for backup plans
//
// Implements BackupProvisioner by writing resources into a template instead of
// calling AWS. Identifiers come back as Ref/GetAtt values that CloudFormation
// resolves at deploy time.
//
// Resources:
// - BackupVault      AWS::Backup::BackupVault (retained on delete)
// - BackupPlan       AWS::Backup::BackupPlan
// - BackupRole       AWS::IAM::Role assumed by AWS Backup
// - BackupSelection  AWS::Backup::BackupSelection, plus BackupSelection2..N
//                    for each tag predicate that needs its own Conditions

use crate::template::{Resource, Template};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use backup_plan_core::provision::BACKUP_PLAN_ID_OUTPUT;
use backup_plan_core::{
    deploy, BackupPolicyDescriptor, BackupProvisioner, OutputValue, ProvisioningResult,
    ResourceSelection, ResourceSelector, ScheduleRule, SchedulingRequest, StackOutputs,
    TagOperation,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

pub const VAULT_LOGICAL_ID: &str = "BackupVault";
pub const PLAN_LOGICAL_ID: &str = "BackupPlan";
pub const ROLE_LOGICAL_ID: &str = "BackupRole";
pub const SELECTION_LOGICAL_ID: &str = "BackupSelection";

const BACKUP_SERVICE_PRINCIPAL: &str = "backup.amazonaws.com";
const BACKUP_POLICY: &str = "service-role/AWSBackupServiceRolePolicyForBackup";
const RESTORES_POLICY: &str = "service-role/AWSBackupServiceRolePolicyForRestores";

/// AWS limit on vault names (`[A-Za-z0-9_-]{2,50}`).
const MAX_VAULT_NAME_LEN: usize = 50;
const VAULT_NAME_SUFFIX: &str = "-vault";

/// Stack-level settings applied while synthesizing.
#[derive(Debug, Clone, Default)]
pub struct SynthOptions {
    pub description: Option<String>,
    /// Vault name; `<plan name>-vault` when unset.
    pub vault_name: Option<String>,
    /// Tags applied to the vault and the plan.
    pub tags: BTreeMap<String, String>,
    /// Also grant the backup role the restore managed policy.
    pub allow_restores: bool,
}

pub struct TemplateSynthesizer {
    options: SynthOptions,
    template: Mutex<Template>,
}

impl TemplateSynthesizer {
    pub fn new(options: SynthOptions) -> Self {
        let mut template = Template::new();
        template.description = options.description.clone();
        Self {
            options,
            template: Mutex::new(template),
        }
    }

    /// Build, provision into a fresh template, and publish the stack outputs.
    pub async fn synthesize(options: SynthOptions, request: &SchedulingRequest) -> Result<Template> {
        let synth = Self::new(options);
        let outputs = deploy(&synth, request).await?;
        synth.add_outputs(&outputs)?;
        Ok(synth.into_template())
    }

    pub fn add_outputs(&self, outputs: &StackOutputs) -> Result<()> {
        let mut template = self.template.lock();
        for (name, value) in outputs.entries() {
            let description = if name == BACKUP_PLAN_ID_OUTPUT {
                "ID of the backup plan"
            } else {
                "ARN of the backup plan"
            };
            template.add_output(name, value.clone(), Some(description.to_string()))?;
        }
        Ok(())
    }

    pub fn template(&self) -> Template {
        self.template.lock().clone()
    }

    pub fn into_template(self) -> Template {
        self.template.into_inner()
    }

    fn vault_name(&self, plan_name: &str) -> String {
        self.options
            .vault_name
            .clone()
            .unwrap_or_else(|| derived_vault_name(plan_name))
    }

    fn tags_value(&self) -> Option<Value> {
        if self.options.tags.is_empty() {
            None
        } else {
            Some(json!(self.options.tags))
        }
    }
}

#[async_trait]
impl BackupProvisioner for TemplateSynthesizer {
    async fn create_plan(&self, descriptor: &BackupPolicyDescriptor) -> Result<ProvisioningResult> {
        let mut template = self.template.lock();
        if template.has_resource(PLAN_LOGICAL_ID) {
            bail!("Template already contains a backup plan");
        }

        let mut vault = Map::new();
        vault.insert(
            "BackupVaultName".to_string(),
            json!(self.vault_name(&descriptor.plan_name)),
        );
        if let Some(tags) = self.tags_value() {
            vault.insert("BackupVaultTags".to_string(), tags);
        }
        template.add_resource(
            VAULT_LOGICAL_ID,
            Resource::new("AWS::Backup::BackupVault", Value::Object(vault)).retained(),
        )?;

        let rules: Vec<Value> = descriptor.rules.iter().map(rule_properties).collect();
        let mut plan = Map::new();
        plan.insert(
            "BackupPlan".to_string(),
            json!({
                "BackupPlanName": descriptor.plan_name,
                "BackupPlanRule": rules,
            }),
        );
        if let Some(tags) = self.tags_value() {
            plan.insert("BackupPlanTags".to_string(), tags);
        }
        template.add_resource(
            PLAN_LOGICAL_ID,
            Resource::new("AWS::Backup::BackupPlan", Value::Object(plan)),
        )?;

        debug!(plan = %descriptor.plan_name, rules = descriptor.rules.len(), "Synthesized backup plan");

        Ok(ProvisioningResult {
            plan_id: OutputValue::reference(PLAN_LOGICAL_ID),
            plan_arn: OutputValue::get_att(PLAN_LOGICAL_ID, "BackupPlanArn"),
        })
    }

    async fn create_selection(
        &self,
        plan: &ProvisioningResult,
        selection: &ResourceSelection,
    ) -> Result<()> {
        let mut template = self.template.lock();
        if !template.has_resource(PLAN_LOGICAL_ID) {
            bail!("Cannot add a backup selection before the backup plan exists");
        }

        let bodies = selection_bodies(selection);
        if bodies.is_empty() {
            bail!("Backup selection '{}' selects no resources", selection.name);
        }

        template.add_resource(ROLE_LOGICAL_ID, role_resource(self.options.allow_restores))?;

        let plan_id =
            serde_json::to_value(&plan.plan_id).context("Failed to serialize backup plan ID")?;

        for (index, mut body) in bodies.into_iter().enumerate() {
            body.insert(
                "IamRoleArn".to_string(),
                json!(OutputValue::get_att(ROLE_LOGICAL_ID, "Arn")),
            );
            template.add_resource(
                &selection_logical_id(index),
                Resource::new(
                    "AWS::Backup::BackupSelection",
                    json!({
                        "BackupPlanId": plan_id.clone(),
                        "BackupSelection": Value::Object(body),
                    }),
                ),
            )?;
        }

        debug!(
            selection = %selection.name,
            resources = selection.resources.len(),
            "Synthesized backup selection"
        );
        Ok(())
    }
}

fn rule_properties(rule: &ScheduleRule) -> Value {
    let mut lifecycle = Map::new();
    lifecycle.insert(
        "DeleteAfterDays".to_string(),
        json!(rule.retention.to_days_ceil()),
    );
    if let Some(cold) = rule.cold_storage_after {
        lifecycle.insert(
            "MoveToColdStorageAfterDays".to_string(),
            json!(cold.to_days_ceil()),
        );
    }

    json!({
        "RuleName": rule.name,
        "TargetBackupVault": OutputValue::reference(VAULT_LOGICAL_ID),
        "ScheduleExpression": rule.schedule.expression(),
        "StartWindowMinutes": rule.start_window.to_minutes(),
        "CompletionWindowMinutes": rule.completion_window.to_minutes(),
        "Lifecycle": Value::Object(lifecycle),
    })
}

fn role_resource(allow_restores: bool) -> Resource {
    let mut policies = vec![BACKUP_POLICY];
    if allow_restores {
        policies.push(RESTORES_POLICY);
    }
    let managed: Vec<Value> = policies
        .iter()
        .map(|policy| {
            json!({
                "Fn::Join": ["", [
                    "arn:",
                    { "Ref": "AWS::Partition" },
                    format!(":iam::aws:policy/{}", policy),
                ]]
            })
        })
        .collect();

    Resource::new(
        "AWS::IAM::Role",
        json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": BACKUP_SERVICE_PRINCIPAL },
                    "Action": "sts:AssumeRole",
                }],
            },
            "ManagedPolicyArns": managed,
        }),
    )
}

// Plan names allow characters and lengths that vault names do not.
fn derived_vault_name(plan_name: &str) -> String {
    let mut base: String = plan_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    base.truncate(MAX_VAULT_NAME_LEN - VAULT_NAME_SUFFIX.len());
    if base.is_empty() {
        base.push_str("backup");
    }
    format!("{}{}", base, VAULT_NAME_SUFFIX)
}

fn selection_logical_id(index: usize) -> String {
    match index {
        0 => SELECTION_LOGICAL_ID.to_string(),
        n => format!("{}{}", SELECTION_LOGICAL_ID, n + 1),
    }
}

fn selection_name(base: &str, index: usize) -> String {
    match index {
        0 => base.to_string(),
        n => format!("{}-{}", base, n + 1),
    }
}

// AWS Backup ORs Resources and ListOfTags within a selection but ANDs
// Conditions and applies them as a filter. Every selector must add resources,
// so ARNs and StringEquals tags share the first selection and each other tag
// operation gets a selection of its own over "*".
fn selection_bodies(selection: &ResourceSelection) -> Vec<Map<String, Value>> {
    let mut arns = Vec::new();
    let mut list_of_tags = Vec::new();
    let mut conditions = Vec::new();

    for resource in &selection.resources {
        match resource {
            ResourceSelector::Arn { arn } => arns.push(json!(arn)),
            ResourceSelector::Tag(tag) => match tag.operation {
                TagOperation::StringEquals => list_of_tags.push(json!({
                    "ConditionType": "STRINGEQUALS",
                    "ConditionKey": tag.key,
                    "ConditionValue": tag.value,
                })),
                op => {
                    let mut condition = Map::new();
                    condition.insert(
                        condition_name(op).to_string(),
                        json!([{
                            "ConditionKey": format!("aws:ResourceTag/{}", tag.key),
                            "ConditionValue": tag.value,
                        }]),
                    );
                    conditions.push(Value::Object(condition));
                }
            },
        }
    }

    let mut bodies = Vec::new();
    if !arns.is_empty() || !list_of_tags.is_empty() {
        let mut body = Map::new();
        if !arns.is_empty() {
            body.insert("Resources".to_string(), Value::Array(arns));
        }
        if !list_of_tags.is_empty() {
            body.insert("ListOfTags".to_string(), Value::Array(list_of_tags));
        }
        bodies.push(body);
    }
    for condition in conditions {
        let mut body = Map::new();
        body.insert("Resources".to_string(), json!(["*"]));
        body.insert("Conditions".to_string(), condition);
        bodies.push(body);
    }

    for (index, body) in bodies.iter_mut().enumerate() {
        body.insert(
            "SelectionName".to_string(),
            json!(selection_name(&selection.name, index)),
        );
    }
    bodies
}

fn condition_name(op: TagOperation) -> &'static str {
    match op {
        TagOperation::StringEquals => "StringEquals",
        TagOperation::StringLike => "StringLike",
        TagOperation::StringNotEquals => "StringNotEquals",
        TagOperation::StringNotLike => "StringNotLike",
    }
}
