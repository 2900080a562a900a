//! Minimal CloudFormation template model.
//!
//! Only what backup plans need: resources, outputs, a description. Maps are
//! ordered so rendering is deterministic.

use anyhow::{bail, Context, Result};
use backup_plan_core::OutputValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, Resource>,

    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    pub properties: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    /// Keep the physical resource when the stack deletes or replaces it.
    pub fn retained(mut self) -> Self {
        self.deletion_policy = Some("Retain".to_string());
        self.update_replace_policy = Some("Retain".to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: OutputValue,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    pub fn new() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a resource under a logical ID. Logical IDs must be unique and
    /// alphanumeric.
    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) -> Result<()> {
        validate_logical_id(logical_id)?;
        if self.resources.contains_key(logical_id) {
            bail!("Duplicate logical ID in template: {}", logical_id);
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    pub fn has_resource(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    pub fn add_output(
        &mut self,
        name: &str,
        value: OutputValue,
        description: Option<String>,
    ) -> Result<()> {
        validate_logical_id(name)?;
        if self.outputs.contains_key(name) {
            bail!("Duplicate output in template: {}", name);
        }
        self.outputs
            .insert(name.to_string(), Output { description, value });
        Ok(())
    }

    pub fn render_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to render CloudFormation template")
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).context("Failed to serialize CloudFormation template")
    }
}

fn validate_logical_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("Logical ID must not be empty");
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Logical ID must be alphanumeric: {}", id);
    }
    Ok(())
}
