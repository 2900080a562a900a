//! Resource selection predicates.
//!
//! Selectors are opaque to the builder: they are carried through to the
//! provisioning layer unmodified.

use serde::{Deserialize, Serialize};

/// Identifies which cloud resources a backup plan protects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceSelector {
    /// A single resource (or wildcard pattern) by ARN.
    Arn { arn: String },
    /// Every resource whose tag matches the condition.
    Tag(TagCondition),
}

impl ResourceSelector {
    pub fn from_arn(arn: impl Into<String>) -> Self {
        ResourceSelector::Arn { arn: arn.into() }
    }

    pub fn from_tag(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_tag_with(key, value, TagOperation::StringEquals)
    }

    pub fn from_tag_with(
        key: impl Into<String>,
        value: impl Into<String>,
        operation: TagOperation,
    ) -> Self {
        ResourceSelector::Tag(TagCondition {
            key: key.into(),
            value: value.into(),
            operation,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCondition {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub operation: TagOperation,
}

/// Comparison applied between a resource tag and the condition value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperation {
    #[default]
    StringEquals,
    StringLike,
    StringNotEquals,
    StringNotLike,
}

impl std::fmt::Display for TagOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagOperation::StringEquals => write!(f, "string_equals"),
            TagOperation::StringLike => write!(f, "string_like"),
            TagOperation::StringNotEquals => write!(f, "string_not_equals"),
            TagOperation::StringNotLike => write!(f, "string_not_like"),
        }
    }
}

impl std::str::FromStr for TagOperation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "string_equals" | "equals" | "stringequals" => Ok(TagOperation::StringEquals),
            "string_like" | "like" | "stringlike" => Ok(TagOperation::StringLike),
            "string_not_equals" | "not_equals" | "stringnotequals" => {
                Ok(TagOperation::StringNotEquals)
            }
            "string_not_like" | "not_like" | "stringnotlike" => Ok(TagOperation::StringNotLike),
            _ => anyhow::bail!(
                "Unsupported tag operation: {}. Supported: string_equals, string_like, string_not_equals, string_not_like",
                s
            ),
        }
    }
}

/// The resource-selection rule attached to a backup plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSelection {
    pub name: String,
    pub resources: Vec<ResourceSelector>,
}

impl ResourceSelection {
    pub const DEFAULT_NAME: &'static str = "BackupSelection";

    pub fn new(resources: Vec<ResourceSelector>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            resources,
        }
    }
}
