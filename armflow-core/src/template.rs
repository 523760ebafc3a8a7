//! Template - ARM deployment template structures
//!
//! Deserialized shape of an Azure Resource Manager template document.
//! Only the fields the resolver and diagram layers need are typed;
//! everything else rides along as raw JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Template loading error
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template has no $schema identifier")]
    MissingSchema,
}

/// An ARM deployment template document
///
/// Parameters and variables use `BTreeMap` so iteration order is stable
/// across runs; resource order is the declaration order in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmTemplate {
    /// Schema identifier; its presence is the minimal shape check
    #[serde(rename = "$schema", default)]
    pub schema: String,

    #[serde(
        rename = "contentVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_version: Option<String>,

    /// Parameter name -> definition
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterDefinition>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDeclaration>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Value>,
}

impl ArmTemplate {
    /// Parse a template from a JSON string and apply the minimal shape check
    pub fn parse(content: &str) -> Result<Self, TemplateError> {
        let template: Self = serde_json::from_str(content)?;
        if template.schema.trim().is_empty() {
            return Err(TemplateError::MissingSchema);
        }
        Ok(template)
    }

    /// Load a template from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// One entry in the template's `parameters` mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,

    #[serde(
        rename = "defaultValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ParameterMetadata>,
}

impl ParameterDefinition {
    /// Human-readable description from the metadata block, if any
    pub fn description(&self) -> Option<&str> {
        self.metadata.as_ref()?.description.as_deref()
    }
}

/// Parameter metadata block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry in the template's `resources` array, as declared
///
/// The declared name may be a literal or an unevaluated ARM expression
/// string such as `"[variables('vmName')]"`; it is not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(
        rename = "apiVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    /// Raw reference expressions naming the resources this one deploys after
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ResourceDeclaration {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            resource_type: Some(resource_type.into()),
            api_version: None,
            location: None,
            properties: None,
            depends_on: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = depends_on;
        self
    }
}
