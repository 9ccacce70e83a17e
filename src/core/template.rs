//! The compiled infrastructure template and its policy document types.

use super::expr::Expr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Policy language version stamped on every policy document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// A complete template: Parameters, Conditions, Resources, Outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    pub parameters: IndexMap<String, ParameterDecl>,
    pub conditions: IndexMap<String, Expr>,
    pub resources: IndexMap<String, ResourceDecl>,
    pub outputs: IndexMap<String, OutputDecl>,
}

/// Declaration in the Parameters section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDecl {
    #[serde(rename = "Type")]
    pub param_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterDecl {
    pub fn string(default: Option<String>) -> Self {
        Self {
            param_type: "String".to_string(),
            default,
        }
    }
}

/// A logical resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceDecl {
    #[serde(rename = "Type")]
    pub resource_type: String,

    /// Logical ids that must be created first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    pub properties: serde_json::Value,
}

impl ResourceDecl {
    pub fn new(resource_type: &str, properties: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            depends_on: Vec::new(),
            properties,
        }
    }

    pub fn depends_on(mut self, logical_ids: &[&str]) -> Self {
        self.depends_on = logical_ids.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// An entry in the Outputs section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDecl {
    pub value: Expr,
}

/// An access-control policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    pub action: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<Expr>,
}

impl PolicyStatement {
    /// An `Allow` statement for `actions` on `resources`.
    pub fn allow(actions: Vec<String>, resources: Vec<Expr>) -> Self {
        Self {
            effect: "Allow".to_string(),
            principal: None,
            action: actions,
            resource: resources,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: Vec<String>,
}

impl Template {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("JSON serialize error: {}", e))
    }

    /// YAML in long form. Intrinsics go through a JSON value tree so they
    /// come out as `Fn::If:` maps rather than YAML tags.
    pub fn to_yaml(&self) -> Result<String, String> {
        let value =
            serde_json::to_value(self).map_err(|e| format!("JSON serialize error: {}", e))?;
        serde_yaml_ng::to_string(&value).map_err(|e| format!("YAML serialize error: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("JSON parse error: {}", e))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;
        serde_json::from_value(value).map_err(|e| format!("YAML parse error: {}", e))
    }

    /// BLAKE3 of the compact JSON form. Returns `"blake3:{hex}"`.
    pub fn fingerprint(&self) -> Result<String, String> {
        let canonical =
            serde_json::to_vec(self).map_err(|e| format!("JSON serialize error: {}", e))?;
        Ok(format!("blake3:{}", blake3::hash(&canonical).to_hex()))
    }
}
