//! Function definition model — references, permissions, environment variables.
//!
//! Defines the schema of a function definition file. Every permission and
//! variable kind is a closed enum so each capability provider has to handle
//! all of them. All types derive Serialize/Deserialize for YAML/JSON/TOML
//! roundtripping and JsonSchema for publishing the definition format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Top-level function definition
// ============================================================================

/// A function definition as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionDefinition {
    /// Function (and template resource) name
    pub name: String,

    /// Runtime settings for the function resource
    #[serde(default)]
    pub settings: FunctionSettings,

    /// Dependencies compiled into the template
    #[serde(flatten)]
    pub function: LambdaFunction,
}

/// The compilation unit — everything a function depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LambdaFunction {
    /// Access grants (order only affects statement order)
    #[serde(default)]
    pub permissions: Vec<Permission>,

    /// Derived environment variables
    #[serde(default)]
    pub environment: Vec<EnvironmentVariable>,

    /// Table whose change stream triggers the function
    #[serde(default)]
    pub event_source: Option<Table>,
}

/// Function runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionSettings {
    /// Entry point
    #[serde(default = "default_handler")]
    pub handler: String,

    /// Runtime identifier
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,

    /// Memory size in MB (platform default when absent)
    #[serde(default)]
    pub memory_size: Option<u32>,

    /// Location of the packaged artifact
    #[serde(default)]
    pub code: Option<CodeLocation>,
}

impl Default for FunctionSettings {
    fn default() -> Self {
        Self {
            handler: default_handler(),
            runtime: default_runtime(),
            timeout: default_timeout(),
            memory_size: None,
            code: None,
        }
    }
}

fn default_handler() -> String {
    "index.handler".to_string()
}

fn default_runtime() -> String {
    "nodejs18.x".to_string()
}

fn default_timeout() -> u32 {
    25
}

/// Bucket/key of the deployable artifact produced by the packaging step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeLocation {
    pub s3_bucket: String,
    pub s3_key: String,
}

// ============================================================================
// References and parameters
// ============================================================================

/// One named output of an externally managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ResourceOutputReference {
    /// Resource category (e.g. "api", "auth")
    pub category: String,

    /// Resource name within the category
    pub resource: String,

    /// Output name exported by the resource's stack
    pub output: String,
}

impl fmt::Display for ResourceOutputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A template parameter supplied at deployment time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    pub name: String,

    /// Default value; absent means the template declares no default
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A data table hosted inside a named API stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub api_name: String,
    pub table_name: String,
}

/// An identity pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct UserPool {
    pub auth_name: String,
}

// ============================================================================
// Permissions
// ============================================================================

/// Access granted to the function's execution role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Permission {
    Table(TablePermission),
    UserPool(UserPoolPermission),
    SendMail(SendMailPermission),
    IamAction(IamActionPermission),
}

impl Permission {
    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::UserPool(_) => "user_pool",
            Self::SendMail(_) => "send_mail",
            Self::IamAction(_) => "iam_action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TablePermission {
    pub table: Table,
    pub actions: Vec<TableAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserPoolPermission {
    pub user_pool: UserPool,
    pub actions: Vec<UserPoolAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SendMailPermission {
    /// Verified mail identity the function may send as
    pub identity: Parameter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IamActionPermission {
    pub actions: Vec<String>,
    pub resources: Vec<IamResource>,
}

/// Table access levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableAction {
    ReadItem,
    UpdateItem,
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadItem => write!(f, "read_item"),
            Self::UpdateItem => write!(f, "update_item"),
        }
    }
}

/// Identity pool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserPoolAction {
    ListUsers,
    AdminCreateUser,
    AdminGetUser,
    AdminLinkProviderForUser,
    AdminDeleteUser,
}

impl fmt::Display for UserPoolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListUsers => write!(f, "list_users"),
            Self::AdminCreateUser => write!(f, "admin_create_user"),
            Self::AdminGetUser => write!(f, "admin_get_user"),
            Self::AdminLinkProviderForUser => write!(f, "admin_link_provider_for_user"),
            Self::AdminDeleteUser => write!(f, "admin_delete_user"),
        }
    }
}

/// Resource of a raw IAM statement — a literal ARN or another stack's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IamResource {
    Literal(String),
    Reference(ResourceOutputReference),
}

// ============================================================================
// Environment variables
// ============================================================================

/// Environment variable derived from a template value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentVariable {
    TableName(TableNameVariable),
    Parameter(ParameterVariable),
    ResourceOutput(ResourceOutputVariable),
    Coalesced(CoalescedVariable),
}

/// Runtime name of a table; the variable name is derived from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableNameVariable {
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterVariable {
    pub name: String,
    pub parameter: Parameter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceOutputVariable {
    pub name: String,
    pub reference: ResourceOutputReference,
}

/// `first` when it is non-empty at deploy time, otherwise `second`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoalescedVariable {
    pub name: String,
    pub first: ValueSource,
    pub second: ValueSource,
}

/// One leg of a coalesced variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ValueSource {
    Reference(ResourceOutputReference),
    Parameter(Parameter),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_parse() {
        let yaml = r#"
name: notesFn
settings:
  runtime: nodejs20.x
permissions:
  - type: table
    table: { api_name: api1, table_name: Notes }
    actions: [read_item, update_item]
  - type: user_pool
    user_pool: { auth_name: users }
    actions: [list_users]
  - type: send_mail
    identity: { name: senderIdentity, default: noreply@example.com }
  - type: iam_action
    actions: ["s3:GetObject"]
    resources:
      - "arn:aws:s3:::assets/*"
      - { category: storage, resource: files, output: BucketName }
environment:
  - type: table_name
    table: { api_name: api1, table_name: Notes }
  - type: coalesced
    name: SENDER
    first: { name: senderOverride }
    second: { category: auth, resource: users, output: UserPoolId }
event_source: { api_name: api1, table_name: Notes }
"#;
        let def: FunctionDefinition = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(def.name, "notesFn");
        assert_eq!(def.settings.runtime, "nodejs20.x");
        assert_eq!(def.settings.handler, "index.handler");
        assert_eq!(def.function.permissions.len(), 4);
        assert_eq!(def.function.permissions[2].kind(), "send_mail");
        assert!(def.function.event_source.is_some());

        match &def.function.permissions[3] {
            Permission::IamAction(p) => {
                assert_eq!(p.resources[0], IamResource::Literal("arn:aws:s3:::assets/*".into()));
                assert!(matches!(p.resources[1], IamResource::Reference(_)));
            }
            other => panic!("unexpected permission {:?}", other),
        }
        match &def.function.environment[1] {
            EnvironmentVariable::Coalesced(v) => {
                assert!(matches!(v.first, ValueSource::Parameter(_)));
                assert!(matches!(v.second, ValueSource::Reference(_)));
            }
            other => panic!("unexpected variable {:?}", other),
        }
    }

    #[test]
    fn test_definition_defaults() {
        let def: FunctionDefinition = serde_yaml_ng::from_str("name: bare").unwrap();
        assert!(def.function.permissions.is_empty());
        assert!(def.function.environment.is_empty());
        assert!(def.function.event_source.is_none());
        assert_eq!(def.settings, FunctionSettings::default());
        assert_eq!(def.settings.timeout, 25);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let yaml = r#"
name: f
permissions:
  - type: table
    table: { api_name: a, table_name: T }
    actions: [delete_table]
"#;
        assert!(serde_yaml_ng::from_str::<FunctionDefinition>(yaml).is_err());
    }

    #[test]
    fn test_parameter_without_default_omits_field() {
        let p = Parameter {
            name: "x".to_string(),
            default_value: None,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"name":"x"}"#);
    }

    #[test]
    fn test_definition_json_roundtrip() {
        let def = FunctionDefinition {
            name: "f".to_string(),
            settings: FunctionSettings::default(),
            function: LambdaFunction {
                permissions: vec![Permission::SendMail(SendMailPermission {
                    identity: Parameter {
                        name: "identity".to_string(),
                        default_value: Some("a@b.c".to_string()),
                    },
                })],
                environment: vec![EnvironmentVariable::ResourceOutput(ResourceOutputVariable {
                    name: "API_ID".to_string(),
                    reference: ResourceOutputReference {
                        category: "api".to_string(),
                        resource: "myAPI".to_string(),
                        output: "GraphQLAPIIdOutput".to_string(),
                    },
                })],
                event_source: None,
            },
        };
        let json = serde_json::to_string(&def).unwrap();
        let back: FunctionDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(TableAction::ReadItem.to_string(), "read_item");
        assert_eq!(
            UserPoolAction::AdminLinkProviderForUser.to_string(),
            "admin_link_provider_for_user"
        );
    }
}
