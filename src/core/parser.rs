//! Definition parsing and validation.
//!
//! Parses a function definition (YAML, JSON, or TOML) and validates
//! structural constraints the compiler assumes:
//! - Function name must not be empty
//! - Table, API, and auth names must not be empty
//! - Permissions must grant at least one action on at least one resource
//! - Variable names must be non-empty and unique

use super::types::*;
use std::collections::HashSet;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Definition file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
    Toml,
}

impl DefinitionFormat {
    /// Pick the format from a file extension (YAML when unknown).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Parse a definition file from disk.
pub fn parse_definition_file(path: &Path) -> Result<FunctionDefinition, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_definition(&content, DefinitionFormat::from_path(path))
}

/// Parse a definition from a string.
pub fn parse_definition(
    content: &str,
    format: DefinitionFormat,
) -> Result<FunctionDefinition, String> {
    match format {
        DefinitionFormat::Yaml => {
            serde_yaml_ng::from_str(content).map_err(|e| format!("YAML parse error: {}", e))
        }
        DefinitionFormat::Json => {
            serde_json::from_str(content).map_err(|e| format!("JSON parse error: {}", e))
        }
        DefinitionFormat::Toml => {
            toml::from_str(content).map_err(|e| format!("TOML parse error: {}", e))
        }
    }
}

/// Validate a parsed definition. Returns a list of errors (empty = valid).
pub fn validate_definition(def: &FunctionDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut error = |message: String| errors.push(ValidationError { message });

    if def.name.is_empty() {
        error("name must not be empty".to_string());
    }

    for (i, permission) in def.function.permissions.iter().enumerate() {
        let id = format!("permission #{} ({})", i + 1, permission.kind());
        match permission {
            Permission::Table(p) => {
                for message in table_errors(&p.table) {
                    error(format!("{} {}", id, message));
                }
                if p.actions.is_empty() {
                    error(format!("{} has no actions", id));
                }
            }
            Permission::UserPool(p) => {
                if p.user_pool.auth_name.is_empty() {
                    error(format!("{} has an empty auth name", id));
                }
                if p.actions.is_empty() {
                    error(format!("{} has no actions", id));
                }
            }
            Permission::SendMail(p) => {
                if p.identity.name.is_empty() {
                    error(format!("{} has an empty identity parameter name", id));
                }
            }
            Permission::IamAction(p) => {
                if p.actions.is_empty() {
                    error(format!("{} has no actions", id));
                }
                if p.actions.iter().any(|a| a.is_empty()) {
                    error(format!("{} has an empty action", id));
                }
                if p.resources.is_empty() {
                    error(format!("{} has no resources", id));
                }
            }
        }
    }

    let mut seen = HashSet::new();
    for variable in &def.function.environment {
        if let EnvironmentVariable::TableName(v) = variable {
            for message in table_errors(&v.table) {
                error(format!("table_name variable {}", message));
            }
        }
        let name = variable.name();
        if name.is_empty() {
            error("environment variable has an empty name".to_string());
        } else if !seen.insert(name.clone()) {
            tracing::warn!(variable = %name, "environment variable declared twice, later entry wins");
        }
    }

    if let Some(table) = &def.function.event_source {
        for message in table_errors(table) {
            error(format!("event source {}", message));
        }
    }

    errors
}

fn table_errors(table: &Table) -> Vec<&'static str> {
    let mut errors = Vec::new();
    if table.api_name.is_empty() {
        errors.push("has an empty api name");
    }
    if table.table_name.is_empty() {
        errors.push("has an empty table name");
    }
    errors
}
