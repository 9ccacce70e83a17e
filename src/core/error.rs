//! Compile errors — caller mistakes that would otherwise produce an
//! internally inconsistent template.

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("condition '{condition}' is generated by two different variables named '{variable}'")]
    ConditionCollision { condition: String, variable: String },

    #[error("references '{first}' and '{second}' both map to parameter '{parameter}'")]
    ParameterNameCollision {
        parameter: String,
        first: String,
        second: String,
    },

    #[error("{permission} grants no actions")]
    EmptyActions { permission: String },

    #[error("{location} refers to undeclared name '{name}'")]
    UnresolvedReference { name: String, location: String },

    #[error("{location} uses undeclared condition '{condition}'")]
    UnknownCondition { condition: String, location: String },

    #[error("template serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CompileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
