//! Condition provider — guard conditions required by coalesced variables.

use super::expression::RuntimeExpression;
use crate::core::expr::Expr;
use crate::core::types::{EnvironmentVariable, Permission};

/// Generated condition name for a coalesced variable.
pub fn condition_name(variable_name: &str) -> String {
    format!("FirstNotEmpty_{}", variable_name)
}

/// Lists `(name, expression)` pairs for the Conditions section.
pub trait ConditionProvider {
    fn conditions(&self) -> Vec<(String, Expr)>;
}

impl ConditionProvider for Permission {
    fn conditions(&self) -> Vec<(String, Expr)> {
        match self {
            Self::Table(_) | Self::UserPool(_) | Self::SendMail(_) | Self::IamAction(_) => {
                Vec::new()
            }
        }
    }
}

impl ConditionProvider for EnvironmentVariable {
    fn conditions(&self) -> Vec<(String, Expr)> {
        match self {
            Self::TableName(_) | Self::Parameter(_) | Self::ResourceOutput(_) => Vec::new(),
            Self::Coalesced(v) => vec![(
                condition_name(&v.name),
                Expr::not(Expr::equals(v.first.runtime_expr(), Expr::literal(""))),
            )],
        }
    }
}
