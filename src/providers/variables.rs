//! Variable provider — resolves environment variables to runtime expressions.

use super::conditions::condition_name;
use super::expression::{table_name, RuntimeExpression};
use crate::core::expr::Expr;
use crate::core::types::{EnvironmentVariable, Table};

/// Variable name exposing a table's runtime name: `UPPER(<table>_table_name)`.
pub fn table_name_variable(table: &Table) -> String {
    format!("{}_table_name", table.table_name).to_uppercase()
}

/// Produces the `(name, value)` entry for the function's environment.
pub trait VariableProvider {
    fn variable(&self) -> (String, Expr);
}

impl VariableProvider for EnvironmentVariable {
    fn variable(&self) -> (String, Expr) {
        match self {
            Self::TableName(v) => (table_name_variable(&v.table), table_name(&v.table)),
            Self::Parameter(v) => (v.name.clone(), v.parameter.runtime_expr()),
            Self::ResourceOutput(v) => (v.name.clone(), v.reference.runtime_expr()),
            Self::Coalesced(v) => (
                v.name.clone(),
                Expr::if_then_else(
                    &condition_name(&v.name),
                    v.first.runtime_expr(),
                    v.second.runtime_expr(),
                ),
            ),
        }
    }
}

impl EnvironmentVariable {
    /// Name of the variable in the function's environment.
    pub fn name(&self) -> String {
        match self {
            Self::TableName(v) => table_name_variable(&v.table),
            Self::Parameter(v) => v.name.clone(),
            Self::ResourceOutput(v) => v.name.clone(),
            Self::Coalesced(v) => v.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::*;
    use serde_json::json;

    #[test]
    fn test_table_name_variable() {
        let v = EnvironmentVariable::TableName(TableNameVariable {
            table: Table::new("myApi", "Todo"),
        });
        let (name, value) = v.variable();
        assert_eq!(name, "TODO_TABLE_NAME");
        assert_eq!(v.name(), name);
        let sub = serde_json::to_value(&value).unwrap()["Fn::ImportValue"]["Fn::Sub"].clone();
        assert!(sub.as_str().unwrap().ends_with(":GetAtt:TodoTable:Name"));
    }

    #[test]
    fn test_parameter_and_output_variables() {
        let p = EnvironmentVariable::Parameter(ParameterVariable {
            name: "STAGE".to_string(),
            parameter: Parameter::new("stage"),
        });
        assert_eq!(p.variable(), ("STAGE".to_string(), Expr::reference("stage")));

        let o = EnvironmentVariable::ResourceOutput(ResourceOutputVariable {
            name: "API_ID".to_string(),
            reference: ResourceOutputReference::new("api", "myAPI", "GraphQLAPIIdOutput"),
        });
        assert_eq!(
            o.variable(),
            ("API_ID".to_string(), Expr::reference("apimyAPIGraphQLAPIIdOutput"))
        );
    }

    #[test]
    fn test_coalesced_variable() {
        let v = EnvironmentVariable::Coalesced(CoalescedVariable {
            name: "X".to_string(),
            first: ValueSource::Parameter(Parameter::new("override")),
            second: ValueSource::Reference(ResourceOutputReference::new("auth", "users", "UserPoolId")),
        });
        let (name, value) = v.variable();
        assert_eq!(name, "X");
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"Fn::If": ["FirstNotEmpty_X", {"Ref": "override"}, {"Ref": "authusersUserPoolId"}]})
        );
    }
}
