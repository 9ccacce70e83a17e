//! Runtime expressions — every external value is read through a parameter.

use crate::core::expr::Expr;
use crate::core::types::{
    IamResource, Parameter, ResourceOutputReference, Table, UserPool, ValueSource,
};

/// Converts a value source into the expression that reads it at deploy time.
pub trait RuntimeExpression {
    fn runtime_expr(&self) -> Expr;
}

impl RuntimeExpression for Parameter {
    fn runtime_expr(&self) -> Expr {
        Expr::reference(&self.name)
    }
}

impl RuntimeExpression for ResourceOutputReference {
    fn runtime_expr(&self) -> Expr {
        Expr::reference(&self.parameter_name())
    }
}

impl RuntimeExpression for ValueSource {
    fn runtime_expr(&self) -> Expr {
        match self {
            Self::Parameter(p) => p.runtime_expr(),
            Self::Reference(r) => r.runtime_expr(),
        }
    }
}

impl RuntimeExpression for IamResource {
    fn runtime_expr(&self) -> Expr {
        match self {
            Self::Literal(arn) => Expr::literal(arn),
            Self::Reference(r) => r.runtime_expr(),
        }
    }
}

/// Import an attribute the API stack exports for `table`:
/// `${<api param>}:GetAtt:<Name>Table:<attribute>`.
pub fn table_import(table: &Table, attribute: &str) -> Expr {
    Expr::import_value(Expr::sub(&format!(
        "${{{}}}:GetAtt:{}:{}",
        table.output_reference().parameter_name(),
        table.logical_id(),
        attribute
    )))
}

/// The table's runtime name.
pub fn table_name(table: &Table) -> Expr {
    table_import(table, "Name")
}

/// The table's change-stream ARN.
pub fn table_stream_arn(table: &Table) -> Expr {
    table_import(table, "StreamArn")
}

/// `arn:aws:dynamodb:<region>:<account>:table/<imported name>`
pub fn table_arn(table: &Table) -> Expr {
    regional_arn("dynamodb", "table/", table_name(table))
}

/// `arn:aws:cognito-idp:<region>:<account>:userpool/<pool id>`
pub fn user_pool_arn(pool: &UserPool) -> Expr {
    regional_arn("cognito-idp", "userpool/", pool.id_reference().runtime_expr())
}

fn regional_arn(service: &str, resource_prefix: &str, id: Expr) -> Expr {
    Expr::join(
        "",
        vec![
            Expr::literal(&format!("arn:aws:{}:", service)),
            Expr::region(),
            Expr::literal(":"),
            Expr::account_id(),
            Expr::literal(&format!(":{}", resource_prefix)),
            id,
        ],
    )
}
