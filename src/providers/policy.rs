//! Policy provider — the statement each permission adds to the execution policy.

use super::expression::{table_arn, user_pool_arn, RuntimeExpression};
use crate::core::expr::Expr;
use crate::core::template::PolicyStatement;
use crate::core::types::*;

/// The only action a mail permission grants.
pub const SEND_MAIL_ACTION: &str = "ses:SendEmail";

/// Converts a permission into one `Allow` statement.
pub trait PolicyProvider {
    fn policy_statement(&self) -> PolicyStatement;
}

impl TableAction {
    /// Data-table action granted for this access level.
    pub fn iam_action(&self) -> &'static str {
        match self {
            Self::ReadItem => "dynamodb:GetItem",
            Self::UpdateItem => "dynamodb:UpdateItem",
        }
    }
}

impl UserPoolAction {
    pub fn iam_action(&self) -> &'static str {
        match self {
            Self::ListUsers => "cognito-idp:ListUsers",
            Self::AdminCreateUser => "cognito-idp:AdminCreateUser",
            Self::AdminGetUser => "cognito-idp:AdminGetUser",
            Self::AdminLinkProviderForUser => "cognito-idp:AdminLinkProviderForUser",
            Self::AdminDeleteUser => "cognito-idp:AdminDeleteUser",
        }
    }
}

impl PolicyProvider for Permission {
    fn policy_statement(&self) -> PolicyStatement {
        match self {
            Self::Table(p) => PolicyStatement::allow(
                p.actions.iter().map(|a| a.iam_action().to_string()).collect(),
                vec![table_arn(&p.table)],
            ),
            Self::UserPool(p) => PolicyStatement::allow(
                p.actions.iter().map(|a| a.iam_action().to_string()).collect(),
                vec![user_pool_arn(&p.user_pool)],
            ),
            Self::SendMail(p) => PolicyStatement::allow(
                vec![SEND_MAIL_ACTION.to_string()],
                vec![Expr::sub(&format!(
                    "arn:aws:ses:${{AWS::Region}}:${{AWS::AccountId}}:identity/${{{}}}",
                    p.identity.name
                ))],
            ),
            Self::IamAction(p) => PolicyStatement::allow(
                p.actions.clone(),
                p.resources.iter().map(|r| r.runtime_expr()).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_permission(actions: Vec<TableAction>) -> Permission {
        Permission::Table(TablePermission {
            table: Table::new("api1", "Notes"),
            actions,
        })
    }

    #[test]
    fn test_table_actions_mapped_in_order() {
        let s = table_permission(vec![TableAction::ReadItem, TableAction::UpdateItem])
            .policy_statement();
        assert_eq!(s.effect, "Allow");
        assert_eq!(s.action, vec!["dynamodb:GetItem", "dynamodb:UpdateItem"]);
        assert_eq!(s.resource.len(), 1);

        let s = table_permission(vec![TableAction::UpdateItem, TableAction::ReadItem])
            .policy_statement();
        assert_eq!(s.action, vec!["dynamodb:UpdateItem", "dynamodb:GetItem"]);
    }

    #[test]
    fn test_user_pool_actions() {
        let p = Permission::UserPool(UserPoolPermission {
            user_pool: UserPool::new("users"),
            actions: vec![UserPoolAction::ListUsers, UserPoolAction::AdminDeleteUser],
        });
        let s = p.policy_statement();
        assert_eq!(
            s.action,
            vec!["cognito-idp:ListUsers", "cognito-idp:AdminDeleteUser"]
        );
        assert_eq!(s.resource, vec![user_pool_arn(&UserPool::new("users"))]);
    }

    #[test]
    fn test_send_mail_scoped_to_identity() {
        let p = Permission::SendMail(SendMailPermission {
            identity: Parameter::new("mailIdentity"),
        });
        let value = serde_json::to_value(p.policy_statement()).unwrap();
        assert_eq!(
            value,
            json!({
                "Effect": "Allow",
                "Action": ["ses:SendEmail"],
                "Resource": [{"Fn::Sub": "arn:aws:ses:${AWS::Region}:${AWS::AccountId}:identity/${mailIdentity}"}]
            })
        );
    }

    #[test]
    fn test_iam_action_passthrough() {
        let p = Permission::IamAction(IamActionPermission {
            actions: vec!["s3:GetObject".to_string(), "s3:PutObject".to_string()],
            resources: vec![
                IamResource::Literal("arn:aws:s3:::a/*".to_string()),
                IamResource::Reference(ResourceOutputReference::new(
                    "storage", "files", "BucketArn",
                )),
            ],
        });
        let value = serde_json::to_value(p.policy_statement()).unwrap();
        assert_eq!(value["Action"], json!(["s3:GetObject", "s3:PutObject"]));
        assert_eq!(
            value["Resource"],
            json!(["arn:aws:s3:::a/*", {"Ref": "storagefilesBucketArn"}])
        );
    }
}
