//! Parameter provider — free parameters each fragment requires.

use crate::core::types::*;

/// Lists the parameters a fragment needs declared, in emission order.
pub trait ParameterProvider {
    fn parameters(&self) -> Vec<Parameter>;
}

impl ParameterProvider for Table {
    fn parameters(&self) -> Vec<Parameter> {
        vec![self.output_reference().to_parameter()]
    }
}

impl ParameterProvider for ValueSource {
    fn parameters(&self) -> Vec<Parameter> {
        match self {
            Self::Parameter(p) => vec![p.clone()],
            Self::Reference(r) => vec![r.to_parameter()],
        }
    }
}

impl ParameterProvider for Permission {
    fn parameters(&self) -> Vec<Parameter> {
        match self {
            Self::Table(p) => p.table.parameters(),
            Self::UserPool(p) => vec![p.user_pool.id_reference().to_parameter()],
            Self::SendMail(p) => vec![p.identity.clone()],
            Self::IamAction(p) => p
                .resources
                .iter()
                .filter_map(|r| match r {
                    IamResource::Literal(_) => None,
                    IamResource::Reference(r) => Some(r.to_parameter()),
                })
                .collect(),
        }
    }
}

impl ParameterProvider for EnvironmentVariable {
    fn parameters(&self) -> Vec<Parameter> {
        match self {
            Self::TableName(v) => v.table.parameters(),
            Self::Parameter(v) => vec![v.parameter.clone()],
            Self::ResourceOutput(v) => vec![v.reference.to_parameter()],
            Self::Coalesced(v) => {
                let mut params = v.first.parameters();
                params.extend(v.second.parameters());
                params
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_table_permission_requires_api_id() {
        let p = Permission::Table(TablePermission {
            table: Table::new("api1", "Notes"),
            actions: vec![TableAction::ReadItem],
        });
        assert_eq!(names(&p.parameters()), vec!["apiapi1GraphQLAPIIdOutput"]);
    }

    #[test]
    fn test_user_pool_permission_requires_pool_id() {
        let p = Permission::UserPool(UserPoolPermission {
            user_pool: UserPool::new("users"),
            actions: vec![UserPoolAction::AdminGetUser],
        });
        assert_eq!(names(&p.parameters()), vec!["authusersUserPoolId"]);
    }

    #[test]
    fn test_send_mail_keeps_default() {
        let p = Permission::SendMail(SendMailPermission {
            identity: Parameter::with_default("mailIdentity", "noreply@example.com"),
        });
        let params = p.parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].default_value.as_deref(), Some("noreply@example.com"));
    }

    #[test]
    fn test_iam_action_only_references() {
        let p = Permission::IamAction(IamActionPermission {
            actions: vec!["s3:GetObject".to_string()],
            resources: vec![
                IamResource::Literal("arn:aws:s3:::a/*".to_string()),
                IamResource::Reference(ResourceOutputReference::new(
                    "storage", "files", "BucketArn",
                )),
            ],
        });
        let params = p.parameters();
        assert_eq!(names(&params), vec!["storagefilesBucketArn"]);
        assert!(params[0].default_value.is_none());
    }

    #[test]
    fn test_coalesced_requires_both_legs() {
        let v = EnvironmentVariable::Coalesced(CoalescedVariable {
            name: "X".to_string(),
            first: ValueSource::Parameter(Parameter::with_default("override", "")),
            second: ValueSource::Reference(ResourceOutputReference::new(
                "api", "myAPI", "GraphQLAPIEndpointOutput",
            )),
        });
        assert_eq!(
            names(&v.parameters()),
            vec!["override", "apimyAPIGraphQLAPIEndpointOutput"]
        );
    }

    #[test]
    fn test_variable_parameters() {
        let table = EnvironmentVariable::TableName(TableNameVariable {
            table: Table::new("myApi", "Todo"),
        });
        assert_eq!(names(&table.parameters()), vec!["apimyApiGraphQLAPIIdOutput"]);

        let param = EnvironmentVariable::Parameter(ParameterVariable {
            name: "STAGE".to_string(),
            parameter: Parameter::new("stage"),
        });
        assert_eq!(names(&param.parameters()), vec!["stage"]);

        let output = EnvironmentVariable::ResourceOutput(ResourceOutputVariable {
            name: "API_ID".to_string(),
            reference: ResourceOutputReference::new("api", "myAPI", "GraphQLAPIIdOutput"),
        });
        assert_eq!(names(&output.parameters()), vec!["apimyAPIGraphQLAPIIdOutput"]);
    }
}
