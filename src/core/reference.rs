//! Output references — the naming contract for cross-stack values.
//!
//! Every reference is threaded into the template as a parameter named
//! `category + resource + output`. The external registry re-imports values
//! by these names, so the derivations here must not change.

use super::types::{Parameter, ResourceOutputReference, Table, UserPool};

/// Category of API stacks hosting tables.
pub const API_CATEGORY: &str = "api";

/// Category of identity pools.
pub const AUTH_CATEGORY: &str = "auth";

/// Output exported by every API stack.
pub const API_ID_OUTPUT: &str = "GraphQLAPIIdOutput";

/// Output exported by every identity pool stack.
pub const USER_POOL_ID_OUTPUT: &str = "UserPoolId";

impl ResourceOutputReference {
    pub fn new(category: &str, resource: &str, output: &str) -> Self {
        Self {
            category: category.to_string(),
            resource: resource.to_string(),
            output: output.to_string(),
        }
    }

    /// Template parameter carrying this output (no separator).
    pub fn parameter_name(&self) -> String {
        format!("{}{}{}", self.category, self.resource, self.output)
    }

    /// Deduplication key: `category-resource-output`.
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.category, self.resource, self.output)
    }

    /// Grouping key: `category-resource`.
    pub fn group_key(&self) -> String {
        format!("{}-{}", self.category, self.resource)
    }

    /// The parameter declaration this reference requires.
    pub fn to_parameter(&self) -> Parameter {
        Parameter::new(&self.parameter_name())
    }
}

impl Parameter {
    /// A parameter without default value.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_value: None,
        }
    }

    pub fn with_default(name: &str, default_value: &str) -> Self {
        Self {
            name: name.to_string(),
            default_value: Some(default_value.to_string()),
        }
    }
}

impl Table {
    pub fn new(api_name: &str, table_name: &str) -> Self {
        Self {
            api_name: api_name.to_string(),
            table_name: table_name.to_string(),
        }
    }

    /// The owning API's id output.
    pub fn output_reference(&self) -> ResourceOutputReference {
        ResourceOutputReference::new(API_CATEGORY, &self.api_name, API_ID_OUTPUT)
    }

    /// Logical id of the table inside the API stack (`<Name>Table`).
    pub fn logical_id(&self) -> String {
        format!("{}Table", self.table_name)
    }
}

impl UserPool {
    pub fn new(auth_name: &str) -> Self {
        Self {
            auth_name: auth_name.to_string(),
        }
    }

    pub fn output_reference(&self, output: &str) -> ResourceOutputReference {
        ResourceOutputReference::new(AUTH_CATEGORY, &self.auth_name, output)
    }

    /// Reference to the pool id output.
    pub fn id_reference(&self) -> ResourceOutputReference {
        self.output_reference(USER_POOL_ID_OUTPUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_reference() {
        let t = Table::new("myApi", "Todo");
        let r = t.output_reference();
        assert_eq!(r.category, "api");
        assert_eq!(r.resource, "myApi");
        assert_eq!(r.output, "GraphQLAPIIdOutput");
        assert_eq!(r.parameter_name(), "apimyApiGraphQLAPIIdOutput");
        assert_eq!(t.logical_id(), "TodoTable");
    }

    #[test]
    fn test_user_pool_reference() {
        let pool = UserPool::new("users");
        assert_eq!(pool.id_reference().parameter_name(), "authusersUserPoolId");
        assert_eq!(
            pool.output_reference("AppClientID").key(),
            "auth-users-AppClientID"
        );
    }

    #[test]
    fn test_reference_keys() {
        let r = ResourceOutputReference::new("api", "myAPI", "GraphQLAPIIdOutput");
        assert_eq!(r.key(), "api-myAPI-GraphQLAPIIdOutput");
        assert_eq!(r.group_key(), "api-myAPI");
        assert_eq!(r.to_string(), r.key());
        assert_eq!(r.to_parameter(), Parameter::new("apimyAPIGraphQLAPIIdOutput"));
    }

    #[test]
    fn test_structural_equality() {
        let a = Table::new("api1", "Notes").output_reference();
        let b = Table::new("api1", "Other").output_reference();
        assert_eq!(a, b);
    }
}
