//! Template assembly — merge provider fragments with the fixed function skeleton.
//!
//! 1. Parameters: first-occurrence union of every fragment's parameters,
//!    then the fixed `env` and `resourceName` parameters
//! 2. Conditions: every fragment's conditions, then the env sentinel condition
//! 3. Resources: function, execution role, execution policy
//! 4. Environment: fixed ENV/REGION entries, then one entry per variable
//! 5. Event source: trigger policy and event-source mapping
//! 6. Outputs: function name, ARN, region, role
//!
//! Mapping sections are later-wins on key collision, except where two
//! different fragments would collapse into one entry, which is an error.

use super::error::{CompileError, CompileResult};
use super::expr::Expr;
use super::template::*;
use super::types::*;
use super::verify::verify_references;
use crate::providers::expression::table_stream_arn;
use crate::providers::{ConditionProvider, ParameterProvider, PolicyProvider, VariableProvider};
use indexmap::IndexMap;
use serde_json::json;
use std::collections::HashMap;

/// Parameter holding the environment name.
pub const ENV_PARAMETER: &str = "env";

/// Parameter holding the function's base name.
pub const RESOURCE_NAME_PARAMETER: &str = "resourceName";

/// Environment name that disables env suffixing.
pub const NO_ENV_SENTINEL: &str = "NONE";

/// Condition true when deploying without an environment.
pub const NO_ENV_CONDITION: &str = "ShouldNotCreateEnvResources";

pub const FUNCTION_ID: &str = "LambdaFunction";
pub const ROLE_ID: &str = "LambdaExecutionRole";
pub const POLICY_ID: &str = "LambdaExecutionPolicy";

/// Log-write actions granted on the function's own log group.
const LOG_ACTIONS: [&str; 3] = [
    "logs:CreateLogGroup",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];

/// Change-stream actions granted by the trigger policy.
const STREAM_ACTIONS: [&str; 4] = [
    "dynamodb:DescribeStream",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:ListStreams",
];

/// Compile a definition file's contents.
pub fn compile_definition(def: &FunctionDefinition) -> CompileResult<Template> {
    compile(&def.name, &def.function, &def.settings)
}

/// Compile one function into a complete template.
pub fn compile(
    name: &str,
    function: &LambdaFunction,
    settings: &FunctionSettings,
) -> CompileResult<Template> {
    check_actions(function)?;
    let parameters = collect_parameters(name, function)?;
    let conditions = collect_conditions(function)?;

    let mut resources = IndexMap::new();
    resources.insert(
        FUNCTION_ID.to_string(),
        function_resource(function, settings),
    );
    resources.insert(ROLE_ID.to_string(), role_resource());
    resources.insert(POLICY_ID.to_string(), execution_policy(function));
    if let Some(table) = &function.event_source {
        let (policy_id, policy) = trigger_policy(table);
        let (mapping_id, mapping) = event_source_mapping(table, &policy_id);
        resources.insert(policy_id, policy);
        resources.insert(mapping_id, mapping);
    }

    let template = Template {
        parameters,
        conditions,
        resources,
        outputs: outputs(),
    };
    verify_references(&template)?;

    tracing::debug!(
        function = name,
        parameters = template.parameters.len(),
        conditions = template.conditions.len(),
        resources = template.resources.len(),
        "compiled template"
    );
    Ok(template)
}

/// Every action-bearing permission must grant at least one action.
fn check_actions(function: &LambdaFunction) -> CompileResult<()> {
    for (i, permission) in function.permissions.iter().enumerate() {
        let empty = match permission {
            Permission::Table(p) => p.actions.is_empty(),
            Permission::UserPool(p) => p.actions.is_empty(),
            Permission::IamAction(p) => p.actions.is_empty(),
            Permission::SendMail(_) => false,
        };
        if empty {
            return Err(CompileError::EmptyActions {
                permission: format!("permission #{} ({})", i + 1, permission.kind()),
            });
        }
    }
    Ok(())
}

/// Union of all required parameters in first-occurrence order, plus the fixed ones.
/// A name declared twice with different defaults keeps its first position and
/// takes the later default.
fn collect_parameters(
    name: &str,
    function: &LambdaFunction,
) -> CompileResult<IndexMap<String, ParameterDecl>> {
    let required = function
        .permissions
        .iter()
        .flat_map(|p| p.parameters())
        .chain(function.environment.iter().flat_map(|v| v.parameters()))
        .chain(function.event_source.iter().flat_map(|t| t.parameters()));

    let mut unique: Vec<Parameter> = Vec::new();
    for param in required {
        if !unique.contains(&param) {
            unique.push(param);
        }
    }

    check_reference_names(function)?;

    let mut parameters: IndexMap<String, ParameterDecl> = IndexMap::new();
    for param in unique {
        if let Some(existing) = parameters.get(&param.name) {
            tracing::warn!(
                parameter = %param.name,
                first = ?existing.default,
                second = ?param.default_value,
                "parameter redeclared with a different default, later wins"
            );
        }
        parameters.insert(param.name, ParameterDecl::string(param.default_value));
    }

    for (fixed, default) in [
        (ENV_PARAMETER, None),
        (RESOURCE_NAME_PARAMETER, Some(name.to_string())),
    ] {
        if parameters
            .insert(fixed.to_string(), ParameterDecl::string(default))
            .is_some()
        {
            tracing::warn!(parameter = fixed, "fixed parameter overrides declared parameter");
        }
    }
    Ok(parameters)
}

/// Distinct references must derive distinct parameter names.
fn check_reference_names(function: &LambdaFunction) -> CompileResult<()> {
    let mut by_name: HashMap<String, ResourceOutputReference> = HashMap::new();
    for reference in super::dependencies::discover_references(function) {
        let parameter = reference.parameter_name();
        match by_name.get(&parameter) {
            Some(existing) if *existing != reference => {
                return Err(CompileError::ParameterNameCollision {
                    parameter,
                    first: existing.key(),
                    second: reference.key(),
                });
            }
            Some(_) => {}
            None => {
                by_name.insert(parameter, reference);
            }
        }
    }
    Ok(())
}

/// Conditions from permissions and variables, then the sentinel condition.
fn collect_conditions(function: &LambdaFunction) -> CompileResult<IndexMap<String, Expr>> {
    let mut conditions: IndexMap<String, Expr> = IndexMap::new();
    for permission in &function.permissions {
        conditions.extend(permission.conditions());
    }

    let mut owners: HashMap<String, &EnvironmentVariable> = HashMap::new();
    for variable in &function.environment {
        for (condition, expr) in variable.conditions() {
            match owners.get(&condition) {
                Some(owner) if *owner != variable => {
                    return Err(CompileError::ConditionCollision {
                        condition,
                        variable: variable.name(),
                    });
                }
                _ => {
                    owners.insert(condition.clone(), variable);
                    conditions.insert(condition, expr);
                }
            }
        }
    }

    conditions.insert(
        NO_ENV_CONDITION.to_string(),
        Expr::equals(Expr::reference(ENV_PARAMETER), Expr::literal(NO_ENV_SENTINEL)),
    );
    Ok(conditions)
}

/// `base` when the sentinel condition holds, otherwise `base-<env>`.
fn env_scoped(base: Expr) -> Expr {
    Expr::if_then_else(
        NO_ENV_CONDITION,
        base.clone(),
        Expr::join(
            "",
            vec![base, Expr::literal("-"), Expr::reference(ENV_PARAMETER)],
        ),
    )
}

fn environment_variables(function: &LambdaFunction) -> IndexMap<String, Expr> {
    let mut variables: IndexMap<String, Expr> = IndexMap::new();
    variables.insert("ENV".to_string(), Expr::reference(ENV_PARAMETER));
    variables.insert("REGION".to_string(), Expr::region());
    for variable in &function.environment {
        let (name, value) = variable.variable();
        if variables.get(&name).is_some_and(|previous| *previous != value) {
            tracing::warn!(variable = %name, "environment variable overwritten by later entry");
        }
        variables.insert(name, value);
    }
    variables
}

fn function_resource(function: &LambdaFunction, settings: &FunctionSettings) -> ResourceDecl {
    let mut properties = json!({
        "Handler": settings.handler,
        "FunctionName": env_scoped(Expr::reference(RESOURCE_NAME_PARAMETER)),
        "Environment": { "Variables": environment_variables(function) },
        "Role": Expr::get_att(ROLE_ID, "Arn"),
        "Runtime": settings.runtime,
        "Timeout": settings.timeout,
    });
    if let Some(memory) = settings.memory_size {
        properties["MemorySize"] = json!(memory);
    }
    if let Some(code) = &settings.code {
        properties["Code"] = json!({ "S3Bucket": code.s3_bucket, "S3Key": code.s3_key });
    }
    ResourceDecl::new("AWS::Lambda::Function", properties)
}

fn role_resource() -> ResourceDecl {
    let trust = PolicyDocument::new(vec![PolicyStatement {
        effect: "Allow".to_string(),
        principal: Some(Principal {
            service: vec!["lambda.amazonaws.com".to_string()],
        }),
        action: vec!["sts:AssumeRole".to_string()],
        resource: Vec::new(),
    }]);
    let role_name = Expr::join(
        "",
        vec![
            Expr::reference(RESOURCE_NAME_PARAMETER),
            Expr::literal("LambdaRole"),
        ],
    );
    ResourceDecl::new(
        "AWS::IAM::Role",
        json!({
            "RoleName": env_scoped(role_name),
            "AssumeRolePolicyDocument": trust,
        }),
    )
}

fn execution_policy(function: &LambdaFunction) -> ResourceDecl {
    let logs = PolicyStatement::allow(
        LOG_ACTIONS.iter().map(|a| a.to_string()).collect(),
        vec![Expr::sub(&format!(
            "arn:aws:logs:${{AWS::Region}}:${{AWS::AccountId}}:log-group:/aws/lambda/${{{}}}:log-stream:*",
            FUNCTION_ID
        ))],
    );
    let mut statements = vec![logs];
    statements.extend(function.permissions.iter().map(|p| p.policy_statement()));

    ResourceDecl::new(
        "AWS::IAM::Policy",
        json!({
            "PolicyName": "lambda-execution-policy",
            "Roles": [Expr::reference(ROLE_ID)],
            "PolicyDocument": PolicyDocument::new(statements),
        }),
    )
    .depends_on(&[ROLE_ID])
}

fn trigger_policy(table: &Table) -> (String, ResourceDecl) {
    let statement = PolicyStatement::allow(
        STREAM_ACTIONS.iter().map(|a| a.to_string()).collect(),
        vec![table_stream_arn(table)],
    );
    let policy = ResourceDecl::new(
        "AWS::IAM::Policy",
        json!({
            "PolicyName": format!("lambda-trigger-policy-{}", table.table_name),
            "Roles": [Expr::reference(ROLE_ID)],
            "PolicyDocument": PolicyDocument::new(vec![statement]),
        }),
    )
    .depends_on(&[ROLE_ID]);
    (format!("LambdaTriggerPolicy{}", table.table_name), policy)
}

fn event_source_mapping(table: &Table, trigger_policy_id: &str) -> (String, ResourceDecl) {
    let mapping = ResourceDecl::new(
        "AWS::Lambda::EventSourceMapping",
        json!({
            "BatchSize": 1,
            "Enabled": true,
            "EventSourceArn": table_stream_arn(table),
            "FunctionName": Expr::get_att(FUNCTION_ID, "Arn"),
            "StartingPosition": "LATEST",
            "MaximumBatchingWindowInSeconds": 1,
        }),
    )
    .depends_on(&[trigger_policy_id, ROLE_ID]);
    (format!("LambdaEventSourceMapping{}", table.table_name), mapping)
}

fn outputs() -> IndexMap<String, OutputDecl> {
    [
        ("Name", Expr::reference(FUNCTION_ID)),
        ("Arn", Expr::get_att(FUNCTION_ID, "Arn")),
        ("Region", Expr::region()),
        ("LambdaExecutionRole", Expr::reference(ROLE_ID)),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), OutputDecl { value }))
    .collect()
}
