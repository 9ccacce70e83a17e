//! Reference verification for compiled templates.
//!
//! Every `Ref`, `Fn::Sub` placeholder, and `DependsOn` entry must name a
//! declared parameter, a pseudo parameter (`AWS::*`), or a logical resource.
//! Every `Fn::If` must name a declared condition.

use super::error::{CompileError, CompileResult};
use super::expr::sub_placeholders;
use super::template::Template;
use serde_json::Value;
use std::collections::HashSet;

struct Scope<'a> {
    names: HashSet<&'a str>,
    conditions: HashSet<&'a str>,
}

impl Scope<'_> {
    fn resolves(&self, name: &str) -> bool {
        // `${Resource.Attribute}` resolves through the resource.
        let base = name.split('.').next().unwrap_or(name);
        name.starts_with("AWS::") || self.names.contains(base)
    }
}

/// Check that the template is internally consistent.
pub fn verify_references(template: &Template) -> CompileResult<()> {
    let scope = Scope {
        names: template
            .parameters
            .keys()
            .chain(template.resources.keys())
            .map(String::as_str)
            .collect(),
        conditions: template.conditions.keys().map(String::as_str).collect(),
    };

    for (name, condition) in &template.conditions {
        let value = serde_json::to_value(condition)?;
        check_value(&value, &format!("Conditions.{}", name), &scope)?;
    }

    for (id, resource) in &template.resources {
        let location = format!("Resources.{}", id);
        for dep in &resource.depends_on {
            if !template.resources.contains_key(dep) {
                return Err(CompileError::UnresolvedReference {
                    name: dep.clone(),
                    location: format!("{}.DependsOn", location),
                });
            }
        }
        check_value(&resource.properties, &location, &scope)?;
    }

    for (name, output) in &template.outputs {
        let value = serde_json::to_value(&output.value)?;
        check_value(&value, &format!("Outputs.{}", name), &scope)?;
    }
    Ok(())
}

fn check_value(value: &Value, location: &str, scope: &Scope<'_>) -> CompileResult<()> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("Ref") {
                check_name(name, location, scope)?;
            }
            if let Some(Value::String(template)) = map.get("Fn::Sub") {
                for name in sub_placeholders(template) {
                    check_name(name, location, scope)?;
                }
            }
            if let Some(Value::Array(args)) = map.get("Fn::If") {
                if let Some(Value::String(condition)) = args.first() {
                    if !scope.conditions.contains(condition.as_str()) {
                        return Err(CompileError::UnknownCondition {
                            condition: condition.clone(),
                            location: location.to_string(),
                        });
                    }
                }
            }
            for child in map.values() {
                check_value(child, location, scope)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                check_value(item, location, scope)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_name(name: &str, location: &str, scope: &Scope<'_>) -> CompileResult<()> {
    if scope.resolves(name) {
        Ok(())
    } else {
        Err(CompileError::UnresolvedReference {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::Expr;
    use crate::core::template::{OutputDecl, ParameterDecl, ResourceDecl};
    use serde_json::json;

    fn base() -> Template {
        let mut t = Template::default();
        t.parameters
            .insert("env".to_string(), ParameterDecl::string(None));
        t.conditions.insert(
            "IsNone".to_string(),
            Expr::equals(Expr::reference("env"), "NONE".into()),
        );
        t.resources.insert(
            "Fn".to_string(),
            ResourceDecl::new(
                "AWS::Lambda::Function",
                json!({"FunctionName": {"Fn::If": ["IsNone", "a", {"Ref": "env"}]}}),
            ),
        );
        t
    }

    #[test]
    fn test_consistent_template() {
        let mut t = base();
        t.outputs.insert(
            "Arn".to_string(),
            OutputDecl {
                value: Expr::sub("${Fn.Arn} in ${AWS::Region}"),
            },
        );
        assert_eq!(verify_references(&t), Ok(()));
    }

    #[test]
    fn test_unresolved_ref() {
        let mut t = base();
        t.outputs.insert(
            "Ghost".to_string(),
            OutputDecl {
                value: Expr::reference("ghost"),
            },
        );
        let err = verify_references(&t).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                name: "ghost".to_string(),
                location: "Outputs.Ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_unresolved_sub_placeholder() {
        let mut t = base();
        t.resources.insert(
            "Policy".to_string(),
            ResourceDecl::new("AWS::IAM::Policy", json!({"R": {"Fn::Sub": "${missing}:x"}})),
        );
        let err = verify_references(&t).unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(err.to_string().contains("Resources.Policy"));
    }

    #[test]
    fn test_unknown_condition() {
        let mut t = base();
        t.conditions.clear();
        let err = verify_references(&t).unwrap_err();
        assert!(matches!(err, CompileError::UnknownCondition { .. }));
    }

    #[test]
    fn test_unknown_dependency() {
        let mut t = base();
        t.resources.insert(
            "Mapping".to_string(),
            ResourceDecl::new("AWS::Lambda::EventSourceMapping", json!({})).depends_on(&["Nope"]),
        );
        let err = verify_references(&t).unwrap_err();
        assert!(err.to_string().contains("Resources.Mapping.DependsOn"));
    }
}
