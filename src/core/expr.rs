//! Template expressions — literals and the intrinsic functions the compiler emits.
//!
//! Serializes to the platform's intrinsic shapes (`{"Ref": ..}`,
//! `{"Fn::If": [..]}`) and parses them back, so a compiled document can be
//! re-read without loss.

use serde::{Deserialize, Serialize};

/// Pseudo parameter holding the deployment region.
pub const REGION: &str = "AWS::Region";

/// Pseudo parameter holding the deploying account id.
pub const ACCOUNT_ID: &str = "AWS::AccountId";

/// A value in the template: a literal string or an intrinsic function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    Literal(String),
    Intrinsic(Box<Intrinsic>),
}

/// Intrinsic functions, externally tagged by their template names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intrinsic {
    /// Value of a parameter, pseudo parameter, or logical resource
    #[serde(rename = "Ref")]
    Ref(String),

    /// `(condition, when_true, when_false)`
    #[serde(rename = "Fn::If")]
    If(String, Expr, Expr),

    #[serde(rename = "Fn::Equals")]
    Equals(Expr, Expr),

    /// Always a single-element list
    #[serde(rename = "Fn::Not")]
    Not(Vec<Expr>),

    /// Value exported by another stack
    #[serde(rename = "Fn::ImportValue")]
    ImportValue(Expr),

    /// `${Name}` substitution template
    #[serde(rename = "Fn::Sub")]
    Sub(String),

    #[serde(rename = "Fn::Join")]
    Join(String, Vec<Expr>),

    /// `(logical_id, attribute)`
    #[serde(rename = "Fn::GetAtt")]
    GetAtt(String, String),
}

impl Expr {
    pub fn literal(s: &str) -> Self {
        Self::Literal(s.to_string())
    }

    fn intrinsic(i: Intrinsic) -> Self {
        Self::Intrinsic(Box::new(i))
    }

    pub fn reference(name: &str) -> Self {
        Self::intrinsic(Intrinsic::Ref(name.to_string()))
    }

    pub fn if_then_else(condition: &str, when_true: Expr, when_false: Expr) -> Self {
        Self::intrinsic(Intrinsic::If(condition.to_string(), when_true, when_false))
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Self::intrinsic(Intrinsic::Equals(left, right))
    }

    pub fn not(condition: Expr) -> Self {
        Self::intrinsic(Intrinsic::Not(vec![condition]))
    }

    pub fn import_value(name: Expr) -> Self {
        Self::intrinsic(Intrinsic::ImportValue(name))
    }

    pub fn sub(template: &str) -> Self {
        Self::intrinsic(Intrinsic::Sub(template.to_string()))
    }

    pub fn join(delimiter: &str, parts: Vec<Expr>) -> Self {
        Self::intrinsic(Intrinsic::Join(delimiter.to_string(), parts))
    }

    pub fn get_att(logical_id: &str, attribute: &str) -> Self {
        Self::intrinsic(Intrinsic::GetAtt(logical_id.to_string(), attribute.to_string()))
    }

    /// `Ref AWS::Region`
    pub fn region() -> Self {
        Self::reference(REGION)
    }

    /// `Ref AWS::AccountId`
    pub fn account_id() -> Self {
        Self::reference(ACCOUNT_ID)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Self::literal(s)
    }
}

/// Names substituted by a `Fn::Sub` template (`${Name}`; `${!x}` is an escape).
pub fn sub_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find("${") {
        let after = &rest[open + 2..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !name.starts_with('!') {
            names.push(name);
        }
        rest = &after[close + 1..];
    }
    names
}
