//! Registry bookkeeping — which external resources a function depends on.
//!
//! Produces the `dependsOn` list the backend registry stores for a function:
//! one entry per `category-resource`, listing the outputs it consumes.

use super::types::{LambdaFunction, ResourceOutputReference};
use crate::providers::ReferenceProvider;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One external resource and the outputs read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub category: String,
    pub resource_name: String,
    pub attributes: Vec<String>,
}

/// Every distinct reference the function touches, in first-occurrence order.
pub fn discover_references(function: &LambdaFunction) -> Vec<ResourceOutputReference> {
    let all = function
        .permissions
        .iter()
        .flat_map(|p| p.references())
        .chain(function.environment.iter().flat_map(|v| v.references()))
        .chain(function.event_source.iter().flat_map(|t| t.references()));

    let mut unique: IndexMap<String, ResourceOutputReference> = IndexMap::new();
    for reference in all {
        unique.entry(reference.key()).or_insert(reference);
    }
    unique.into_values().collect()
}

/// References grouped by `category-resource`.
pub fn dependencies(function: &LambdaFunction) -> Vec<Dependency> {
    let mut groups: IndexMap<String, Dependency> = IndexMap::new();
    for reference in discover_references(function) {
        let entry = groups
            .entry(reference.group_key())
            .or_insert_with(|| Dependency {
                category: reference.category.clone(),
                resource_name: reference.resource.clone(),
                attributes: Vec::new(),
            });
        entry.attributes.push(reference.output);
    }
    groups.into_values().collect()
}
