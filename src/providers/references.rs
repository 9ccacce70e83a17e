//! Reference discovery — external outputs a fragment touches.
//!
//! Feeds registry bookkeeping; the assembler itself never needs it.

use crate::core::types::*;

pub trait ReferenceProvider {
    fn references(&self) -> Vec<ResourceOutputReference>;
}

impl ReferenceProvider for Table {
    fn references(&self) -> Vec<ResourceOutputReference> {
        vec![self.output_reference()]
    }
}

impl ReferenceProvider for ValueSource {
    fn references(&self) -> Vec<ResourceOutputReference> {
        match self {
            Self::Parameter(_) => Vec::new(),
            Self::Reference(r) => vec![r.clone()],
        }
    }
}

impl ReferenceProvider for Permission {
    fn references(&self) -> Vec<ResourceOutputReference> {
        match self {
            Self::Table(p) => p.table.references(),
            Self::UserPool(p) => vec![p.user_pool.id_reference()],
            Self::SendMail(_) => Vec::new(),
            Self::IamAction(p) => p
                .resources
                .iter()
                .filter_map(|r| match r {
                    IamResource::Literal(_) => None,
                    IamResource::Reference(r) => Some(r.clone()),
                })
                .collect(),
        }
    }
}

impl ReferenceProvider for EnvironmentVariable {
    fn references(&self) -> Vec<ResourceOutputReference> {
        match self {
            Self::TableName(v) => v.table.references(),
            Self::Parameter(_) => Vec::new(),
            Self::ResourceOutput(v) => vec![v.reference.clone()],
            Self::Coalesced(v) => {
                let mut refs = v.first.references();
                refs.extend(v.second.references());
                refs
            }
        }
    }
}
