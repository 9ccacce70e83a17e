//! Capability providers — one trait per template concern.
//!
//! Each trait is implemented for the closed permission and variable enums by
//! an exhaustive `match`, so a new variant does not compile until every
//! concern handles it:
//! 1. parameters — free parameters a fragment needs declared
//! 2. expression — how parameters and references are read at deploy time
//! 3. policy — the access-control statement a permission grants
//! 4. conditions — guard conditions a variable needs
//! 5. references — external outputs a fragment touches
//! 6. variables — the environment entry a variable produces

pub mod conditions;
pub mod expression;
pub mod parameters;
pub mod policy;
pub mod references;
pub mod variables;

pub use conditions::ConditionProvider;
pub use expression::RuntimeExpression;
pub use parameters::ParameterProvider;
pub use policy::PolicyProvider;
pub use references::ReferenceProvider;
pub use variables::VariableProvider;
