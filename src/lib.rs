//! lambdagen — serverless function templates from declarative dependencies.
//!
//! A function definition lists the tables, identity pools, mail identities,
//! and raw IAM grants a function needs plus the environment variables it
//! reads. The compiler lowers it into one self-consistent template where
//! every cross-stack value is threaded through a deterministic parameter.

pub mod cli;
pub mod core;
pub mod providers;
