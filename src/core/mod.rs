//! Core compiler — model, parsing, expressions, assembly, verification.

pub mod assembler;
pub mod dependencies;
pub mod error;
pub mod expr;
pub mod parser;
pub mod reference;
pub mod template;
pub mod types;
pub mod verify;

pub use assembler::{compile, compile_definition};
pub use error::{CompileError, CompileResult};
pub use template::Template;
