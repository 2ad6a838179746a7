//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and builds the arena-backed AST.
//! - `codegen` lowers the program into NASM assembly for one of two targets.
//! - `error` centralises reporting utilities shared by the other modules.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use codegen::{ALL_TARGETS, Target, X86_64_LINUX, X86_LINUX};
pub use error::{CompileError, CompileResult};

/// Compile a source string into NASM assembly for the given target.
pub fn compile(source: &str, target: &Target) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(source)?;
  let program = parser::parse(tokens)?;
  codegen::generate(&program, target)
}
