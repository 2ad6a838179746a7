//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose – lexical errors point at
//! the offending byte with a caret, while parser and code generation
//! errors are plain messages since tokens carry no position metadata.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  /// Lexical error anchored at a byte offset in the source.
  #[snafu(display("{source_line}\n{marker} {message}"))]
  Lexical {
    source_line: String,
    marker: String,
    message: String,
  },

  /// The parser found a token other than the one the grammar requires.
  #[snafu(display("expected {expected}, but got \"{found}\""))]
  UnexpectedToken { expected: String, found: String },

  /// The token stream ran out mid-production.
  #[snafu(display("unexpected end of input, expected {expected}"))]
  UnexpectedEof { expected: String },

  /// A `let` re-used a name that is visible in the active scope chain.
  #[snafu(display("identifier '{name}' is already declared"))]
  DuplicateIdentifier { name: String },

  /// An expression referenced a name with no visible declaration.
  #[snafu(display("undeclared identifier '{name}'"))]
  UndeclaredIdentifier { name: String },
}

impl CompileError {
  /// Construct a lexical error anchored at a specific byte offset,
  /// quoting the source line it falls on.
  pub fn at(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let safe_loc = loc.min(source.len());
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |i| safe_loc + i);
    let column = source[line_start..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(column));
    Self::Lexical {
      source_line: format!("'{}'", &source[line_start..line_end]),
      marker,
      message: message.into(),
    }
  }
}
