//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer is intentionally tiny – it knows nothing about semantics
//! beyond recognising keywords, identifiers, numeric literals and the
//! single-character punctuators. The whole token sequence is materialised
//! eagerly before parsing begins.

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  KwExit,
  KwLet,
  KwIf,
  Ident,
  IntLit,
  Semi,
  LParen,
  RParen,
  LBrace,
  RBrace,
  Eq,
  Plus,
  Minus,
  Star,
  Slash,
}

impl TokenKind {
  /// Human-friendly description used in diagnostics.
  pub fn describe(self) -> &'static str {
    match self {
      TokenKind::KwExit => "exit",
      TokenKind::KwLet => "let",
      TokenKind::KwIf => "if",
      TokenKind::Ident => "identifier",
      TokenKind::IntLit => "integer literal",
      TokenKind::Semi => ";",
      TokenKind::LParen => "(",
      TokenKind::RParen => ")",
      TokenKind::LBrace => "{",
      TokenKind::RBrace => "}",
      TokenKind::Eq => "=",
      TokenKind::Plus => "+",
      TokenKind::Minus => "-",
      TokenKind::Star => "*",
      TokenKind::Slash => "/",
    }
  }
}

/// Thin wrapper for lexical information needed by later stages. Only
/// identifiers and integer literals carry their source text; literal text
/// is passed through to the assembler verbatim, so the front-end never
/// range-checks numbers.
#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub text: Option<String>,
}

impl Token {
  /// Convenience constructor to keep the `tokenize` loop readable.
  pub fn new(kind: TokenKind) -> Self {
    Self { kind, text: None }
  }

  pub fn with_text(kind: TokenKind, text: impl Into<String>) -> Self {
    Self {
      kind,
      text: Some(text.into()),
    }
  }

  /// Description of this token for diagnostics: the captured text when
  /// present, the kind's fixed spelling otherwise.
  pub fn describe(&self) -> String {
    match &self.text {
      Some(text) => text.clone(),
      None => self.kind.describe().to_string(),
    }
  }
}

/// Lex the input into a flat vector of tokens in a single eager pass.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];

    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if c.is_ascii_alphabetic() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
      }
      let word = &input[start..i];
      tokens.push(match word {
        "exit" => Token::new(TokenKind::KwExit),
        "let" => Token::new(TokenKind::KwLet),
        "if" => Token::new(TokenKind::KwIf),
        _ => Token::with_text(TokenKind::Ident, word),
      });
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::with_text(TokenKind::IntLit, &input[start..i]));
      continue;
    }

    if c == b'#' {
      // Line comment: discard up to, but not including, the next newline.
      // End of input terminates the comment as well.
      while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
      }
      continue;
    }

    let kind = match c {
      b';' => Some(TokenKind::Semi),
      b'(' => Some(TokenKind::LParen),
      b')' => Some(TokenKind::RParen),
      b'{' => Some(TokenKind::LBrace),
      b'}' => Some(TokenKind::RBrace),
      b'=' => Some(TokenKind::Eq),
      b'+' => Some(TokenKind::Plus),
      b'-' => Some(TokenKind::Minus),
      b'*' => Some(TokenKind::Star),
      b'/' => Some(TokenKind::Slash),
      _ => None,
    };

    if let Some(kind) = kind {
      tokens.push(Token::new(kind));
      i += 1;
      continue;
    }

    let invalid_char = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::at(
      input,
      i,
      format!("invalid character '{invalid_char}'"),
    ));
  }

  Ok(tokens)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
      .expect("tokenize failed")
      .into_iter()
      .map(|t| t.kind)
      .collect()
  }

  #[test]
  fn keywords_and_identifiers() {
    assert_eq!(
      kinds("exit let if exits lets"),
      vec![
        TokenKind::KwExit,
        TokenKind::KwLet,
        TokenKind::KwIf,
        TokenKind::Ident,
        TokenKind::Ident,
      ]
    );
  }

  #[test]
  fn identifier_text_is_captured() {
    let tokens = tokenize("abc a1b2").unwrap();
    assert_eq!(tokens[0].text.as_deref(), Some("abc"));
    assert_eq!(tokens[1].text.as_deref(), Some("a1b2"));
  }

  #[test]
  fn integer_literals_keep_their_text() {
    let tokens = tokenize("0 007 123456789012345678901234567890").unwrap();
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_deref().unwrap()).collect();
    assert_eq!(texts, vec!["0", "007", "123456789012345678901234567890"]);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::IntLit));
  }

  #[test]
  fn punctuation() {
    assert_eq!(
      kinds("(){};=+-*/"),
      vec![
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::Semi,
        TokenKind::Eq,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
      ]
    );
  }

  #[test]
  fn comments_run_to_end_of_line() {
    assert_eq!(
      kinds("let x # the rest is ignored ; ) (\n= 1;"),
      vec![
        TokenKind::KwLet,
        TokenKind::Ident,
        TokenKind::Eq,
        TokenKind::IntLit,
        TokenKind::Semi,
      ]
    );
  }

  #[test]
  fn comment_at_end_of_input_without_newline() {
    assert_eq!(kinds("exit # trailing"), vec![TokenKind::KwExit]);
  }

  #[test]
  fn invalid_character_is_a_lexical_error() {
    let err = tokenize("let x = 1;\nexit(x) @").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("invalid character '@'"), "{message}");
    assert!(message.contains("'exit(x) @'"), "{message}");
  }
}
