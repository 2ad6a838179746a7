//! Recursive-descent parser producing the arena-backed syntax tree.
//!
//! Statements are parsed by dispatching on a single token of lookahead,
//! with no backtracking. Expressions use precedence climbing: a threaded
//! minimum-precedence parameter enforces both operator precedence and
//! left-associativity, so the statement layer stays free of expression
//! grammar details.

use crate::ast::{Ast, BinOp, Expr, ExprId, Program, Scope, ScopeId, Stmt, StmtId};
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind};

/// Binding power of a binary operator token, or `None` for anything that
/// cannot continue an expression.
fn bin_prec(kind: TokenKind) -> Option<u8> {
  match kind {
    TokenKind::Plus | TokenKind::Minus => Some(0),
    TokenKind::Star | TokenKind::Slash => Some(1),
    _ => None,
  }
}

/// Parse the token sequence into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> CompileResult<Program> {
  let mut parser = Parser {
    stream: TokenStream::new(tokens),
    ast: Ast::new(),
  };

  let mut stmts = Vec::new();
  while parser.stream.peek().is_some() {
    stmts.push(parser.parse_stmt()?);
  }

  Ok(Program {
    ast: parser.ast,
    stmts,
  })
}

struct Parser {
  stream: TokenStream,
  ast: Ast,
}

impl Parser {
  fn parse_stmt(&mut self) -> CompileResult<StmtId> {
    let Some(kind) = self.stream.peek().map(|token| token.kind) else {
      return Err(CompileError::UnexpectedEof {
        expected: "a statement".to_string(),
      });
    };

    match kind {
      TokenKind::KwExit => {
        self.stream.advance();
        self.stream.expect(TokenKind::LParen, "'('")?;
        let expr = self.parse_expr(0)?;
        self.stream.expect(TokenKind::RParen, "')'")?;
        self.stream.expect(TokenKind::Semi, "';'")?;
        Ok(self.ast.alloc_stmt(Stmt::Exit(expr)))
      }
      TokenKind::KwLet => {
        self.stream.advance();
        let name = self.stream.take_text(TokenKind::Ident, "an identifier")?;
        self.stream.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr(0)?;
        self.stream.expect(TokenKind::Semi, "';'")?;
        Ok(self.ast.alloc_stmt(Stmt::Let { name, value }))
      }
      TokenKind::KwIf => {
        self.stream.advance();
        // Parentheses around the condition are optional, but an opening
        // parenthesis commits us to a closing one.
        let open_paren = self.stream.eat(TokenKind::LParen).is_some();
        let cond = self.parse_expr(0)?;
        if open_paren {
          self.stream.expect(TokenKind::RParen, "')'")?;
        }
        let body = self.parse_scope()?;
        Ok(self.ast.alloc_stmt(Stmt::If { cond, body }))
      }
      TokenKind::LBrace => {
        let scope = self.parse_scope()?;
        Ok(self.ast.alloc_stmt(Stmt::Block(scope)))
      }
      _ => Err(self.stream.unexpected("a statement")),
    }
  }

  fn parse_scope(&mut self) -> CompileResult<ScopeId> {
    self.stream.expect(TokenKind::LBrace, "'{'")?;

    let mut scope = Scope::default();
    while let Some(token) = self.stream.peek() {
      if token.kind == TokenKind::RBrace {
        break;
      }
      scope.stmts.push(self.parse_stmt()?);
    }

    self.stream.expect(TokenKind::RBrace, "'}'")?;
    Ok(self.ast.alloc_scope(scope))
  }

  /// Precedence climbing: parse a term as the initial left operand, then
  /// keep folding in operators whose precedence is at least `min_prec`.
  /// The right-hand side is parsed with `min_prec` one above the operator,
  /// which is what makes every operator left-associative.
  fn parse_expr(&mut self, min_prec: u8) -> CompileResult<ExprId> {
    let mut lhs = self.parse_term()?;

    loop {
      let Some(op_kind) = self.stream.peek().map(|token| token.kind) else {
        break;
      };
      let Some(prec) = bin_prec(op_kind) else {
        break;
      };
      if prec < min_prec {
        break;
      }

      self.stream.advance();
      let rhs = self.parse_expr(prec + 1)?;
      let op = match op_kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        _ => unreachable!("bin_prec only accepts operator tokens"),
      };
      lhs = self.ast.alloc_expr(Expr::Binary { op, lhs, rhs });
    }

    Ok(lhs)
  }

  fn parse_term(&mut self) -> CompileResult<ExprId> {
    let Some(kind) = self.stream.peek().map(|token| token.kind) else {
      return Err(CompileError::UnexpectedEof {
        expected: "an expression".to_string(),
      });
    };

    match kind {
      TokenKind::IntLit => {
        let text = self.stream.take_text(TokenKind::IntLit, "an integer")?;
        Ok(self.ast.alloc_expr(Expr::IntLit(text)))
      }
      TokenKind::Ident => {
        let name = self.stream.take_text(TokenKind::Ident, "an identifier")?;
        Ok(self.ast.alloc_expr(Expr::Ident(name)))
      }
      TokenKind::LParen => {
        self.stream.advance();
        let inner = self.parse_expr(0)?;
        self.stream.expect(TokenKind::RParen, "')'")?;
        Ok(self.ast.alloc_expr(Expr::Paren(inner)))
      }
      _ => Err(self.stream.unexpected("an expression")),
    }
  }
}

/// Lightweight cursor over the token vector.
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
}

impl TokenStream {
  /// Take ownership of the token vector; the parser advances `pos` as it
  /// consumes input.
  fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, pos: 0 }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn advance(&mut self) {
    self.pos += 1;
  }

  /// Consume and return the current token if it has the given kind.
  fn eat(&mut self, kind: TokenKind) -> Option<Token> {
    if self.peek().map(|token| token.kind) == Some(kind) {
      let token = self.tokens[self.pos].clone();
      self.pos += 1;
      return Some(token);
    }
    None
  }

  /// Consume a token of the given kind or fail with a diagnostic naming
  /// what the grammar required.
  fn expect(&mut self, kind: TokenKind, expected: &str) -> CompileResult<Token> {
    match self.eat(kind) {
      Some(token) => Ok(token),
      None => Err(self.unexpected(expected)),
    }
  }

  /// Consume a token of the given kind and return its captured text.
  fn take_text(&mut self, kind: TokenKind, expected: &str) -> CompileResult<String> {
    let token = self.expect(kind, expected)?;
    match token.text {
      Some(text) => Ok(text),
      None => Err(CompileError::UnexpectedToken {
        expected: expected.to_string(),
        found: token.describe(),
      }),
    }
  }

  /// Diagnostic for the current token not being what the grammar requires.
  fn unexpected(&self, expected: &str) -> CompileError {
    match self.peek() {
      Some(token) => CompileError::UnexpectedToken {
        expected: expected.to_string(),
        found: token.describe(),
      },
      None => CompileError::UnexpectedEof {
        expected: expected.to_string(),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokenizer::tokenize;

  fn parse_source(source: &str) -> Program {
    parse(tokenize(source).expect("tokenize failed")).expect("parse failed")
  }

  /// Render an expression with explicit grouping so tests can assert on
  /// the exact tree shape.
  fn render(ast: &Ast, id: ExprId) -> String {
    match ast.expr(id) {
      Expr::IntLit(text) => text.clone(),
      Expr::Ident(name) => name.clone(),
      Expr::Paren(inner) => format!("[{}]", render(ast, *inner)),
      Expr::Binary { op, lhs, rhs } => {
        let symbol = match op {
          BinOp::Add => "+",
          BinOp::Sub => "-",
          BinOp::Mul => "*",
          BinOp::Div => "/",
        };
        format!("({} {} {})", render(ast, *lhs), symbol, render(ast, *rhs))
      }
    }
  }

  fn exit_expr(program: &Program) -> String {
    let Stmt::Exit(expr) = program.ast.stmt(program.stmts[0]) else {
      panic!("first statement is not exit");
    };
    render(&program.ast, *expr)
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let program = parse_source("exit(1 + 2 * 3);");
    assert_eq!(exit_expr(&program), "(1 + (2 * 3))");
  }

  #[test]
  fn subtraction_is_left_associative() {
    let program = parse_source("exit(10 - 2 - 3);");
    assert_eq!(exit_expr(&program), "((10 - 2) - 3)");
  }

  #[test]
  fn parentheses_override_precedence() {
    let program = parse_source("exit((1 + 2) * 3);");
    assert_eq!(exit_expr(&program), "([(1 + 2)] * 3)");
  }

  #[test]
  fn division_is_left_associative() {
    let program = parse_source("exit(100 / 5 / 2);");
    assert_eq!(exit_expr(&program), "((100 / 5) / 2)");
  }

  #[test]
  fn let_statement_captures_name_and_value() {
    let program = parse_source("let answer = 6 * 7;");
    let Stmt::Let { name, value } = program.ast.stmt(program.stmts[0]) else {
      panic!("expected let");
    };
    assert_eq!(name, "answer");
    assert_eq!(render(&program.ast, *value), "(6 * 7)");
  }

  #[test]
  fn if_condition_parens_are_optional() {
    for source in ["if (x) { exit(1); }", "if x { exit(1); }"] {
      let program = parse_source(source);
      let Stmt::If { cond, body } = program.ast.stmt(program.stmts[0]) else {
        panic!("expected if");
      };
      assert_eq!(render(&program.ast, *cond), "x");
      assert_eq!(program.ast.scope(*body).stmts.len(), 1);
    }
  }

  #[test]
  fn if_with_open_paren_requires_close_paren() {
    let err = parse(tokenize("if (x { exit(1); }").unwrap()).unwrap_err();
    assert!(matches!(err, CompileError::UnexpectedToken { .. }), "{err:?}");
  }

  #[test]
  fn bare_scopes_nest() {
    let program = parse_source("{ let x = 1; { exit(x); } }");
    let Stmt::Block(outer) = program.ast.stmt(program.stmts[0]) else {
      panic!("expected block");
    };
    let outer = program.ast.scope(*outer);
    assert_eq!(outer.stmts.len(), 2);
    assert!(matches!(program.ast.stmt(outer.stmts[1]), Stmt::Block(_)));
  }

  #[test]
  fn missing_semicolon_is_a_syntax_error() {
    let err = parse(tokenize("exit(1)").unwrap()).unwrap_err();
    assert_eq!(err.to_string(), "unexpected end of input, expected ';'");
  }

  #[test]
  fn stray_token_at_statement_position() {
    let err = parse(tokenize("= 1;").unwrap()).unwrap_err();
    assert_eq!(err.to_string(), "expected a statement, but got \"=\"");
  }

  #[test]
  fn unterminated_scope() {
    let err = parse(tokenize("{ exit(1);").unwrap()).unwrap_err();
    assert!(matches!(err, CompileError::UnexpectedEof { .. }), "{err:?}");
  }
}
