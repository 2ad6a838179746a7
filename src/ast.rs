//! Syntax tree definitions and the arena that owns every node.
//!
//! Nodes live in per-kind backing vectors inside [`Ast`] and reference
//! each other through plain index handles. Nothing is ever freed
//! individually – the whole arena drops with the [`Program`] once the
//! compilation is over. Handles are trivially copyable, which keeps the
//! tree cheap to walk and easy to assert on in tests.

/// Handle to an [`Expr`] stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprId(usize);

/// Handle to a [`Stmt`] stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StmtId(usize);

/// Handle to a [`Scope`] stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
}

/// Expression tree produced by the parser.
///
/// Integer literals keep their source text; the emitter writes it into
/// the assembly verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  IntLit(String),
  Ident(String),
  Paren(ExprId),
  Binary {
    op: BinOp,
    lhs: ExprId,
    rhs: ExprId,
  },
}

/// Statement forms of the language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
  Exit(ExprId),
  Let { name: String, value: ExprId },
  If { cond: ExprId, body: ScopeId },
  Block(ScopeId),
}

/// A braced sequence of statements. Used both by `if` bodies and by bare
/// blocks introduced purely for lexical grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
  pub stmts: Vec<StmtId>,
}

/// Arena owning every node of one compilation.
#[derive(Debug, Default)]
pub struct Ast {
  exprs: Vec<Expr>,
  stmts: Vec<Stmt>,
  scopes: Vec<Scope>,
}

impl Ast {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
    let id = ExprId(self.exprs.len());
    self.exprs.push(expr);
    id
  }

  pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
    let id = StmtId(self.stmts.len());
    self.stmts.push(stmt);
    id
  }

  pub fn alloc_scope(&mut self, scope: Scope) -> ScopeId {
    let id = ScopeId(self.scopes.len());
    self.scopes.push(scope);
    id
  }

  pub fn expr(&self, id: ExprId) -> &Expr {
    &self.exprs[id.0]
  }

  pub fn stmt(&self, id: StmtId) -> &Stmt {
    &self.stmts[id.0]
  }

  pub fn scope(&self, id: ScopeId) -> &Scope {
    &self.scopes[id.0]
  }
}

/// A fully parsed program: the top-level statement list plus the arena
/// that owns every node it refers to.
#[derive(Debug)]
pub struct Program {
  pub ast: Ast,
  pub stmts: Vec<StmtId>,
}
