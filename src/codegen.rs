//! Code generation: lower the parsed AST into NASM assembly.
//!
//! The emitter is a simple stack machine: every expression leaves exactly
//! one value on the operand stack, and statements pop what they consume.
//! Variables have no separate storage – the value pushed by a `let`
//! initialiser *is* the variable's slot, addressed later relative to the
//! stack pointer from the recorded declaration height.
//!
//! The whole algorithm is target-independent; the two shipped back ends
//! differ only in their [`Target`] descriptor (register names, slot size
//! and the instruction sequence that terminates the process).

use crate::ast::{Ast, BinOp, Expr, ExprId, Program, ScopeId, Stmt, StmtId};
use crate::error::{CompileError, CompileResult};

/// Everything the generator core needs to know about a machine target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
  /// Name used for selection on the command line.
  pub name: &'static str,
  /// Bytes per operand-stack slot.
  pub word_size: usize,
  /// NASM size keyword for a stack slot.
  pub word_ptr: &'static str,
  /// Accumulator; receives the left operand of binary expressions.
  pub acc: &'static str,
  /// Secondary scratch register; receives the right operand.
  pub aux: &'static str,
  /// Stack pointer register.
  pub sp: &'static str,
  /// Register the exit system call reads its status code from.
  pub sys_arg: &'static str,
  /// System call number of `exit`.
  pub sys_exit: u32,
  /// Instruction that enters the kernel.
  pub trap: &'static str,
  /// Format passed to `nasm -f`.
  pub nasm_format: &'static str,
  /// Emulation passed to `ld -m`, where the platform default is wrong.
  pub ld_emulation: Option<&'static str>,
}

impl Target {
  /// Resolve a command-line target name.
  pub fn by_name(name: &str) -> Option<&'static Target> {
    ALL_TARGETS.iter().find(|target| target.name == name)
  }
}

pub const X86_64_LINUX: Target = Target {
  name: "x86_64",
  word_size: 8,
  word_ptr: "qword",
  acc: "rax",
  aux: "rbx",
  sp: "rsp",
  sys_arg: "rdi",
  sys_exit: 60,
  trap: "syscall",
  nasm_format: "elf64",
  ld_emulation: None,
};

pub const X86_LINUX: Target = Target {
  name: "x86",
  word_size: 4,
  word_ptr: "dword",
  acc: "eax",
  aux: "ebx",
  sp: "esp",
  sys_arg: "ebx",
  sys_exit: 1,
  trap: "int 0x80",
  nasm_format: "elf32",
  ld_emulation: Some("elf_i386"),
};

pub static ALL_TARGETS: [Target; 2] = [X86_64_LINUX, X86_LINUX];

/// Emit assembly for a whole program. Appends a `exit(0)` epilogue only
/// when no explicit `exit` statement was generated.
pub fn generate(program: &Program, target: &Target) -> CompileResult<String> {
  let mut generator = Generator {
    ast: &program.ast,
    target,
    out: String::new(),
    stack_height: 0,
    vars: Vec::new(),
    scopes: Vec::new(),
    label_count: 0,
    need_exit: true,
  };

  generator
    .out
    .push_str("global _start\n\nsection .text\n_start:\n");

  for &stmt in &program.stmts {
    generator.gen_stmt(stmt)?;
  }

  if generator.need_exit {
    generator
      .out
      .push_str(&format!("    mov {}, {}\n", target.acc, target.sys_exit));
    generator
      .out
      .push_str(&format!("    mov {}, 0\n", target.sys_arg));
    generator.out.push_str(&format!("    {}\n", target.trap));
  }

  Ok(generator.out)
}

/// A declared variable: its name and the virtual stack height at the
/// moment its initialiser began evaluating.
struct Var {
  name: String,
  height: isize,
}

struct Generator<'a> {
  ast: &'a Ast,
  target: &'a Target,
  out: String,
  /// Count of slots pushed since `_start`; the basis for all variable
  /// offset computations. Signed because a zero-offset read consumes the
  /// variable's own slot, which can leave pops ahead of pushes.
  stack_height: isize,
  /// Insertion-ordered table of currently visible variables.
  vars: Vec<Var>,
  /// Variable-table size at entry of each active scope.
  scopes: Vec<usize>,
  label_count: usize,
  need_exit: bool,
}

impl<'a> Generator<'a> {
  fn gen_stmt(&mut self, id: StmtId) -> CompileResult<()> {
    let stmt = self.ast.stmt(id);
    match stmt {
      Stmt::Exit(expr) => {
        self.gen_expr(*expr)?;
        self
          .out
          .push_str(&format!("    mov {}, {}\n", self.target.acc, self.target.sys_exit));
        self.pop(self.target.sys_arg);
        self.out.push_str(&format!("    {}\n", self.target.trap));
        self.need_exit = false;
        Ok(())
      }
      Stmt::Let { name, value } => {
        if self.vars.iter().any(|var| var.name == *name) {
          return Err(CompileError::DuplicateIdentifier { name: name.clone() });
        }
        // The initialiser's pushed value becomes the variable's slot, so
        // record the height before generating it.
        self.vars.push(Var {
          name: name.clone(),
          height: self.stack_height,
        });
        self.gen_expr(*value)
      }
      Stmt::If { cond, body } => {
        let label = self.create_label();
        self.gen_expr(*cond)?;
        self.pop(self.target.acc);
        self
          .out
          .push_str(&format!("    test {}, {}\n", self.target.acc, self.target.acc));
        self.out.push_str(&format!("    jz {label}\n"));
        self.gen_scope(*body)?;
        self.out.push_str(&format!("\n{label}:\n"));
        Ok(())
      }
      Stmt::Block(scope) => self.gen_scope(*scope),
    }
  }

  fn gen_scope(&mut self, id: ScopeId) -> CompileResult<()> {
    self.scopes.push(self.vars.len());

    let scope = self.ast.scope(id);
    for &stmt in &scope.stmts {
      self.gen_stmt(stmt)?;
    }

    if let Some(mark) = self.scopes.pop() {
      let count = self.vars.len() - mark;
      // One stack-pointer adjustment frees every slot the scope declared.
      self.out.push_str(&format!(
        "    add {}, {}\n",
        self.target.sp,
        count * self.target.word_size
      ));
      self.vars.truncate(mark);
      self.stack_height -= count as isize;
    }

    Ok(())
  }

  fn gen_expr(&mut self, id: ExprId) -> CompileResult<()> {
    let expr = self.ast.expr(id);
    match expr {
      Expr::IntLit(text) => {
        self.push(text);
        Ok(())
      }
      Expr::Ident(name) => {
        let Some(var) = self.vars.iter().find(|var| var.name == *name) else {
          return Err(CompileError::UndeclaredIdentifier { name: name.clone() });
        };
        let offset = (self.stack_height - var.height - 1) * self.target.word_size as isize;
        // Offset zero means the variable already sits on top of the
        // operand stack; its slot doubles as the expression result.
        if offset > 0 {
          let operand = format!("{} [{} + {}]", self.target.word_ptr, self.target.sp, offset);
          self.push(&operand);
        }
        Ok(())
      }
      Expr::Paren(inner) => self.gen_expr(*inner),
      Expr::Binary { op, lhs, rhs } => {
        // Right before left: the left operand ends up on top, so the
        // first pop lands it in the accumulator.
        self.gen_expr(*rhs)?;
        self.gen_expr(*lhs)?;
        self.pop(self.target.acc);
        self.pop(self.target.aux);
        let line = match op {
          BinOp::Add => format!("    add {}, {}\n", self.target.acc, self.target.aux),
          BinOp::Sub => format!("    sub {}, {}\n", self.target.acc, self.target.aux),
          BinOp::Mul => format!("    mul {}\n", self.target.aux),
          BinOp::Div => format!("    div {}\n", self.target.aux),
        };
        self.out.push_str(&line);
        self.push(self.target.acc);
        Ok(())
      }
    }
  }

  fn push(&mut self, operand: &str) {
    self.out.push_str(&format!("    push {operand}\n"));
    self.stack_height += 1;
  }

  fn pop(&mut self, reg: &str) {
    self.out.push_str(&format!("    pop {reg}\n"));
    self.stack_height -= 1;
  }

  fn create_label(&mut self) -> String {
    let label = format!("label_{}", self.label_count);
    self.label_count += 1;
    label
  }
}
