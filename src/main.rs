//! Command-line driver: reads a source file, compiles it, writes the
//! assembly next to the requested output path and hands the result to the
//! external `nasm` + `ld` toolchain.

use std::fs;
use std::path::PathBuf;
use std::process::{self, Command};

use clap::Parser;
use lumen::{ALL_TARGETS, Target};

#[derive(Parser)]
#[command(name = "lumen", about = "Compile a lumen source file to a native executable")]
struct Cli {
  /// Source file to compile
  input: PathBuf,

  /// Output executable path; the assembly is written as `<output>.asm`
  #[arg(short, long, default_value = "out")]
  output: PathBuf,

  /// Target architecture (x86_64 or x86)
  #[arg(long, default_value = "x86_64")]
  target: String,

  /// Stop after writing the assembly file
  #[arg(long)]
  emit_asm: bool,
}

fn main() {
  let cli = Cli::parse();

  let Some(target) = Target::by_name(&cli.target) else {
    let names: Vec<&str> = ALL_TARGETS.iter().map(|target| target.name).collect();
    eprintln!(
      "unknown target '{}', expected one of: {}",
      cli.target,
      names.join(", ")
    );
    process::exit(1);
  };

  let source = match fs::read_to_string(&cli.input) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("failed to read {}: {err}", cli.input.display());
      process::exit(1);
    }
  };

  let asm = match lumen::compile(&source, target) {
    Ok(asm) => asm,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  let asm_path = cli.output.with_extension("asm");
  if let Err(err) = fs::write(&asm_path, &asm) {
    eprintln!("failed to write {}: {err}", asm_path.display());
    process::exit(1);
  }

  if cli.emit_asm {
    return;
  }

  let obj_path = cli.output.with_extension("o");
  run_tool(
    Command::new("nasm")
      .arg(format!("-f{}", target.nasm_format))
      .arg(&asm_path)
      .arg("-o")
      .arg(&obj_path),
    "nasm",
  );

  let mut ld = Command::new("ld");
  if let Some(emulation) = target.ld_emulation {
    ld.arg("-m").arg(emulation);
  }
  run_tool(ld.arg(&obj_path).arg("-o").arg(&cli.output), "ld");
}

/// Run an external toolchain step, exiting with a diagnostic if it cannot
/// be spawned or reports failure.
fn run_tool(command: &mut Command, name: &str) {
  match command.status() {
    Ok(status) if status.success() => {}
    Ok(status) => {
      eprintln!("{name} exited with {status}");
      process::exit(1);
    }
    Err(err) => {
      eprintln!("failed to run {name}: {err}");
      process::exit(1);
    }
  }
}
