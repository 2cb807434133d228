//! CLI driver: parses arguments, reads the source file, runs the
//! pipeline, writes the result. A single diagnostic is printed on
//! failure and the process exits 1; success exits 0.
//!
//! Grounded on `vasm/src/main.rs`'s read-compile-write shape, with the
//! dump flags and structured logging layered on per this compiler's
//! ambient stack.

use bessc::cli::Cli;
use bessc::error::CompileError;
use bessc::optimize::{self, OptFlags};
use bessc::output;
use bessc::{ast, encode, lexer, lower, parser, semantic};
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse_args();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bessc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CompileError> {
    let source = fs::read_to_string(&cli.input).map_err(|source| CompileError::ReadInput {
        path: cli.input.clone(),
        source,
    })?;

    if cli.dump_tokens {
        let tokens = lexer::tokens(&source)?;
        for token in &tokens {
            eprintln!("{token:?}");
        }
        return Ok(());
    }

    let program = parser::parse(&source)?;
    if cli.dump_ast {
        dump_ast(&program);
        return Ok(());
    }

    let (buffer, labels) = lower::lower(&program);
    let table = semantic::analyze(&program, &labels)?;
    if cli.dump_ir {
        for instr in &buffer {
            eprintln!("{instr:?}");
        }
        return Ok(());
    }

    let buffer = optimize::optimize(buffer, OptFlags::for_level(cli.opt_level));
    let bytes = encode::encode(&buffer, &table)?;

    let output_path = cli.output_path();
    output::write_flat_binary(&output_path, &bytes, cli.target)?;
    log::info!(
        "wrote {} bytes to {}",
        bytes.len(),
        output_path.display()
    );
    Ok(())
}

fn dump_ast(program: &ast::Program) {
    for statement in &program.statements {
        eprintln!("{:4}: {:?}", statement.line, statement.kind);
    }
}
