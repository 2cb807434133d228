//! The compiler's single error type.
//!
//! Every stage returns `Result<_, CompileError>`. Propagation is
//! fail-fast: the first error encountered aborts the whole pipeline,
//! and `main` is the only place that turns one into a process exit.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    // --- Syntax -----------------------------------------------------
    #[error("line {line}: invalid token {lexeme:?}")]
    InvalidToken { line: u32, lexeme: String },

    #[error("line {line}: identifier {lexeme:?} exceeds the {max}-byte length limit")]
    IdentifierTooLong {
        line: u32,
        lexeme: String,
        max: usize,
    },

    #[error("line {line}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        line: u32,
        expected: String,
        found: String,
    },

    #[error("line {line}: invalid memory address; MEM[...] must enclose a single integer literal")]
    InvalidMemoryAddress { line: u32 },

    #[error("line {line}: an immediate value cannot be an assignment destination")]
    ImmediateDestination { line: u32 },

    #[error("line {line}: integer literal {lexeme:?} overflows a signed 64-bit value")]
    IntegerOverflow { line: u32, lexeme: String },

    // --- Semantic -----------------------------------------------------
    #[error("line {line}: duplicate label {name:?}")]
    DuplicateLabel { line: u32, name: String },

    #[error("line {line}: unknown label {name:?}")]
    UnknownLabel { line: u32, name: String },

    #[error("register name must not be empty (line {line})")]
    EmptyRegisterName { line: u32 },

    // --- Semantic, raised during lowering/encoding ---------------------
    #[error("branch or jump target {name:?} is {offset} bytes away, which does not fit the instruction's signed offset field")]
    BranchOutOfRange { name: String, offset: i64 },

    #[error("internal error: label {name:?} was not in the symbol table at encode time")]
    UnresolvedLabelAtEncode { name: String },

    #[error("internal consistency error: {0}")]
    Internal(String),

    // --- System -------------------------------------------------------
    #[error("reading input file {path:?} failed: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing output file {path:?} failed: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CompileError>;
