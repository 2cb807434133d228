//! Two-pass semantic analysis over a parsed [`Program`].
//!
//! Pass 1 collects label definitions into the symbol table. Pass 2
//! verifies every goto/if-goto target resolves. Both passes fail fast.
//!
//! **Open Question resolution (spec.md §9):** option **(b)** — a
//! label's address is taken directly from the [`LabelSite`]s the
//! lowerer records while it builds the instruction buffer, rather than
//! from a separate instruction-counting pass over the statement list.
//! A label emits no instructions, so its real address is simply the
//! buffer's length at the moment the lowerer reaches it; any duplicate
//! counting logic here would have to track every lowering decision
//! that changes a statement's instruction count (e.g. an out-of-range
//! immediate's `LUI`+`ADDI` expansion in `lower.rs`) and silently drift
//! out of sync the next time that logic changes. Taking the address
//! straight from the lowerer's own bookkeeping makes that drift
//! structurally impossible.

use crate::ast::{Program, StatementKind};
use crate::error::{CompileError, Result};
use crate::lower::LabelSite;
use crate::symtab::SymbolTable;

/// Builds the symbol table from the lowerer's recorded label sites
/// (pass 1), then verifies every goto/if-goto target resolves against
/// it (pass 2).
pub fn analyze(program: &Program, labels: &[LabelSite]) -> Result<SymbolTable> {
    let mut table = SymbolTable::new();

    // Pass 1: label collection, addresses already resolved by `lower`.
    for site in labels {
        table.insert_label(&site.name, site.address, site.line)?;
    }

    // Pass 2: jump verification.
    for statement in &program.statements {
        match &statement.kind {
            StatementKind::Goto(target) => verify_target(&table, target, statement.line)?,
            StatementKind::IfGoto { target, .. } => {
                verify_target(&table, target, statement.line)?
            }
            _ => {}
        }
    }

    Ok(table)
}

fn verify_target(table: &SymbolTable, name: &str, line: u32) -> Result<()> {
    match table.lookup(name) {
        Some(sym) if sym.kind == crate::symtab::SymbolKind::Label => Ok(()),
        _ => Err(CompileError::UnknownLabel {
            line,
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lower::lower;
    use crate::parser::parse;

    #[test]
    fn label_address_matches_first_emitting_statement() {
        let program = parse("LOOP:\nA = A\ngoto LOOP\n").unwrap();
        let (_, labels) = lower(&program);
        let table = analyze(&program, &labels).unwrap();
        assert_eq!(table.lookup("LOOP").unwrap().address, 0);
    }

    #[test]
    fn label_after_instructions_gets_correct_address() {
        let program = parse("A = 1\nB = 2\nDONE:\ngoto DONE\n").unwrap();
        let (_, labels) = lower(&program);
        let table = analyze(&program, &labels).unwrap();
        // A=1 -> 1 instr, B=2 -> 1 instr, so DONE sits at index 2.
        assert_eq!(table.lookup("DONE").unwrap().address, 2);
    }

    #[test]
    fn label_address_survives_lui_addi_expansion() {
        // A = 100000 lowers to LUI+ADDI (2 instructions, not 1); a
        // counter that assumed 1 would place L at index 1 instead of 2.
        let program = parse("A = 100000\nL:\ngoto L\n").unwrap();
        let (_, labels) = lower(&program);
        let table = analyze(&program, &labels).unwrap();
        assert_eq!(table.lookup("L").unwrap().address, 2);
    }

    #[test]
    fn unknown_goto_target_is_an_error() {
        let program = parse("goto NOWHERE\n").unwrap();
        let (_, labels) = lower(&program);
        assert!(analyze(&program, &labels).is_err());
    }

    #[test]
    fn duplicate_label_is_an_error() {
        let program = parse("A:\nA:\n").unwrap();
        let (_, labels) = lower(&program);
        assert!(analyze(&program, &labels).is_err());
    }

    #[test]
    fn if_goto_target_is_verified() {
        let program = parse("if A > B goto NOWHERE\n").unwrap();
        let (_, labels) = lower(&program);
        assert!(analyze(&program, &labels).is_err());
    }
}
