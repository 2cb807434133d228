//! Translates a parsed [`Program`] into an [`InstructionBuffer`].
//! One statement at a time, in program order; a final `HALT`
//! terminates the buffer.
//!
//! A label statement emits no instructions, so its address is exactly
//! the buffer's length at the moment the lowerer reaches it — no
//! separate instruction-counting pass is needed, or safe to keep in
//! sync by hand, since an operand's encoding (e.g. whether an
//! immediate needs the `LUI`+`ADDI` expansion below) can change the
//! instruction count per statement. [`lower`] records each label's
//! real address as it goes; `semantic.rs` builds the symbol table
//! directly from that, per spec §9's option (b).

use crate::ast::{BinOp, CondOp, Expression, Operand, Program, StatementKind};
use crate::ir::{Instruction, InstructionBuffer, Op};
use crate::registers;

/// The 12-bit signed range `ADDI`'s immediate field can hold without
/// needing a `LUI`+`ADDI` expansion.
const ADDI_MIN: i64 = -2048;
const ADDI_MAX: i64 = 2047;

/// A label definition's real address, discovered during lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSite {
    pub name: String,
    pub line: u32,
    pub address: u32,
}

/// Lowers `program`, returning the instruction buffer alongside the
/// exact address each label definition resolved to.
pub fn lower(program: &Program) -> (InstructionBuffer, Vec<LabelSite>) {
    let mut buf = InstructionBuffer::new();
    let mut labels = Vec::new();
    for statement in &program.statements {
        if let StatementKind::Label(name) = &statement.kind {
            labels.push(LabelSite {
                name: name.clone(),
                line: statement.line,
                address: buf.len() as u32,
            });
        }
        lower_statement(&statement.kind, &mut buf);
    }
    buf.push(Instruction::new(Op::Halt));
    (buf, labels)
}

fn lower_statement(kind: &StatementKind, buf: &mut InstructionBuffer) {
    match kind {
        StatementKind::Label(_) => {
            // Emits nothing; its address was already recorded in `lower`.
        }
        StatementKind::Assign { dest, expr } => lower_assign(dest, expr, buf),
        StatementKind::Goto(target) => {
            buf.push(Instruction::branch(Op::Beq, registers::ZERO, registers::ZERO, target));
        }
        StatementKind::IfGoto {
            lhs,
            op,
            rhs,
            target,
        } => lower_if_goto(lhs, *op, rhs, target, buf),
    }
}

fn lower_assign(dest: &Operand, expr: &Expression, buf: &mut InstructionBuffer) {
    match dest {
        Operand::Register(name) => {
            let rd = registers::map_register(name);
            lower_expr_into(expr, rd, buf);
        }
        Operand::Memory(address) => {
            lower_expr_into(expr, registers::T0, buf);
            buf.push(Instruction::s(
                Op::Sw,
                registers::ZERO,
                registers::T0,
                to_word_offset(*address),
            ));
        }
        Operand::Immediate(_) => {
            unreachable!("the parser rejects an immediate assignment destination")
        }
    }
}

/// Evaluates `expr` into register `dst`.
fn lower_expr_into(expr: &Expression, dst: u8, buf: &mut InstructionBuffer) {
    match expr {
        Expression::Operand(operand) => load_operand(operand, dst, buf),
        Expression::Binary(lhs, op, rhs) => {
            load_operand(lhs, registers::T0, buf);
            load_operand(rhs, registers::T1, buf);
            let ir_op = match op {
                BinOp::Add => Op::Add,
                BinOp::Sub => Op::Sub,
                BinOp::Mul | BinOp::Div | BinOp::And | BinOp::Or => {
                    log::warn!(
                        "operator {op:?} is outside this compiler's RV32I subset; \
                         falling back to ADD (preserved, incomplete behavior)"
                    );
                    Op::Add
                }
            };
            buf.push(Instruction::r(ir_op, dst, registers::T0, registers::T1));
        }
    }
}

/// Loads a single operand into `dst`. An out-of-range immediate
/// expands to `LUI`+`ADDI` instead of overflowing a 12-bit `ADDI`.
fn load_operand(operand: &Operand, dst: u8, buf: &mut InstructionBuffer) {
    match operand {
        Operand::Register(name) => {
            let src = registers::map_register(name);
            buf.push(Instruction::r(Op::Add, dst, src, registers::ZERO));
        }
        Operand::Immediate(value) => load_immediate(*value, dst, buf),
        Operand::Memory(address) => {
            buf.push(Instruction::i(
                Op::Lw,
                dst,
                registers::ZERO,
                to_word_offset(*address),
            ));
        }
    }
}

fn load_immediate(value: i64, dst: u8, buf: &mut InstructionBuffer) {
    if (ADDI_MIN..=ADDI_MAX).contains(&value) {
        buf.push(Instruction::i(Op::Addi, dst, registers::ZERO, value as i32));
        return;
    }

    let value = value as i32;
    let low12 = (value & 0xFFF) as i16; // sign-extended by ADDI at encode time
    let mut upper20 = (value >> 12) & 0xFFFFF;
    if low12 < 0 {
        upper20 = (upper20 + 1) & 0xFFFFF;
    }
    buf.push(Instruction::i(Op::Lui, dst, 0, upper20));
    buf.push(Instruction::i(Op::Addi, dst, dst, low12 as i32));
}

fn lower_if_goto(lhs: &Operand, op: CondOp, rhs: &Operand, target: &str, buf: &mut InstructionBuffer) {
    load_operand(lhs, registers::T0, buf);
    load_operand(rhs, registers::T1, buf);

    let (ir_op, rs1, rs2) = match op {
        CondOp::Eq => (Op::Beq, registers::T0, registers::T1),
        CondOp::Ne => (Op::Bne, registers::T0, registers::T1),
        CondOp::Lt => (Op::Blt, registers::T0, registers::T1),
        CondOp::Gt => (Op::Blt, registers::T1, registers::T0), // operand swap
        CondOp::Ge => (Op::Bge, registers::T0, registers::T1),
        CondOp::Le => (Op::Bge, registers::T1, registers::T0), // operand swap
    };
    buf.push(Instruction::branch(ir_op, rs1, rs2, target));
}

fn to_word_offset(address: u64) -> i32 {
    address as i32
}
