//! Bit-exact RV32I encoder: micro-IR instructions → little-endian
//! 32-bit words. Field layouts are the standard RV32I ones (grounded
//! on the format-struct split used by `peat-brubeck/src/rv32_i/formats.rs`),
//! not an invented encoding.

use crate::error::{CompileError, Result};
use crate::ir::{Instruction, InstructionBuffer, Op};
use crate::symtab::SymbolTable;
use bessc_util::Endian;
use byteorder::ByteOrder;

const EBREAK: u32 = 0x0010_0073;

fn r_type(opcode: u32, rd: u8, funct3: u32, rs1: u8, rs2: u8, funct7: u32) -> u32 {
    (funct7 << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | (funct3 << 12)
        | ((rd as u32) << 7)
        | opcode
}

fn i_type(opcode: u32, rd: u8, funct3: u32, rs1: u8, imm: i32) -> u32 {
    let imm12 = (imm as u32) & 0xFFF;
    (imm12 << 20) | ((rs1 as u32) << 15) | (funct3 << 12) | ((rd as u32) << 7) | opcode
}

fn s_type(opcode: u32, funct3: u32, rs1: u8, rs2: u8, imm: i32) -> u32 {
    let imm = imm as u32;
    let imm_hi = (imm >> 5) & 0x7F;
    let imm_lo = imm & 0x1F;
    (imm_hi << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | (funct3 << 12)
        | (imm_lo << 7)
        | opcode
}

/// `imm` is the byte offset (target - current) * 4; must be a
/// 2-aligned value fitting in 13 signed bits (RV32I's B-type immediate
/// is a 12-bit field plus an implicit zero low bit).
fn b_type(opcode: u32, funct3: u32, rs1: u8, rs2: u8, imm: i32) -> Result<u32> {
    if imm % 2 != 0 {
        return Err(CompileError::Internal(format!(
            "branch offset {imm} is not 2-aligned"
        )));
    }
    if !(-4096..4096).contains(&imm) {
        return Err(CompileError::BranchOutOfRange {
            name: String::new(),
            offset: imm as i64,
        });
    }
    let imm = imm as u32;
    let bit12 = (imm >> 12) & 0x1;
    let bits10_5 = (imm >> 5) & 0x3F;
    let bits4_1 = (imm >> 1) & 0xF;
    let bit11 = (imm >> 11) & 0x1;
    Ok((bit12 << 31)
        | (bits10_5 << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | (funct3 << 12)
        | (bits4_1 << 8)
        | (bit11 << 7)
        | opcode)
}

fn u_type(opcode: u32, rd: u8, imm20: i32) -> u32 {
    let imm = (imm20 as u32) & 0xF_FFFF;
    (imm << 12) | ((rd as u32) << 7) | opcode
}

/// `imm` is the byte offset (target - current) * 4; must be 2-aligned
/// and fit in 21 signed bits (JAL's 20-bit field plus implicit zero
/// low bit).
fn j_type(opcode: u32, rd: u8, imm: i32) -> Result<u32> {
    if imm % 2 != 0 {
        return Err(CompileError::Internal(format!(
            "jump offset {imm} is not 2-aligned"
        )));
    }
    if !(-(1 << 20)..(1 << 20)).contains(&imm) {
        return Err(CompileError::BranchOutOfRange {
            name: String::new(),
            offset: imm as i64,
        });
    }
    let imm = imm as u32;
    let bit20 = (imm >> 20) & 0x1;
    let bits10_1 = (imm >> 1) & 0x3FF;
    let bit11 = (imm >> 11) & 0x1;
    let bits19_12 = (imm >> 12) & 0xFF;
    Ok((bit20 << 31)
        | (bits10_1 << 21)
        | (bit11 << 20)
        | (bits19_12 << 12)
        | ((rd as u32) << 7)
        | opcode)
}

fn resolve_branch_offset(
    table: &SymbolTable,
    label: &str,
    current_index: usize,
) -> Result<i32> {
    let symbol = table
        .lookup(label)
        .ok_or_else(|| CompileError::UnresolvedLabelAtEncode {
            name: label.to_string(),
        })?;
    let offset = (symbol.address as i64 - current_index as i64) * 4;
    i32::try_from(offset).map_err(|_| CompileError::BranchOutOfRange {
        name: label.to_string(),
        offset,
    })
}

fn encode_one(instr: &Instruction, index: usize, table: &SymbolTable) -> Result<u32> {
    use Op::*;
    Ok(match instr.op {
        Addi => i_type(0x13, instr.rd, 0x0, instr.rs1, instr.immediate),
        Andi => i_type(0x13, instr.rd, 0x7, instr.rs1, instr.immediate),
        Ori => i_type(0x13, instr.rd, 0x6, instr.rs1, instr.immediate),
        Lw => i_type(0x03, instr.rd, 0x2, instr.rs1, instr.immediate),
        Jalr => i_type(0x67, instr.rd, 0x0, instr.rs1, instr.immediate),
        Add => r_type(0x33, instr.rd, 0x0, instr.rs1, instr.rs2, 0x00),
        Sub => r_type(0x33, instr.rd, 0x0, instr.rs1, instr.rs2, 0x20),
        Sw => s_type(0x23, 0x2, instr.rs1, instr.rs2, instr.immediate),
        Beq | Bne | Blt | Bge => {
            let label = instr.target_label.as_deref().ok_or_else(|| {
                CompileError::Internal("branch instruction missing a target label".to_string())
            })?;
            let offset = resolve_branch_offset(table, label, index)
                .map_err(|e| with_branch_name(e, label))?;
            let funct3 = match instr.op {
                Beq => 0x0,
                Bne => 0x1,
                Blt => 0x4,
                Bge => 0x5,
                _ => unreachable!(),
            };
            b_type(0x63, funct3, instr.rs1, instr.rs2, offset)
                .map_err(|e| with_branch_name(e, label))?
        }
        Jal => {
            let label = instr.target_label.as_deref().ok_or_else(|| {
                CompileError::Internal("JAL missing a target label".to_string())
            })?;
            let offset = resolve_branch_offset(table, label, index)
                .map_err(|e| with_branch_name(e, label))?;
            j_type(0x6F, instr.rd, offset).map_err(|e| with_branch_name(e, label))?
        }
        Lui => u_type(0x37, instr.rd, instr.immediate),
        Halt => EBREAK,
    })
}

fn with_branch_name(err: CompileError, label: &str) -> CompileError {
    match err {
        CompileError::BranchOutOfRange { offset, .. } => CompileError::BranchOutOfRange {
            name: label.to_string(),
            offset,
        },
        other => other,
    }
}

/// Encodes the whole buffer into a flat sequence of little-endian
/// 32-bit words.
pub fn encode(buffer: &InstructionBuffer, table: &SymbolTable) -> Result<Vec<u8>> {
    let mut out = vec![0u8; buffer.len() * 4];
    for (index, instr) in buffer.iter().enumerate() {
        let word = encode_one(instr, index, table)?;
        let start = index * 4;
        Endian::write_u32(&mut out[start..start + 4], word);
    }
    Ok(out)
}
