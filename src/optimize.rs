//! Optimizer: rewrites an [`InstructionBuffer`] in place according to
//! the flag set implied by an [`OptLevel`]. Peephole, dead-code,
//! jump-folding, and constant-folding are threaded through as flags a
//! future pass can claim without touching this driver loop, but only
//! the cleanup rules are implemented here (generalized from the
//! teacher's "process, repeat until no more work" shape in
//! `vasm/src/data.rs`'s resize-and-fill loop).

use crate::ir::InstructionBuffer;
use std::str::FromStr;

const MAX_ITERATIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptLevel {
    O0,
    O1,
    O2,
    O3,
    Ofast,
    Oflash,
    Osize,
    Oz,
    Onano,
}

impl FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(OptLevel::O0),
            "1" => Ok(OptLevel::O1),
            "2" => Ok(OptLevel::O2),
            "3" => Ok(OptLevel::O3),
            "fast" => Ok(OptLevel::Ofast),
            "flash" => Ok(OptLevel::Oflash),
            "s" => Ok(OptLevel::Osize),
            "z" => Ok(OptLevel::Oz),
            "nano" => Ok(OptLevel::Onano),
            other => Err(format!(
                "unknown optimization level {other:?}; expected one of \
                 0, 1, 2, 3, fast, flash, s, z, nano"
            )),
        }
    }
}

/// The boolean flag set spec.md §4.6's level table maps each
/// [`OptLevel`] to. `remove_nop` drives the always-first cleanup pass;
/// the rest are threaded through unimplemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptFlags {
    pub remove_nop: bool,
    pub peephole: bool,
    pub dead_code: bool,
    pub jump_fold: bool,
    pub const_fold: bool,
    pub regalloc: bool,
}

impl OptFlags {
    pub fn for_level(level: OptLevel) -> Self {
        use OptLevel::*;
        match level {
            O0 => OptFlags::default(),
            O1 => OptFlags {
                remove_nop: true,
                peephole: true,
                ..OptFlags::default()
            },
            O2 => OptFlags {
                remove_nop: true,
                peephole: true,
                dead_code: true,
                jump_fold: true,
                ..OptFlags::default()
            },
            O3 | Ofast | Oflash => OptFlags {
                remove_nop: true,
                peephole: true,
                dead_code: true,
                jump_fold: true,
                const_fold: true,
                regalloc: true,
            },
            Osize => OptFlags {
                remove_nop: true,
                peephole: true,
                jump_fold: true,
                ..OptFlags::default()
            },
            Oz | Onano => OptFlags {
                remove_nop: true,
                peephole: true,
                dead_code: true,
                jump_fold: true,
                ..OptFlags::default()
            },
        }
    }

    fn any_enabled(&self) -> bool {
        self.remove_nop
            || self.peephole
            || self.dead_code
            || self.jump_fold
            || self.const_fold
            || self.regalloc
    }
}

/// Deletes `ADDI rd, rs1, 0` where `rd == rs1`, and any non-store
/// instruction writing `x0`. Returns whether it changed the buffer.
fn cleanup_pass(buf: &mut InstructionBuffer) -> bool {
    let before = buf.len();
    buf.retain(|instr| {
        let is_self_addi_zero = instr.op == crate::ir::Op::Addi
            && instr.rd == instr.rs1
            && instr.immediate == 0;
        !is_self_addi_zero && !instr.writes_zero_register()
    });
    buf.len() != before
}

/// Runs the enabled passes to a fixed point, capped at
/// [`MAX_ITERATIONS`]. Peephole/dead-code/jump-fold/const-fold/regalloc
/// are flag-gated no-ops today; only the cleanup rules (governed by
/// `remove_nop`) do any rewriting.
pub fn optimize(mut buf: InstructionBuffer, flags: OptFlags) -> InstructionBuffer {
    if !flags.any_enabled() {
        return buf;
    }

    for iteration in 0..MAX_ITERATIONS {
        let mut changed = false;
        if flags.remove_nop {
            changed |= cleanup_pass(&mut buf);
        }
        // peephole / dead_code / jump_fold / const_fold / regalloc:
        // flags are threaded through for a future pass to claim; none
        // of them rewrite the buffer yet.
        if !changed {
            log::debug!("optimizer reached a fixed point after {} iteration(s)", iteration + 1);
            break;
        }
    }
    buf
}
