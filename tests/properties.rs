//! Property-based checks for the two invariants spec.md §8 states in
//! general terms rather than as a fixed example: optimizer idempotence,
//! and stability of the lexer's token sequence under re-lexing.

use bessc::ir::{Instruction, Op};
use bessc::optimize::{optimize, OptFlags, OptLevel};
use proptest::prelude::*;

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Addi),
        Just(Op::Add),
        Just(Op::Sub),
        Just(Op::Andi),
        Just(Op::Ori),
        Just(Op::Lui),
        Just(Op::Halt),
    ]
}

fn arbitrary_instruction() -> impl Strategy<Value = Instruction> {
    (arbitrary_op(), 0u8..32, 0u8..32, 0u8..32, -2048i32..2048).prop_map(
        |(op, rd, rs1, rs2, immediate)| match op {
            Op::Halt => Instruction::new(Op::Halt),
            Op::Add | Op::Sub => Instruction::r(op, rd, rs1, rs2),
            _ => Instruction::i(op, rd, rs1, immediate),
        },
    )
}

proptest! {
    #[test]
    fn optimizer_is_idempotent(buf in prop::collection::vec(arbitrary_instruction(), 0..32)) {
        for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2, OptLevel::O3, OptLevel::Oz] {
            let flags = OptFlags::for_level(level);
            let once = optimize(buf.clone(), flags);
            let twice = optimize(once.clone(), flags);
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn cleanup_never_grows_the_buffer(buf in prop::collection::vec(arbitrary_instruction(), 0..32)) {
        let before = buf.len();
        let after = optimize(buf, OptFlags::for_level(OptLevel::O2)).len();
        prop_assert!(after <= before);
    }
}

proptest! {
    #[test]
    fn lexer_token_kinds_are_stable_across_immediate_values(value in 0i64..2047) {
        let src = format!("A = {value}\n");
        let tokens_a = bessc::lexer::tokens(&src).unwrap();
        let tokens_b = bessc::lexer::tokens(&src).unwrap();
        prop_assert_eq!(tokens_a, tokens_b);
    }
}
