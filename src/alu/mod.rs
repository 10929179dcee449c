//! Signed 8-bit arithmetic/logic unit.
//!
//! This module provides:
//! - [`Opcode`] - The eight selectable operations
//! - [`evaluate`] - The combinational ALU: (A, B, opcode) to a 16-bit result
//! - [`arith`] - The bit-level adder, multiplier, divider and logic unit

mod opcode;
pub mod arith;

pub use opcode::{Opcode, OpcodeError, OPCODE_MASK};
pub use arith::LogicOp;

/// Compute `op` on two signed 8-bit operands.
///
/// Total over every input: ADD and SUB wrap to 8 bits and sign-extend,
/// MUL returns the exact product, DIV returns the truncated quotient (0
/// for a zero divisor), and the bitwise operations are zero-extended.
pub fn evaluate(a: i8, b: i8, op: Opcode) -> i16 {
    let (ua, ub) = (a as u8, b as u8);
    
    match op {
        Opcode::Add => arith::sign_extend(arith::add(ua, ub, false).0),
        Opcode::Sub => arith::sign_extend(arith::subtract(ua, ub).0),
        Opcode::Mul => arith::multiply(a, b),
        Opcode::Div => arith::divide(a, b),
        Opcode::And => arith::zero_extend(arith::logic(LogicOp::And, ua, ub)),
        Opcode::Or => arith::zero_extend(arith::logic(LogicOp::Or, ua, ub)),
        Opcode::Xor => arith::zero_extend(arith::logic(LogicOp::Xor, ua, ub)),
        Opcode::Nand => arith::zero_extend(arith::logic(LogicOp::Nand, ua, ub)),
    }
}

/// The low byte of a result, read as an unsigned magnitude for display.
#[inline]
pub const fn display_byte(result: i16) -> u8 {
    (result & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn all_pairs() -> impl Iterator<Item = (i8, i8)> {
        (i8::MIN..=i8::MAX).flat_map(|a| (i8::MIN..=i8::MAX).map(move |b| (a, b)))
    }
    
    #[test]
    fn test_add_sign_extends_wrapped_sum() {
        for (a, b) in all_pairs() {
            let expected = a.wrapping_add(b) as i16;
            assert_eq!(evaluate(a, b, Opcode::Add), expected, "{} + {}", a, b);
        }
        assert_eq!(evaluate(127, 1, Opcode::Add), -128);
    }
    
    #[test]
    fn test_sub_sign_extends_wrapped_difference() {
        for (a, b) in all_pairs() {
            let expected = a.wrapping_sub(b) as i16;
            assert_eq!(evaluate(a, b, Opcode::Sub), expected, "{} - {}", a, b);
        }
        assert_eq!(evaluate(-128, 1, Opcode::Sub), 127);
    }
    
    #[test]
    fn test_mul_exhaustive() {
        for (a, b) in all_pairs() {
            let expected = (a as i32) * (b as i32);
            assert_eq!(evaluate(a, b, Opcode::Mul) as i32, expected, "{} * {}", a, b);
        }
    }
    
    #[test]
    fn test_div_exhaustive() {
        for (a, b) in all_pairs() {
            let expected = if b == 0 { 0 } else { (a as i32) / (b as i32) };
            assert_eq!(evaluate(a, b, Opcode::Div) as i32, expected, "{} / {}", a, b);
        }
    }
    
    #[test]
    fn test_bitwise_upper_byte_is_zero() {
        for (a, b) in all_pairs() {
            for op in Opcode::ALL.into_iter().filter(|op| op.is_bitwise()) {
                let result = evaluate(a, b, op);
                assert_eq!(result as u16 & 0xFF00, 0, "{} {} {}", a, op, b);
            }
        }
    }
    
    #[test]
    fn test_only_arithmetic_ops_go_negative() {
        for op in Opcode::ALL {
            let negative = all_pairs().any(|(a, b)| evaluate(a, b, op) < 0);
            assert_eq!(negative, !op.is_bitwise(), "{}", op);
        }
    }
    
    #[test]
    fn test_nand_pattern() {
        let a = 0b1010_1010u8 as i8;
        let b = 0b1100_1100u8 as i8;
        let result = evaluate(a, b, Opcode::Nand);
        assert_eq!(result, (!(0b1010_1010u8 & 0b1100_1100u8)) as i16);
        assert_eq!(result, 0x77);
    }
    
    #[test]
    fn test_display_byte() {
        assert_eq!(display_byte(8), 8);
        assert_eq!(display_byte(-1), 255);
        assert_eq!(display_byte(128), 128);
        assert_eq!(display_byte(16384), 0);
    }
}
