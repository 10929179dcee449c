//! Bit-level arithmetic units.
//!
//! Provides the ripple-carry adder/subtractor, the shift-and-add
//! multiplier, the repeated-subtraction divider and the bitwise unit
//! for 8-bit two's complement operands.

/// Operand width in bits.
pub const WIDTH: usize = 8;

/// Upper bound on divider iterations. Covers the largest 8-bit quotient.
pub const DIV_MAX_ITERATIONS: u16 = 255;

/// Single-bit full adder, returning (sum, carry_out).
#[inline]
pub const fn full_add(a: bool, b: bool, carry_in: bool) -> (bool, bool) {
    // First half-adder: a + b
    let s1 = a ^ b;
    let c1 = a & b;
    
    // Second half-adder: s1 + carry_in
    let sum = s1 ^ carry_in;
    let c2 = s1 & carry_in;
    
    (sum, c1 | c2)
}

/// Ripple-carry add of two 8-bit patterns, returning (sum, carry_out).
pub fn add(a: u8, b: u8, carry_in: bool) -> (u8, bool) {
    let mut result = 0u8;
    let mut carry = carry_in;
    
    for i in 0..WIDTH {
        let (sum, new_carry) = full_add(bit(a, i), bit(b, i), carry);
        if sum {
            result |= 1 << i;
        }
        carry = new_carry;
    }
    
    (result, carry)
}

/// Subtract (a - b) as a + !b + 1, returning (difference, carry_out).
///
/// A carry out of 1 means no borrow occurred.
#[inline]
pub fn subtract(a: u8, b: u8) -> (u8, bool) {
    add(a, !b, true)
}

/// Replicate bit 7 of an 8-bit pattern into the upper byte.
#[inline]
pub const fn sign_extend(value: u8) -> i16 {
    value as i8 as i16
}

/// Place an 8-bit pattern in the low byte with the upper byte cleared.
#[inline]
pub const fn zero_extend(value: u8) -> i16 {
    value as i16
}

/// Signed 8x8 multiply into 16 bits.
///
/// Walks the bits of `b` from least to most significant, accumulating
/// `a` shifted left (sign-preserving) for each set bit. Bit 7 of `b`
/// carries weight -128 in two's complement, so its partial product is
/// subtracted rather than added.
pub fn multiply(a: i8, b: i8) -> i16 {
    let multiplicand = a as i16;
    let multiplier = b as u8;
    let mut acc: i16 = 0;
    
    for i in 0..WIDTH {
        if !bit(multiplier, i) {
            continue;
        }
        let partial = multiplicand.wrapping_shl(i as u32);
        acc = if i == WIDTH - 1 {
            acc.wrapping_sub(partial)
        } else {
            acc.wrapping_add(partial)
        };
    }
    
    acc
}

/// Signed 8-bit divide, truncating toward zero.
///
/// Division by zero yields 0. Magnitudes are taken in 16 bits so that
/// |-128| is representable; the quotient is found by repeated
/// subtraction, capped at [`DIV_MAX_ITERATIONS`].
pub fn divide(a: i8, b: i8) -> i16 {
    if b == 0 {
        return 0;
    }
    
    let dividend = magnitude(a);
    let divisor = magnitude(b);
    let (quotient, _remainder) = divide_unsigned(dividend, divisor);
    
    if (a < 0) != (b < 0) {
        -(quotient as i16)
    } else {
        quotient as i16
    }
}

/// Unsigned repeated-subtraction divide, returning (quotient, remainder).
///
/// `divisor` must be non-zero.
pub fn divide_unsigned(dividend: u16, divisor: u16) -> (u16, u16) {
    let mut remainder = dividend;
    let mut quotient = 0u16;
    
    while remainder >= divisor && quotient < DIV_MAX_ITERATIONS {
        remainder -= divisor;
        quotient += 1;
    }
    
    (quotient, remainder)
}

/// Absolute value of an 8-bit operand widened to 16 bits.
#[inline]
pub const fn magnitude(value: i8) -> u16 {
    (value as i16).unsigned_abs()
}

/// Bitwise operation performed by the logic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Xor,
    Nand,
}

/// Apply a bitwise operation to two 8-bit patterns.
pub const fn logic(op: LogicOp, a: u8, b: u8) -> u8 {
    match op {
        LogicOp::And => a & b,
        LogicOp::Or => a | b,
        LogicOp::Xor => a ^ b,
        LogicOp::Nand => !(a & b),
    }
}

#[inline]
const fn bit(value: u8, i: usize) -> bool {
    (value >> i) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_full_add_truth_table() {
        assert_eq!(full_add(false, false, false), (false, false));
        assert_eq!(full_add(true, false, false), (true, false));
        assert_eq!(full_add(true, true, false), (false, true));
        assert_eq!(full_add(true, true, true), (true, true));
        assert_eq!(full_add(false, true, true), (false, true));
    }
    
    #[test]
    fn test_add_basic() {
        let (sum, carry) = add(100, 50, false);
        assert_eq!(sum, 150);
        assert!(!carry);
    }
    
    #[test]
    fn test_add_wraps_with_carry() {
        let (sum, carry) = add(0xFF, 0x01, false);
        assert_eq!(sum, 0);
        assert!(carry);
    }
    
    #[test]
    fn test_add_matches_wrapping_add() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(add(a, b, false).0, a.wrapping_add(b));
            }
        }
    }
    
    #[test]
    fn test_subtract() {
        assert_eq!(subtract(100, 30).0, 70);
        assert_eq!(subtract(0, 1).0, 0xFF);
        // No borrow sets the carry.
        assert!(subtract(5, 3).1);
        assert!(!subtract(3, 5).1);
    }
    
    #[test]
    fn test_sign_and_zero_extend() {
        assert_eq!(sign_extend(0x80), -128);
        assert_eq!(sign_extend(0x7F), 127);
        assert_eq!(zero_extend(0x80), 128);
        assert_eq!(zero_extend(0xFF), 255);
    }
    
    #[test]
    fn test_multiply_simple() {
        assert_eq!(multiply(7, 6), 42);
        assert_eq!(multiply(-7, 6), -42);
        assert_eq!(multiply(7, -6), -42);
        assert_eq!(multiply(-7, -6), 42);
    }
    
    #[test]
    fn test_multiply_extremes() {
        assert_eq!(multiply(-128, -128), 16384);
        assert_eq!(multiply(-128, 127), -16256);
        assert_eq!(multiply(127, 127), 16129);
        assert_eq!(multiply(-128, -1), 128);
        assert_eq!(multiply(0, -128), 0);
    }
    
    #[test]
    fn test_divide_signs() {
        assert_eq!(divide(7, 2), 3);
        assert_eq!(divide(-7, 2), -3);
        assert_eq!(divide(7, -2), -3);
        assert_eq!(divide(-7, -2), 3);
    }
    
    #[test]
    fn test_divide_by_zero_is_zero() {
        for a in i8::MIN..=i8::MAX {
            assert_eq!(divide(a, 0), 0);
        }
    }
    
    #[test]
    fn test_divide_min_by_minus_one() {
        assert_eq!(magnitude(-128), 128);
        assert_eq!(divide(-128, -1), 128);
        assert_eq!(divide(-128, 1), -128);
    }
    
    #[test]
    fn test_divide_unsigned_cap() {
        assert_eq!(divide_unsigned(255, 1), (255, 0));
        // The cap stops the loop before the true quotient is reached.
        assert_eq!(divide_unsigned(300, 1), (255, 45));
        assert_eq!(divide_unsigned(17, 5), (3, 2));
    }
    
    #[test]
    fn test_logic() {
        assert_eq!(logic(LogicOp::And, 0b1010_1010, 0b1100_1100), 0b1000_1000);
        assert_eq!(logic(LogicOp::Or, 0b1010_1010, 0b1100_1100), 0b1110_1110);
        assert_eq!(logic(LogicOp::Xor, 0b1010_1010, 0b1100_1100), 0b0110_0110);
        assert_eq!(logic(LogicOp::Nand, 0b1010_1010, 0b1100_1100), 0b0111_0111);
    }
}
