//! Opcode decoding for the ALU.
//!
//! The operation is selected by three push-buttons wired active-low, so
//! the opcode is the bitwise complement of the raw selector lines. With no
//! button pressed the selector reads `0b111` and the ALU performs ADD.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Mask for the three opcode lines.
pub const OPCODE_MASK: u8 = 0b111;

/// One of the eight ALU operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ==================== Arithmetic ====================
    
    /// Two's complement sum, wrapped to 8 bits then sign-extended.
    Add,
    /// Two's complement difference, wrapped to 8 bits then sign-extended.
    Sub,
    /// Full 16-bit signed product.
    Mul,
    /// Signed quotient truncated toward zero; zero when dividing by zero.
    Div,
    
    // ==================== Bitwise ====================
    
    /// Bitwise AND, zero-extended.
    And,
    /// Bitwise OR, zero-extended.
    Or,
    /// Bitwise XOR, zero-extended.
    Xor,
    /// Bitwise NAND, zero-extended.
    Nand,
}

impl Opcode {
    /// All opcodes in encoding order.
    pub const ALL: [Opcode; 8] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::Nand,
    ];
    
    /// Decode the low three bits of `bits`. Higher bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & OPCODE_MASK {
            0 => Opcode::Add,
            1 => Opcode::Sub,
            2 => Opcode::Mul,
            3 => Opcode::Div,
            4 => Opcode::And,
            5 => Opcode::Or,
            6 => Opcode::Xor,
            _ => Opcode::Nand,
        }
    }
    
    /// Decode an active-low selector (a pressed button reads 0).
    #[inline]
    pub const fn from_selector(selector: u8) -> Self {
        Self::from_bits(!selector)
    }
    
    /// The 3-bit encoding of this opcode.
    pub const fn bits(self) -> u8 {
        self as u8
    }
    
    /// The active-low selector value that produces this opcode.
    pub const fn selector(self) -> u8 {
        !self.bits() & OPCODE_MASK
    }
    
    /// True for the four bitwise operations, whose results are zero-extended.
    pub const fn is_bitwise(self) -> bool {
        matches!(self, Opcode::And | Opcode::Or | Opcode::Xor | Opcode::Nand)
    }
    
    /// Next opcode in encoding order, wrapping NAND back to ADD.
    pub const fn next(self) -> Self {
        Self::from_bits(self.bits() + 1)
    }
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Add
    }
}

impl TryFrom<u8> for Opcode {
    type Error = OpcodeError;
    
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > OPCODE_MASK {
            return Err(OpcodeError::OutOfRange(value));
        }
        Ok(Self::from_bits(value))
    }
}

impl std::str::FromStr for Opcode {
    type Err = OpcodeError;
    
    /// Parse a mnemonic (case-insensitive) or a decimal opcode number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "ADD" => Ok(Opcode::Add),
            "SUB" => Ok(Opcode::Sub),
            "MUL" => Ok(Opcode::Mul),
            "DIV" => Ok(Opcode::Div),
            "AND" => Ok(Opcode::And),
            "OR" => Ok(Opcode::Or),
            "XOR" => Ok(Opcode::Xor),
            "NAND" | "NAN" => Ok(Opcode::Nand),
            other => match other.parse::<u8>() {
                Ok(n) => Opcode::try_from(n),
                Err(_) => Err(OpcodeError::UnknownMnemonic(s.to_string())),
            },
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Nand => "NAND",
        };
        f.write_str(name)
    }
}

/// Errors from converting external values into an [`Opcode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpcodeError {
    #[error("opcode {0} does not fit in 3 bits")]
    OutOfRange(u8),
    
    #[error("unknown operation: {0:?}")]
    UnknownMnemonic(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_bits_roundtrip() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(op.bits() as usize, i);
            assert_eq!(Opcode::from_bits(i as u8), *op);
        }
    }
    
    #[test]
    fn test_selector_is_active_low() {
        assert_eq!(Opcode::from_selector(0b111), Opcode::Add);
        assert_eq!(Opcode::from_selector(0b110), Opcode::Sub);
        assert_eq!(Opcode::from_selector(0b000), Opcode::Nand);
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_selector(op.selector()), op);
        }
    }
    
    #[test]
    fn test_selector_ignores_upper_bits() {
        assert_eq!(Opcode::from_selector(0xFF), Opcode::Add);
        assert_eq!(Opcode::from_selector(0xF8), Opcode::Nand);
    }
    
    #[test]
    fn test_try_from_rejects_wide_values() {
        assert_eq!(Opcode::try_from(7), Ok(Opcode::Nand));
        assert_eq!(Opcode::try_from(8), Err(OpcodeError::OutOfRange(8)));
    }
    
    #[test]
    fn test_parse() {
        assert_eq!("add".parse::<Opcode>(), Ok(Opcode::Add));
        assert_eq!(" Nand ".parse::<Opcode>(), Ok(Opcode::Nand));
        assert_eq!("NAN".parse::<Opcode>(), Ok(Opcode::Nand));
        assert_eq!("3".parse::<Opcode>(), Ok(Opcode::Div));
        assert_eq!("9".parse::<Opcode>(), Err(OpcodeError::OutOfRange(9)));
        assert!(matches!("nop".parse::<Opcode>(), Err(OpcodeError::UnknownMnemonic(_))));
    }
    
    #[test]
    fn test_is_bitwise() {
        let bitwise: Vec<Opcode> = Opcode::ALL.iter().copied().filter(|op| op.is_bitwise()).collect();
        assert_eq!(bitwise, vec![Opcode::And, Opcode::Or, Opcode::Xor, Opcode::Nand]);
    }
    
    #[test]
    fn test_next_wraps() {
        assert_eq!(Opcode::Add.next(), Opcode::Sub);
        assert_eq!(Opcode::Nand.next(), Opcode::Add);
    }
}
