//! Text rendering for the result line.
//!
//! Converts the active opcode into a 3-character mnemonic and the result's
//! low byte into three decimal digit characters.

use crate::alu::{self, Opcode, OPCODE_MASK};
use serde::{Serialize, Deserialize};

/// Mnemonic shown for an opcode pattern outside the table.
pub const FALLBACK_MNEMONIC: [u8; 3] = *b"ALU";

/// Mnemonic for a raw opcode pattern.
///
/// Every 3-bit pattern has an entry; wider patterns fall back to "ALU".
pub const fn mnemonic_for_bits(bits: u8) -> [u8; 3] {
    if bits > OPCODE_MASK {
        return FALLBACK_MNEMONIC;
    }
    match bits {
        0 => *b"ADD",
        1 => *b"SUB",
        2 => *b"MUL",
        3 => *b"DIV",
        4 => *b"AND",
        5 => *b"OR ",
        6 => *b"XOR",
        7 => *b"NAN",
        _ => FALLBACK_MNEMONIC,
    }
}

/// The 3-character mnemonic for an opcode.
#[inline]
pub const fn mnemonic(op: Opcode) -> [u8; 3] {
    mnemonic_for_bits(op.bits())
}

/// Decimal digits of an unsigned byte as ASCII (hundreds, tens, ones).
pub const fn digits(bin: u8) -> [u8; 3] {
    [
        b'0' + bin / 100,
        b'0' + (bin % 100) / 10,
        b'0' + bin % 10,
    ]
}

/// Everything the sequencer needs to draw one refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Operation mnemonic, three ASCII characters.
    pub mnemonic: [u8; 3],
    /// Result digits, three ASCII characters.
    pub digits: [u8; 3],
}

impl Frame {
    /// Render a frame from current operands and opcode.
    pub fn compute(a: i8, b: i8, op: Opcode) -> Self {
        let result = alu::evaluate(a, b, op);
        Self {
            mnemonic: mnemonic(op),
            digits: digits(alu::display_byte(result)),
        }
    }
    
    /// The line as it appears on the display, e.g. `"ADD: 008"`.
    pub fn text(&self) -> String {
        let mut bytes = Vec::with_capacity(8);
        bytes.extend_from_slice(&self.mnemonic);
        bytes.extend_from_slice(b": ");
        bytes.extend_from_slice(&self.digits);
        bytes.iter().map(|&c| c as char).collect()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::compute(0, 0, Opcode::Add)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_digits() {
        assert_eq!(digits(0), *b"000");
        assert_eq!(digits(8), *b"008");
        assert_eq!(digits(42), *b"042");
        assert_eq!(digits(128), *b"128");
        assert_eq!(digits(255), *b"255");
    }
    
    #[test]
    fn test_digits_are_ascii_numerals() {
        for bin in 0..=255u8 {
            let d = digits(bin);
            assert!(d.iter().all(u8::is_ascii_digit));
            let value = (d[0] - b'0') as u32 * 100 + (d[1] - b'0') as u32 * 10 + (d[2] - b'0') as u32;
            assert_eq!(value, bin as u32);
        }
    }
    
    #[test]
    fn test_mnemonic_table() {
        assert_eq!(&mnemonic(Opcode::Add), b"ADD");
        assert_eq!(&mnemonic(Opcode::Sub), b"SUB");
        assert_eq!(&mnemonic(Opcode::Mul), b"MUL");
        assert_eq!(&mnemonic(Opcode::Div), b"DIV");
        assert_eq!(&mnemonic(Opcode::And), b"AND");
        assert_eq!(&mnemonic(Opcode::Or), b"OR ");
        assert_eq!(&mnemonic(Opcode::Xor), b"XOR");
        assert_eq!(&mnemonic(Opcode::Nand), b"NAN");
    }
    
    #[test]
    fn test_mnemonic_fallback() {
        assert_eq!(mnemonic_for_bits(8), FALLBACK_MNEMONIC);
        assert_eq!(mnemonic_for_bits(0xFF), *b"ALU");
    }
    
    #[test]
    fn test_frame_text() {
        assert_eq!(Frame::compute(5, 3, Opcode::Add).text(), "ADD: 008");
        assert_eq!(Frame::compute(-128, -1, Opcode::Div).text(), "DIV: 128");
        assert_eq!(Frame::compute(-1, 0, Opcode::Or).text(), "OR : 255");
    }
}
