//! Character LCD receiver model.
//!
//! Watches the parallel bus the sequencer drives and behaves like an
//! HD44780-style controller: on each falling edge of enable it latches the
//! data byte and either executes it as a command (RS low) or stores it as
//! a character at the address counter (RS high).

use crate::display::sequencer::Pins;
use serde::{Serialize, Deserialize};

/// Size of display data RAM.
pub const DDRAM_SIZE: usize = 80;
/// Bytes of DDRAM per line in two-line mode.
pub const LINE_SPAN: usize = 40;
/// DDRAM address of the second line in two-line mode.
pub const LINE2_BASE: u8 = 0x40;
/// Visible characters per line.
pub const LINE_WIDTH: usize = 16;
/// Visible lines.
pub const LINES: usize = 2;

/// A decoded controller instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Clear,
    Home,
    EntryMode { increment: bool, shift: bool },
    DisplayControl { display: bool, cursor: bool, blink: bool },
    Shift { display: bool, right: bool },
    FunctionSet { eight_bit: bool, two_lines: bool },
    SetCgramAddress(u8),
    SetDdramAddress(u8),
}

impl Command {
    /// Decode an instruction byte by its highest set bit.
    ///
    /// Returns `None` for 0x00, which the controller ignores.
    pub fn decode(byte: u8) -> Option<Self> {
        let set = |mask: u8| byte & mask != 0;
        let cmd = match byte.leading_zeros() {
            0 => Command::SetDdramAddress(byte & 0x7F),
            1 => Command::SetCgramAddress(byte & 0x3F),
            2 => Command::FunctionSet { eight_bit: set(0x10), two_lines: set(0x08) },
            3 => Command::Shift { display: set(0x08), right: set(0x04) },
            4 => Command::DisplayControl { display: set(0x04), cursor: set(0x02), blink: set(0x01) },
            5 => Command::EntryMode { increment: set(0x02), shift: set(0x01) },
            6 => Command::Home,
            7 => Command::Clear,
            _ => return None,
        };
        Some(cmd)
    }
}

/// The LCD controller and its display RAM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lcd {
    #[serde(with = "ddram_serde")]
    ddram: [u8; DDRAM_SIZE],
    address: u8,
    cgram_address: u8,
    increment: bool,
    display_on: bool,
    cursor: bool,
    blink: bool,
    eight_bit: bool,
    two_lines: bool,
    powered: bool,
    last_en: bool,
    /// Commands executed since power-on.
    pub instruction_count: u64,
    /// Characters written since power-on.
    pub data_write_count: u64,
}

impl Lcd {
    /// Create an unpowered controller with blank RAM.
    pub fn new() -> Self {
        Self {
            ddram: [b' '; DDRAM_SIZE],
            address: 0,
            cgram_address: 0,
            increment: true,
            display_on: false,
            cursor: false,
            blink: false,
            eight_bit: true,
            two_lines: false,
            powered: false,
            last_en: false,
            instruction_count: 0,
            data_write_count: 0,
        }
    }
    
    /// Sample the bus for one tick.
    ///
    /// Returns true when a byte was latched on this tick.
    pub fn observe(&mut self, pins: Pins, power: bool) -> bool {
        if !power {
            if self.powered {
                *self = Self::new();
            }
            return false;
        }
        self.powered = true;
        
        let falling = self.last_en && !pins.en;
        self.last_en = pins.en;
        if !falling || pins.rw {
            return false;
        }
        
        if pins.rs {
            self.write_data(pins.data);
        } else if let Some(cmd) = Command::decode(pins.data) {
            self.execute(cmd);
        }
        true
    }
    
    /// Execute an instruction.
    pub fn execute(&mut self, cmd: Command) {
        self.instruction_count += 1;
        tracing::trace!(?cmd, "lcd command");
        match cmd {
            Command::Clear => {
                self.ddram = [b' '; DDRAM_SIZE];
                self.address = 0;
                self.increment = true;
            }
            Command::Home => {
                self.address = 0;
            }
            Command::EntryMode { increment, shift: _ } => {
                self.increment = increment;
            }
            Command::DisplayControl { display, cursor, blink } => {
                self.display_on = display;
                self.cursor = cursor;
                self.blink = blink;
            }
            Command::Shift { display: false, right } => {
                self.address = self.step_address(self.address, right);
            }
            Command::Shift { display: true, .. } => {
                // Display shifting is not modelled; the window stays at column 0.
            }
            Command::FunctionSet { eight_bit, two_lines } => {
                self.eight_bit = eight_bit;
                self.two_lines = two_lines;
                // The address counter must stay valid for the new line layout.
                self.address = self.normalize(self.address);
            }
            Command::SetCgramAddress(addr) => {
                self.cgram_address = addr;
            }
            Command::SetDdramAddress(addr) => {
                self.address = self.normalize(addr);
            }
        }
    }
    
    /// Store a character at the address counter and move the counter.
    pub fn write_data(&mut self, byte: u8) {
        self.data_write_count += 1;
        let index = self.index(self.address);
        self.ddram[index] = byte;
        self.address = self.step_address(self.address, self.increment);
    }
    
    /// The visible characters of a line; blank when the display is off.
    pub fn line(&self, row: usize) -> String {
        if !self.display_on || row >= LINES || (row == 1 && !self.two_lines) {
            return " ".repeat(LINE_WIDTH);
        }
        let base = if row == 0 { 0 } else { self.index(LINE2_BASE) };
        self.ddram[base..base + LINE_WIDTH].iter().map(|&c| glyph(c)).collect()
    }
    
    /// First line with trailing blanks removed.
    pub fn text(&self) -> String {
        self.line(0).trim_end().to_string()
    }
    
    /// Current DDRAM address counter.
    pub fn address(&self) -> u8 {
        self.address
    }
    
    pub fn is_display_on(&self) -> bool {
        self.display_on
    }
    
    pub fn is_two_line(&self) -> bool {
        self.two_lines
    }
    
    pub fn is_eight_bit(&self) -> bool {
        self.eight_bit
    }
    
    pub fn is_powered(&self) -> bool {
        self.powered
    }
    
    fn normalize(&self, addr: u8) -> u8 {
        if self.two_lines {
            let line2 = addr >= LINE2_BASE;
            let column = (addr & 0x3F) % LINE_SPAN as u8;
            if line2 { LINE2_BASE + column } else { column }
        } else {
            addr % DDRAM_SIZE as u8
        }
    }
    
    fn index(&self, addr: u8) -> usize {
        if self.two_lines && addr >= LINE2_BASE {
            LINE_SPAN + (addr - LINE2_BASE) as usize % LINE_SPAN
        } else {
            addr as usize % DDRAM_SIZE
        }
    }
    
    fn step_address(&self, addr: u8, forward: bool) -> u8 {
        if self.two_lines {
            // 0x27 runs on to 0x40 and 0x67 wraps to 0x00.
            let linear = self.index(addr) as i16;
            let next = (linear + if forward { 1 } else { -1 }).rem_euclid(DDRAM_SIZE as i16) as usize;
            if next >= LINE_SPAN {
                LINE2_BASE + (next - LINE_SPAN) as u8
            } else {
                next as u8
            }
        } else {
            let next = addr as i16 + if forward { 1 } else { -1 };
            next.rem_euclid(DDRAM_SIZE as i16) as u8
        }
    }
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a character code to a printable glyph.
fn glyph(code: u8) -> char {
    if code.is_ascii_graphic() || code == b' ' {
        code as char
    } else {
        '?'
    }
}

mod ddram_serde {
    use super::DDRAM_SIZE;
    use serde::{Deserialize, Deserializer, Serializer};
    
    pub fn serialize<S: Serializer>(ddram: &[u8; DDRAM_SIZE], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(ddram)
    }
    
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; DDRAM_SIZE], D::Error> {
        let bytes = Vec::<u8>::deserialize(d)?;
        bytes.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::invalid_length(v.len(), &"80 bytes of display RAM")
        })
    }
}
