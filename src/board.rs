//! Top-level wiring of the ALU board.
//!
//! Every tick the board re-evaluates the ALU and renderer from the current
//! operand and selector inputs, then clocks the display sequencer with the
//! fresh frame. Nothing is cached between ticks, so an input change shows up
//! the next time the sequencer reaches a step that reads it.

use crate::alu::{self, Opcode};
use crate::display::{Frame, Lcd, Pins, Sequencer, Timing, Transaction};
use serde::{Serialize, Deserialize};

/// External inputs, sampled continuously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Operand A.
    pub a: i8,
    /// Operand B.
    pub b: i8,
    /// Active-low operation selector (three buttons, pressed = 0).
    pub selector: u8,
}

impl Inputs {
    /// Inputs selecting `op` with the given operands.
    pub fn new(a: i8, b: i8, op: Opcode) -> Self {
        Self { a, b, selector: op.selector() }
    }
    
    /// The operation the selector currently encodes.
    pub fn opcode(&self) -> Opcode {
        Opcode::from_selector(self.selector)
    }
    
    /// The ALU output for these inputs.
    pub fn result(&self) -> i16 {
        alu::evaluate(self.a, self.b, self.opcode())
    }
    
    /// The line these inputs should produce on the display.
    pub fn frame(&self) -> Frame {
        Frame::compute(self.a, self.b, self.opcode())
    }
}

impl Default for Inputs {
    fn default() -> Self {
        Self::new(0, 0, Opcode::Add)
    }
}

/// Board output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    /// LCD data bus.
    pub data: u8,
    /// Register select: low for commands, high for characters.
    pub rs: bool,
    /// Read/write: held low (write).
    pub rw: bool,
    /// Enable strobe.
    pub en: bool,
    /// LCD power, held high.
    pub lcd_on: bool,
    /// LCD backlight, held high.
    pub backlight: bool,
}

impl Bus {
    /// The LCD control lines alone.
    pub fn pins(&self) -> Pins {
        Pins { data: self.data, rs: self.rs, rw: self.rw, en: self.en }
    }
}

/// The ALU board: combinational ALU and renderer feeding the sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// The display sequencer, the only state on the board.
    pub seq: Sequencer,
}

impl Board {
    /// Create a board with the reference timing.
    pub fn new() -> Self {
        Self::with_timing(Timing::REFERENCE)
    }
    
    /// Create a board with custom sequencer timing.
    pub fn with_timing(timing: Timing) -> Self {
        Self { seq: Sequencer::with_timing(timing) }
    }
    
    /// Power-on reset.
    pub fn reset(&mut self) {
        tracing::info!("board reset");
        self.seq.reset();
    }
    
    /// Advance one clock tick with the current inputs.
    ///
    /// Returns the transaction decided on this tick, if any.
    pub fn tick(&mut self, inputs: &Inputs) -> Option<Transaction> {
        let frame = inputs.frame();
        self.seq.tick(&frame)
    }
    
    /// Current output lines.
    pub fn bus(&self) -> Bus {
        let pins = self.seq.pins();
        Bus {
            data: pins.data,
            rs: pins.rs,
            rw: pins.rw,
            en: pins.en,
            lcd_on: true,
            backlight: true,
        }
    }
    
    /// Run `ticks` clock ticks, feeding every bus change to `lcd`.
    ///
    /// Ticks where no output line can change are skipped in bulk; inputs are
    /// only read on ticks that decide a step, so the result is identical to
    /// ticking one at a time. Returns the transactions decided.
    pub fn run_ticks(&mut self, ticks: u64, inputs: &Inputs, lcd: &mut Lcd) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        let mut remaining = ticks;
        
        while remaining > 0 {
            let idle = remaining.min(u32::MAX as u64) as u32;
            remaining -= self.seq.skip_idle(idle) as u64;
            if remaining == 0 {
                break;
            }
            
            if let Some(t) = self.tick(inputs) {
                transactions.push(t);
            }
            let bus = self.bus();
            lcd.observe(bus.pins(), bus.lcd_on);
            remaining -= 1;
        }
        
        transactions
    }
    
    /// Ticks spanned by `steps` whole sequencer periods, saturating at `u64::MAX`.
    pub fn ticks_for_steps(&self, steps: u64) -> u64 {
        steps.saturating_mul(self.seq.timing().period() as u64)
    }
    
    /// Run `steps` whole sequencer periods.
    pub fn run_steps(&mut self, steps: u64, inputs: &Inputs, lcd: &mut Lcd) -> Vec<Transaction> {
        let ticks = self.ticks_for_steps(steps);
        self.run_ticks(ticks, inputs, lcd)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Step;
    
    fn fast() -> Timing {
        Timing::new(32, 8).unwrap()
    }
    
    #[test]
    fn test_inputs_default_is_add() {
        let inputs = Inputs::default();
        assert_eq!(inputs.selector, 0b111);
        assert_eq!(inputs.opcode(), Opcode::Add);
    }
    
    #[test]
    fn test_auxiliary_lines_held_high() {
        let mut board = Board::with_timing(fast());
        let inputs = Inputs::default();
        for _ in 0..100 {
            board.tick(&inputs);
            let bus = board.bus();
            assert!(bus.lcd_on);
            assert!(bus.backlight);
            assert!(!bus.rw);
        }
    }
    
    #[test]
    fn test_run_steps_matches_single_ticks() {
        let inputs = Inputs::new(-7, 3, Opcode::Mul);
        
        let mut fast_board = Board::with_timing(fast());
        let mut fast_lcd = Lcd::new();
        let bulk = fast_board.run_steps(30, &inputs, &mut fast_lcd);
        
        let mut slow_board = Board::with_timing(fast());
        let mut slow_lcd = Lcd::new();
        let mut single = Vec::new();
        for _ in 0..30 * 32 {
            if let Some(t) = slow_board.tick(&inputs) {
                single.push(t);
            }
            let bus = slow_board.bus();
            slow_lcd.observe(bus.pins(), bus.lcd_on);
        }
        
        assert_eq!(bulk, single);
        assert_eq!(bulk.len(), 30);
        assert_eq!(fast_board.seq.ticks, slow_board.seq.ticks);
        assert_eq!(fast_lcd.text(), slow_lcd.text());
        assert_eq!(fast_lcd.text(), "MUL: 235");
    }
    
    #[test]
    fn test_input_change_shows_on_next_pass() {
        let mut board = Board::with_timing(fast());
        let mut lcd = Lcd::new();
        
        let first = Inputs::new(5, 3, Opcode::Add);
        board.run_steps(13, &first, &mut lcd);
        assert_eq!(lcd.text(), "ADD: 008");
        assert_eq!(board.seq.step(), Step::MnemonicChar0);
        
        let second = Inputs::new(5, 3, Opcode::Sub);
        board.run_steps(9, &second, &mut lcd);
        assert_eq!(lcd.text(), "SUB: 002");
    }
    
    #[test]
    fn test_ticks_for_steps_saturates() {
        let board = Board::new();
        assert_eq!(board.ticks_for_steps(13), 13 << 20);
        assert_eq!(board.ticks_for_steps(u64::MAX / 2), u64::MAX);
        assert_eq!(Board::with_timing(fast()).ticks_for_steps(0), 0);
    }
    
    #[test]
    fn test_deserialized_board_keeps_stepping() {
        let json = r#"{ "seq": {
            "timing": { "period": 32, "pulse_width": 8 },
            "step": 4, "count": 1000,
            "pins": { "data": 0, "rs": false, "rw": false, "en": false }
        } }"#;
        let mut board: Board = serde_json::from_str(json).unwrap();
        let mut lcd = Lcd::new();
        let transactions = board.run_steps(3, &Inputs::default(), &mut lcd);
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].step, Step::MnemonicChar0);
    }
    
    #[test]
    fn test_reset_restarts_init() {
        let mut board = Board::with_timing(fast());
        let mut lcd = Lcd::new();
        board.run_steps(6, &Inputs::default(), &mut lcd);
        board.reset();
        assert_eq!(board.seq.step(), Step::Init8BitMode);
        assert_eq!(board.seq.count(), 0);
        let t = board.tick(&Inputs::default());
        assert_eq!(t.map(|t| t.step), Some(Step::Init8BitMode));
    }
}
