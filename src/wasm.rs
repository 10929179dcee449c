//! WebAssembly bindings for the ALU board.
//!
//! This module provides JavaScript-friendly wrappers around the board and
//! its display.

use wasm_bindgen::prelude::*;
use crate::{Board, Inputs, Lcd, Opcode, Timing};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly board wrapper.
#[wasm_bindgen]
pub struct WasmBoard {
    board: Board,
    lcd: Lcd,
    inputs: Inputs,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create a board paced at `period` ticks per step with a `pulse_width` enable pulse.
    #[wasm_bindgen(constructor)]
    pub fn new(period: u32, pulse_width: u32) -> Result<WasmBoard, JsError> {
        let timing = Timing::new(period, pulse_width)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(Self {
            board: Board::with_timing(timing),
            lcd: Lcd::new(),
            inputs: Inputs::default(),
        })
    }
    
    /// Set operands and the active-low selector.
    #[wasm_bindgen]
    pub fn set_inputs(&mut self, a: i8, b: i8, selector: u8) {
        self.inputs = Inputs { a, b, selector };
    }
    
    /// Select an operation by mnemonic.
    #[wasm_bindgen]
    pub fn select(&mut self, op: &str) -> Result<(), JsError> {
        let op: Opcode = op.parse()
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.inputs.selector = op.selector();
        Ok(())
    }
    
    /// Run whole sequencer steps. Returns the bytes sent, in order.
    #[wasm_bindgen]
    pub fn run_steps(&mut self, steps: u32) -> js_sys::Uint8Array {
        let transactions = self.board.run_steps(steps as u64, &self.inputs, &mut self.lcd);
        let bytes: Vec<u8> = transactions.iter().map(|t| t.data).collect();
        js_sys::Uint8Array::from(&bytes[..])
    }
    
    /// Power-cycle the board and display.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.board.reset();
        self.lcd = Lcd::new();
    }
    
    /// A line of the display.
    #[wasm_bindgen]
    pub fn lcd_line(&self, row: usize) -> String {
        self.lcd.line(row)
    }
    
    /// The ALU result for the current inputs.
    #[wasm_bindgen]
    pub fn result(&self) -> i16 {
        self.inputs.result()
    }
    
    /// Name of the step the sequencer will decide next.
    #[wasm_bindgen]
    pub fn next_step(&self) -> String {
        format!("{:?}", self.board.seq.step())
    }
    
    /// Total ticks since reset.
    #[wasm_bindgen]
    pub fn ticks(&self) -> u64 {
        self.board.seq.ticks
    }
    
    /// Bus lines as a JSON string.
    #[wasm_bindgen]
    pub fn bus_json(&self) -> String {
        serde_json::to_string(&self.board.bus()).unwrap_or_default()
    }
}

/// Evaluate the ALU directly.
#[wasm_bindgen]
pub fn wasm_evaluate(a: i8, b: i8, op: &str) -> Result<i16, JsError> {
    let op: Opcode = op.parse()
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(crate::evaluate(a, b, op))
}
