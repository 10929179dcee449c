//! # ALU8 LCD
//!
//! A signed 8-bit arithmetic/logic unit whose selected operation and
//! result are streamed continuously to a character LCD.
//!
//! The board is modelled at the level of its clock: a combinational ALU
//! and renderer are re-evaluated every tick, and a counter-paced sequencer
//! drives the display's parallel bus through initialization and an endless
//! refresh loop showing lines like `ADD: 008`.

pub mod alu;
pub mod display;
pub mod board;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use alu::{evaluate, Opcode, OpcodeError};
pub use display::{digits, mnemonic, Frame, Lcd, Sequencer, Step, Timing, TimingError, Transaction};
pub use board::{Board, Bus, Inputs};
pub use config::{load_config, save_config, ConfigError, SimConfig};

#[cfg(feature = "tui")]
pub use tui::run_monitor;
