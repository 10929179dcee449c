//! Character display front-end.
//!
//! This module provides:
//! - [`render`] - Mnemonic and decimal digit rendering of a result
//! - [`sequencer`] - The tick-paced init/refresh state machine driving the bus
//! - [`lcd`] - A model of the character LCD receiving that bus

pub mod render;
pub mod sequencer;
pub mod lcd;

pub use render::{Frame, digits, mnemonic, mnemonic_for_bits};
pub use sequencer::{Pins, Sequencer, SequencerSnapshot, Step, Timing, TimingError, Transaction};
pub use lcd::{Command, Lcd};
