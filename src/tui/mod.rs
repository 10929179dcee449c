//! Live terminal monitor for the ALU board.
//!
//! Provides an interactive view with:
//! - The simulated LCD contents as they are written
//! - Operand and selector controls
//! - Bus line state and a log of recent transactions

mod app;
mod ui;

pub use app::{MonitorApp, run_monitor};
