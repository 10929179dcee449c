//! Monitor application state and logic.

use crate::{Board, Inputs, Lcd, Opcode, SimConfig, Transaction};
use std::collections::VecDeque;

/// Transactions kept for the log panel.
const HISTORY_LEN: usize = 64;

/// Monitor application state.
pub struct MonitorApp {
    /// The board being driven.
    pub board: Board,
    /// The display attached to the board.
    pub lcd: Lcd,
    /// Current input levels.
    pub inputs: Inputs,
    /// Recent transactions, newest last.
    pub history: VecDeque<Transaction>,
    /// Is the clock running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Sequencer steps advanced per UI frame while running.
    pub steps_per_frame: u64,
}

impl MonitorApp {
    /// Create a monitor from a run configuration.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            board: Board::with_timing(config.timing),
            lcd: Lcd::new(),
            inputs: config.inputs,
            history: VecDeque::with_capacity(HISTORY_LEN),
            running: true,
            should_quit: false,
            status: "Running. Press space to pause, 'q' to quit.".into(),
            steps_per_frame: 1,
        }
    }
    
    /// Advance one sequencer step.
    pub fn step(&mut self) {
        let transactions = self.board.run_steps(1, &self.inputs, &mut self.lcd);
        for t in transactions {
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(t);
        }
    }
    
    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        for _ in 0..self.steps_per_frame {
            self.step();
        }
    }
    
    /// Toggle the free-running clock.
    pub fn toggle_running(&mut self) {
        self.running = !self.running;
        self.status = if self.running { "Running.".into() } else { "Paused.".into() };
    }
    
    /// Change operand A by `delta`, wrapping.
    pub fn adjust_a(&mut self, delta: i8) {
        self.inputs.a = self.inputs.a.wrapping_add(delta);
        self.status = format!("A = {}", self.inputs.a);
    }
    
    /// Change operand B by `delta`, wrapping.
    pub fn adjust_b(&mut self, delta: i8) {
        self.inputs.b = self.inputs.b.wrapping_add(delta);
        self.status = format!("B = {}", self.inputs.b);
    }
    
    /// Select the next operation, as if pressing a different button combination.
    pub fn next_opcode(&mut self) {
        let op = self.inputs.opcode().next();
        self.inputs.selector = op.selector();
        self.status = format!("Selected {}", op);
    }
    
    /// Select an operation directly.
    pub fn select(&mut self, op: Opcode) {
        self.inputs.selector = op.selector();
        self.status = format!("Selected {}", op);
    }
    
    /// Power-cycle the board and display.
    pub fn reset(&mut self) {
        self.board.reset();
        self.lcd = Lcd::new();
        self.history.clear();
        self.status = "Reset.".into();
    }
    
    /// Speed up the clock.
    pub fn faster(&mut self) {
        self.steps_per_frame = (self.steps_per_frame * 2).min(1024);
        self.status = format!("{} steps/frame", self.steps_per_frame);
    }
    
    /// Slow down the clock.
    pub fn slower(&mut self) {
        self.steps_per_frame = (self.steps_per_frame / 2).max(1);
        self.status = format!("{} steps/frame", self.steps_per_frame);
    }
}

/// Run the monitor.
pub fn run_monitor(config: SimConfig) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;
    
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    
    let mut app = MonitorApp::new(&config);
    
    // Main loop
    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;
        
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char(' ') => app.toggle_running(),
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('a') => app.adjust_a(1),
                        KeyCode::Char('A') => app.adjust_a(-1),
                        KeyCode::Char('b') => app.adjust_b(1),
                        KeyCode::Char('B') => app.adjust_b(-1),
                        KeyCode::Char('o') => app.next_opcode(),
                        KeyCode::Char(c @ '0'..='7') => {
                            app.select(Opcode::from_bits(c as u8 - b'0'));
                        }
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Char('+') => app.faster(),
                        KeyCode::Char('-') => app.slower(),
                        _ => {}
                    }
                }
            }
        }
        
        app.tick();
        
        if app.should_quit {
            break;
        }
    }
    
    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timing;
    
    fn app() -> MonitorApp {
        let config = SimConfig {
            timing: Timing::new(16, 2).unwrap(),
            ..SimConfig::default()
        };
        MonitorApp::new(&config)
    }
    
    #[test]
    fn test_steps_fill_display() {
        let mut app = app();
        app.adjust_a(5);
        app.adjust_b(3);
        for _ in 0..13 {
            app.step();
        }
        assert_eq!(app.lcd.text(), "ADD: 008");
        assert_eq!(app.history.len(), 13);
    }
    
    #[test]
    fn test_opcode_cycles_through_selector() {
        let mut app = app();
        app.next_opcode();
        assert_eq!(app.inputs.opcode(), Opcode::Sub);
        assert_eq!(app.inputs.selector, 0b110);
    }
    
    #[test]
    fn test_history_is_bounded() {
        let mut app = app();
        for _ in 0..HISTORY_LEN + 10 {
            app.step();
        }
        assert_eq!(app.history.len(), HISTORY_LEN);
    }
    
    #[test]
    fn test_operands_wrap() {
        let mut app = app();
        app.adjust_a(-128);
        app.adjust_a(-1);
        assert_eq!(app.inputs.a, 127);
    }
}
