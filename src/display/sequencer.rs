//! Cycle-driven display sequencer.
//!
//! Walks a character LCD through its initialization commands and then
//! loops forever redrawing the mnemonic and result digits. A free-running
//! tick counter paces the steps: each wrap of the counter decides one
//! transaction and raises enable, and enable drops again a fixed number of
//! ticks later so the display latches the byte on the falling edge.

use crate::display::render::Frame;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Ticks per sequencer step in the reference hardware (2^20).
pub const STEP_PERIOD_TICKS: u32 = 1 << 20;

/// Ticks enable stays high at the start of each step.
pub const ENABLE_HIGH_TICKS: u32 = 0x2000;

/// Function set: 8-bit interface, two lines, 5x8 font.
pub const CMD_FUNCTION_SET: u8 = 0x38;
/// Display on, cursor off, blink off.
pub const CMD_DISPLAY_ON: u8 = 0x0C;
/// Clear display and home the cursor.
pub const CMD_CLEAR: u8 = 0x01;
/// Entry mode: increment, no shift.
pub const CMD_ENTRY_MODE: u8 = 0x06;
/// Set DDRAM address 0 (start of the first line).
pub const CMD_CURSOR_HOME: u8 = 0x80;

/// Pacing of the sequencer in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTiming", into = "RawTiming")]
pub struct Timing {
    period: u32,
    pulse_width: u32,
}

impl Timing {
    /// The reference board timing: 2^20 ticks per step, 0x2000 high.
    pub const REFERENCE: Timing = Timing {
        period: STEP_PERIOD_TICKS,
        pulse_width: ENABLE_HIGH_TICKS,
    };
    
    /// Create a timing. The pulse must be non-empty and end inside the period.
    pub fn new(period: u32, pulse_width: u32) -> Result<Self, TimingError> {
        if pulse_width == 0 {
            return Err(TimingError::ZeroPulse);
        }
        if pulse_width >= period {
            return Err(TimingError::PulseTooLong { pulse_width, period });
        }
        Ok(Self { period, pulse_width })
    }
    
    /// Ticks per sequencer step.
    pub fn period(&self) -> u32 {
        self.period
    }
    
    /// Ticks enable stays high after each step decision.
    pub fn pulse_width(&self) -> u32 {
        self.pulse_width
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::REFERENCE
    }
}

#[derive(Serialize, Deserialize)]
struct RawTiming {
    period: u32,
    pulse_width: u32,
}

impl TryFrom<RawTiming> for Timing {
    type Error = TimingError;
    
    fn try_from(raw: RawTiming) -> Result<Self, Self::Error> {
        Timing::new(raw.period, raw.pulse_width)
    }
}

impl From<Timing> for RawTiming {
    fn from(t: Timing) -> Self {
        RawTiming { period: t.period, pulse_width: t.pulse_width }
    }
}

/// Errors from building a [`Timing`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("enable pulse width must be at least one tick")]
    ZeroPulse,
    
    #[error("enable pulse width {pulse_width} must be shorter than the step period {period}")]
    PulseTooLong { pulse_width: u32, period: u32 },
}

/// One step of the initialization and refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    // ==================== Initialization ====================
    
    Init8BitMode,
    DisplayOn,
    Clear,
    EntryMode,
    
    // ==================== Refresh loop ====================
    
    MnemonicChar0,
    MnemonicChar1,
    MnemonicChar2,
    Colon,
    Space,
    DigitHundreds,
    DigitTens,
    DigitOnes,
    CursorHome,
}

impl Step {
    /// All steps in sequence order.
    pub const ALL: [Step; 13] = [
        Step::Init8BitMode,
        Step::DisplayOn,
        Step::Clear,
        Step::EntryMode,
        Step::MnemonicChar0,
        Step::MnemonicChar1,
        Step::MnemonicChar2,
        Step::Colon,
        Step::Space,
        Step::DigitHundreds,
        Step::DigitTens,
        Step::DigitOnes,
        Step::CursorHome,
    ];
    
    /// Number of steps.
    pub const COUNT: usize = Self::ALL.len();
    
    /// First step of the refresh loop.
    pub const REFRESH_START: Step = Step::MnemonicChar0;
    
    /// Position in the sequence.
    pub const fn index(self) -> u8 {
        self as u8
    }
    
    /// Step at a raw position, if in range.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
    
    /// The step that follows this one. The last refresh step loops back.
    pub fn next(self) -> Self {
        match self {
            Step::CursorHome => Self::REFRESH_START,
            other => Self::ALL[other as usize + 1],
        }
    }
    
    /// True for the four one-time initialization steps.
    pub const fn is_init(self) -> bool {
        (self as u8) < (Self::REFRESH_START as u8)
    }
    
    /// Register select: false for commands, true for character data.
    pub const fn register_select(self) -> bool {
        !matches!(
            self,
            Step::Init8BitMode | Step::DisplayOn | Step::Clear | Step::EntryMode | Step::CursorHome
        )
    }
    
    /// The byte this step presents, reading the current frame.
    pub const fn data(self, frame: &Frame) -> u8 {
        match self {
            Step::Init8BitMode => CMD_FUNCTION_SET,
            Step::DisplayOn => CMD_DISPLAY_ON,
            Step::Clear => CMD_CLEAR,
            Step::EntryMode => CMD_ENTRY_MODE,
            Step::MnemonicChar0 => frame.mnemonic[0],
            Step::MnemonicChar1 => frame.mnemonic[1],
            Step::MnemonicChar2 => frame.mnemonic[2],
            Step::Colon => b':',
            Step::Space => b' ',
            Step::DigitHundreds => frame.digits[0],
            Step::DigitTens => frame.digits[1],
            Step::DigitOnes => frame.digits[2],
            Step::CursorHome => CMD_CURSOR_HOME,
        }
    }
}

/// A byte handed to the display at the start of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The step that produced this transaction.
    pub step: Step,
    /// Command or character byte.
    pub data: u8,
    /// Register select: false = command, true = data.
    pub rs: bool,
    /// Read/write: always false (write).
    pub rw: bool,
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.rs { "DATA" } else { "CMD " };
        write!(f, "{:<14} {} 0x{:02X}", format!("{:?}", self.step), kind, self.data)?;
        if self.rs && (self.data.is_ascii_graphic() || self.data == b' ') {
            write!(f, " '{}'", self.data as char)?;
        }
        Ok(())
    }
}

/// Latched output lines of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pins {
    pub data: u8,
    pub rs: bool,
    pub rw: bool,
    pub en: bool,
}

/// Serializable sequencer state.
///
/// `step` is a raw index so that snapshots from elsewhere can carry any
/// value; restoring an out-of-range step restarts initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerSnapshot {
    pub step: u8,
    pub count: u32,
    pub pins: Pins,
}

/// The display sequencer.
///
/// Serialized through [`SequencerState`] so that loaded state passes the
/// same checks as [`Sequencer::restore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SequencerState", into = "SequencerState")]
pub struct Sequencer {
    timing: Timing,
    step: Step,
    count: u32,
    pins: Pins,
    /// Total ticks seen since reset.
    pub ticks: u64,
    /// Total step decisions since reset.
    pub steps: u64,
}

impl Sequencer {
    /// Create a sequencer with the reference timing.
    pub fn new() -> Self {
        Self::with_timing(Timing::REFERENCE)
    }
    
    /// Create a sequencer with custom timing.
    pub fn with_timing(timing: Timing) -> Self {
        Self {
            timing,
            step: Step::Init8BitMode,
            count: 0,
            pins: Pins::default(),
            ticks: 0,
            steps: 0,
        }
    }
    
    /// Return to power-on state, keeping the timing.
    pub fn reset(&mut self) {
        *self = Self::with_timing(self.timing);
    }
    
    /// Advance one clock tick.
    ///
    /// On a counter wrap the current step's transaction is decided from
    /// `frame`, latched onto the pins with enable high, and returned. When
    /// the counter reaches the pulse width enable drops. Otherwise the pins
    /// hold.
    pub fn tick(&mut self, frame: &Frame) -> Option<Transaction> {
        let mut decided = None;
        
        if self.count == 0 {
            decided = Some(self.decide(frame));
        } else if self.count == self.timing.pulse_width {
            self.pins.en = false;
        }
        
        self.count += 1;
        if self.count == self.timing.period {
            self.count = 0;
        }
        self.ticks += 1;
        
        decided
    }
    
    fn decide(&mut self, frame: &Frame) -> Transaction {
        let step = self.step;
        let transaction = Transaction {
            step,
            data: step.data(frame),
            rs: step.register_select(),
            rw: false,
        };
        
        self.pins = Pins {
            data: transaction.data,
            rs: transaction.rs,
            rw: transaction.rw,
            en: true,
        };
        self.step = step.next();
        self.steps += 1;
        
        tracing::debug!(step = ?step, data = transaction.data, rs = transaction.rs, "sequencer step");
        transaction
    }
    
    /// Ticks until the next tick that changes the pins.
    ///
    /// Zero means the next call to [`tick`](Self::tick) is an edge.
    pub fn ticks_until_edge(&self) -> u32 {
        if self.count == 0 || self.count == self.timing.pulse_width {
            0
        } else if self.count < self.timing.pulse_width {
            self.timing.pulse_width - self.count
        } else {
            self.timing.period - self.count
        }
    }
    
    /// Advance up to `n` idle ticks without crossing an edge.
    ///
    /// Returns the number of ticks actually skipped.
    pub fn skip_idle(&mut self, n: u32) -> u32 {
        let skipped = n.min(self.ticks_until_edge());
        self.count += skipped;
        if self.count == self.timing.period {
            self.count = 0;
        }
        self.ticks += skipped as u64;
        skipped
    }
    
    /// The step that the next counter wrap will decide.
    pub fn step(&self) -> Step {
        self.step
    }
    
    /// Position of the free-running counter within the current period.
    pub fn count(&self) -> u32 {
        self.count
    }
    
    /// Current output lines.
    pub fn pins(&self) -> Pins {
        self.pins
    }
    
    /// The pacing in use.
    pub fn timing(&self) -> Timing {
        self.timing
    }
    
    /// Capture the state for later restore.
    pub fn snapshot(&self) -> SequencerSnapshot {
        SequencerSnapshot {
            step: self.step.index(),
            count: self.count,
            pins: self.pins,
        }
    }
    
    /// Restore a snapshot.
    ///
    /// An unknown step index restarts initialization from a clean state.
    pub fn restore(&mut self, snapshot: &SequencerSnapshot) {
        match Step::from_index(snapshot.step) {
            Some(step) => {
                self.step = step;
                self.count = snapshot.count % self.timing.period;
                self.pins = snapshot.pins;
            }
            None => {
                tracing::warn!(step = snapshot.step, "invalid sequencer step, restarting initialization");
                self.step = Step::Init8BitMode;
                self.count = 0;
                self.pins = Pins::default();
            }
        }
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk form of a [`Sequencer`].
#[derive(Serialize, Deserialize)]
struct SequencerState {
    timing: Timing,
    #[serde(flatten)]
    snapshot: SequencerSnapshot,
    #[serde(default)]
    ticks: u64,
    #[serde(default)]
    steps: u64,
}

impl From<SequencerState> for Sequencer {
    fn from(state: SequencerState) -> Self {
        let mut seq = Sequencer::with_timing(state.timing);
        seq.restore(&state.snapshot);
        seq.ticks = state.ticks;
        seq.steps = state.steps;
        seq
    }
}

impl From<Sequencer> for SequencerState {
    fn from(seq: Sequencer) -> Self {
        SequencerState {
            timing: seq.timing,
            snapshot: seq.snapshot(),
            ticks: seq.ticks,
            steps: seq.steps,
        }
    }
}
