//! In-memory board for host tests and simulations
//!
//! Records the last pulse and level written to every line and serves
//! programmable analog readings. Lines can be marked failing to exercise
//! fault isolation. The most recent output writes are kept in order so
//! tests can check sequencing across lines.

use heapless::Deque;

use crate::traits::{AnalogInput, DigitalOutput, IoError, Line, PwmOutput};

/// Number of lines the mock board exposes
pub const MOCK_LINES: usize = 32;

/// Output writes remembered by the log
pub const MOCK_LOG_LEN: usize = 16;

/// A successful output write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Pwm(Line, u16),
    Digital(Line, bool),
}

/// Simulated board
#[derive(Debug, Clone)]
pub struct MockBoard {
    analog: [u16; MOCK_LINES],
    pwm: [Option<u16>; MOCK_LINES],
    digital: [bool; MOCK_LINES],
    failing: u32,
    pwm_writes: u32,
    log: Deque<Write, MOCK_LOG_LEN>,
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBoard {
    /// Create a board with all inputs at zero and nothing written
    pub const fn new() -> Self {
        Self {
            analog: [0; MOCK_LINES],
            pwm: [None; MOCK_LINES],
            digital: [false; MOCK_LINES],
            failing: 0,
            pwm_writes: 0,
            log: Deque::new(),
        }
    }

    /// Set the value returned by analog reads on `line`
    pub fn set_analog(&mut self, line: Line, value: u16) {
        if let Some(slot) = self.analog.get_mut(line as usize) {
            *slot = value;
        }
    }

    /// Last pulse written to `line`
    pub fn pwm(&self, line: Line) -> Option<u16> {
        self.pwm.get(line as usize).copied().flatten()
    }

    /// Current level of `line`
    pub fn digital(&self, line: Line) -> bool {
        self.digital.get(line as usize).copied().unwrap_or(false)
    }

    /// Total PWM writes so far
    pub fn pwm_writes(&self) -> u32 {
        self.pwm_writes
    }

    /// Recent output writes, oldest first
    pub fn writes(&self) -> impl Iterator<Item = &Write> {
        self.log.iter()
    }

    /// Forget the logged writes
    pub fn clear_writes(&mut self) {
        self.log.clear();
    }

    fn record(&mut self, write: Write) {
        if self.log.is_full() {
            self.log.pop_front();
        }
        let _ = self.log.push_back(write);
    }

    /// Make every access to `line` fail with a hardware error
    pub fn fail_line(&mut self, line: Line) {
        if (line as usize) < MOCK_LINES {
            self.failing |= 1 << line;
        }
    }

    /// Undo [`fail_line`](Self::fail_line)
    pub fn heal_line(&mut self, line: Line) {
        if (line as usize) < MOCK_LINES {
            self.failing &= !(1 << line);
        }
    }

    fn check(&self, line: Line) -> Result<usize, IoError> {
        let index = line as usize;
        if index >= MOCK_LINES {
            Err(IoError::InvalidLine)
        } else if self.failing & (1 << line) != 0 {
            Err(IoError::Hardware)
        } else {
            Ok(index)
        }
    }
}

impl AnalogInput for MockBoard {
    fn read_analog(&mut self, line: Line) -> Result<u16, IoError> {
        let index = self.check(line)?;
        Ok(self.analog[index])
    }
}

impl PwmOutput for MockBoard {
    fn write_pwm(&mut self, line: Line, pulse_us: u16) -> Result<(), IoError> {
        let index = self.check(line)?;
        self.pwm[index] = Some(pulse_us);
        self.pwm_writes += 1;
        self.record(Write::Pwm(line, pulse_us));
        Ok(())
    }
}

impl DigitalOutput for MockBoard {
    fn write_digital(&mut self, line: Line, high: bool) -> Result<(), IoError> {
        let index = self.check(line)?;
        self.digital[index] = high;
        self.record(Write::Digital(line, high));
        Ok(())
    }
}
