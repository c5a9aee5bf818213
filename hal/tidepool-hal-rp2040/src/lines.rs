//! GPIO line bookkeeping
//!
//! Tracks which GPIO lines already back a device so a board layout cannot
//! wire two servos, or a servo and an LED, to the same pin.

use heapless::FnvIndexSet;
use tidepool_core::traits::Line;

/// Number of user GPIO lines on RP2040
pub const GPIO_COUNT: u8 = 30;

/// Why a line could not be claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Not a GPIO on this chip
    OutOfRange,
    /// Already backs another device
    InUse,
}

/// Set of claimed GPIO lines
pub struct LineAllocator {
    claimed: FnvIndexSet<Line, 32>,
}

impl Default for LineAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAllocator {
    pub fn new() -> Self {
        Self {
            claimed: FnvIndexSet::new(),
        }
    }

    /// Claim `line` for a device
    pub fn claim(&mut self, line: Line) -> Result<(), LineError> {
        if line >= GPIO_COUNT {
            return Err(LineError::OutOfRange);
        }
        match self.claimed.insert(line) {
            Ok(true) => Ok(()),
            Ok(false) => Err(LineError::InUse),
            // Capacity exceeds GPIO_COUNT, so a full set means every line is taken
            Err(_) => Err(LineError::InUse),
        }
    }

    /// Check if a line is claimed
    pub fn is_claimed(&self, line: Line) -> bool {
        self.claimed.contains(&line)
    }

    /// Number of claimed lines
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }
}
