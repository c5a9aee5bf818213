//! Piezo tap sensor

use crate::arena::{Entity, Handle};
use crate::config::PIEZO_MIN_TAP_VAL;
use crate::error::{EntityKind, Error};
use crate::traits::{AnalogInput, Line};

/// Handle to a piezo sensor
pub type PiezoId = Handle<PiezoSensor>;

/// Piezo disc glued to the tank glass
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PiezoSensor {
    line: Line,
    threshold: u16,
}

impl Entity for PiezoSensor {
    const KIND: EntityKind = EntityKind::PiezoSensor;
}

impl PiezoSensor {
    /// Create a new sensor with the default tap threshold
    pub fn new(line: Line) -> Self {
        Self::with_threshold(line, PIEZO_MIN_TAP_VAL)
    }

    pub fn with_threshold(line: Line, threshold: u16) -> Self {
        Self { line, threshold }
    }

    /// Tap strength, or 0 below the threshold
    ///
    /// Callers treat any nonzero value as a tap.
    pub fn is_fired<A>(&self, io: &mut A) -> Result<u16, Error>
    where
        A: AnalogInput + ?Sized,
    {
        let value = io.read_analog(self.line).map_err(Error::read(self.line))?;
        Ok(if value < self.threshold { 0 } else { value })
    }

    pub fn line(&self) -> Line {
        self.line
    }
}
