//! Room light sensor

use crate::arena::{Entity, Handle};
use crate::config::MIN_LIGHT_VAL;
use crate::error::{EntityKind, Error};
use crate::traits::{AnalogInput, Line};

/// Handle to a light sensor
pub type LightId = Handle<LightSensor>;

/// Photoresistor divider; higher readings mean more light
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightSensor {
    line: Line,
    threshold: u16,
}

impl Entity for LightSensor {
    const KIND: EntityKind = EntityKind::LightSensor;
}

impl LightSensor {
    /// Create a new sensor with the default light threshold
    pub fn new(line: Line) -> Self {
        Self::with_threshold(line, MIN_LIGHT_VAL)
    }

    pub fn with_threshold(line: Line, threshold: u16) -> Self {
        Self { line, threshold }
    }

    /// True at and above the threshold
    pub fn is_light<A>(&self, io: &mut A) -> Result<bool, Error>
    where
        A: AnalogInput + ?Sized,
    {
        let value = io.read_analog(self.line).map_err(Error::read(self.line))?;
        Ok(value >= self.threshold)
    }

    pub fn line(&self) -> Line {
        self.line
    }
}
