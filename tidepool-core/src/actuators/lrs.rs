//! Limited rotation servo controller
//!
//! Positional hobby servo commanded straight to an absolute angle. The
//! servo does its own position control, so there is nothing to advance
//! between ticks.

use crate::arena::{Entity, Handle};
use crate::config::{ServoPulseConfig, LRS_MAX_ANGLE};
use crate::error::{EntityKind, Error};
use crate::traits::{Line, PwmOutput};

/// Handle to a limited rotation servo
pub type LimitedServoId = Handle<LimitedRotationServo>;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LimitedRotationServo {
    control_line: Line,
    /// Last angle successfully commanded
    angle: Option<u8>,
    pulse: ServoPulseConfig,
}

impl Entity for LimitedRotationServo {
    const KIND: EntityKind = EntityKind::LimitedServo;
}

impl LimitedRotationServo {
    /// Create a new servo on `control_line` with the standard pulse range
    pub fn new(control_line: Line) -> Self {
        Self::with_pulse(control_line, ServoPulseConfig::limited())
    }

    /// Create a new servo with custom pulse widths
    pub fn with_pulse(control_line: Line, pulse: ServoPulseConfig) -> Self {
        Self {
            control_line,
            angle: None,
            pulse,
        }
    }

    /// Command `angle` degrees, clamped to the mechanical limit
    pub fn set_angle<O>(&mut self, out: &mut O, angle: u8) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        let angle = angle.min(LRS_MAX_ANGLE);
        out.write_pwm(self.control_line, self.pulse.angle_to_pulse(angle))
            .map_err(Error::write(self.control_line))?;
        self.angle = Some(angle);
        Ok(())
    }

    /// Nothing to advance; the servo holds its commanded angle
    pub fn step(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Last commanded angle, `None` before the first command
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn control_line(&self) -> Line {
        self.control_line
    }
}
