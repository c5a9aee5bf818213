//! Jellyfish: a lift servo and a glow LED

use crate::actuators::{Led, LedId, LimitedRotationServo, LimitedServoId};
use crate::arena::{Arena, Entity, Handle};
use crate::config::{JELLYFISH_LOWERED_ANGLE, JELLYFISH_RAISED_ANGLE};
use crate::error::{EntityKind, Error};
use crate::traits::{DigitalOutput, PwmOutput};

/// Handle to a jellyfish
pub type JellyfishId = Handle<Jellyfish>;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Jellyfish {
    servo: LimitedServoId,
    led: LedId,
}

impl Entity for Jellyfish {
    const KIND: EntityKind = EntityKind::Jellyfish;
}

impl Jellyfish {
    pub fn new(servo: LimitedServoId, led: LedId) -> Self {
        Self { servo, led }
    }

    /// Lower into view and light up
    ///
    /// The servo is commanded before the LED. The LED is still switched
    /// when the servo write fails; the first error is returned.
    pub fn lower<O, const S: usize, const L: usize>(
        &self,
        servos: &mut Arena<LimitedRotationServo, S>,
        leds: &mut Arena<Led, L>,
        out: &mut O,
    ) -> Result<(), Error>
    where
        O: PwmOutput + DigitalOutput + ?Sized,
    {
        let moved = servos
            .get_mut(self.servo)
            .and_then(|s| s.set_angle(out, JELLYFISH_LOWERED_ANGLE));
        let lit = leds.get_mut(self.led).and_then(|l| l.turn_on(out));
        moved.and(lit)
    }

    /// Raise out of view and go dark, servo first
    pub fn raise<O, const S: usize, const L: usize>(
        &self,
        servos: &mut Arena<LimitedRotationServo, S>,
        leds: &mut Arena<Led, L>,
        out: &mut O,
    ) -> Result<(), Error>
    where
        O: PwmOutput + DigitalOutput + ?Sized,
    {
        let moved = servos
            .get_mut(self.servo)
            .and_then(|s| s.set_angle(out, JELLYFISH_RAISED_ANGLE));
        let dark = leds.get_mut(self.led).and_then(|l| l.turn_off(out));
        moved.and(dark)
    }

    pub fn servo(&self) -> LimitedServoId {
        self.servo
    }

    pub fn led(&self) -> LedId {
        self.led
    }
}
