//! Continuous rotation servo controller
//!
//! A continuous rotation servo only takes a velocity, and the exhibit has
//! no absolute encoder on the fish axes. The position is dead-reckoned:
//! every `step` integrates the velocity that was applied during the
//! elapsed interval, then writes the drive for the next interval. The
//! potentiometer is only sampled during calibration to find the zero
//! reference.
//!
//! Integration runs in milli-units (velocity in units/s times elapsed
//! milliseconds) with the remainder carried between ticks, so slow
//! velocities accumulate instead of rounding to zero every tick.

use core::f32::consts::TAU;

// Host tests link std, whose inherent float methods take precedence
#[cfg_attr(test, allow(unused_imports))]
use micromath::F32Ext;

use crate::arena::{Entity, Handle};
use crate::config::{ContinuousServoConfig, CALIBRATION_SAMPLES};
use crate::error::{EntityKind, Error};
use crate::events::ServoEvent;
use crate::traits::{AnalogInput, CalibrationStore, Line, PwmOutput, ServoCalibration};

/// Handle to a continuous rotation servo
pub type ServoId = Handle<ContinuousRotationServo>;

/// Dead-reckoned velocity servo
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContinuousRotationServo {
    control_line: Line,
    pot_line: Line,
    /// Potentiometer reading at position zero
    zero_value: u16,
    /// Estimated absolute position (units)
    position: i32,
    target_position: i32,
    /// Speed used while seeking (units/s)
    target_velocity: u16,
    seeking: bool,
    /// Velocity currently driven on the control line (units/s, signed)
    applied_velocity: i32,
    /// Sub-unit remainder of the integration (milli-units)
    residual: i32,
    units_per_rev: u16,
    config: ContinuousServoConfig,
}

impl Entity for ContinuousRotationServo {
    const KIND: EntityKind = EntityKind::ContinuousServo;

    fn unconfigured(index: u8) -> Error {
        Error::UncalibratedServo(index)
    }
}

impl ContinuousRotationServo {
    fn with_calibration(
        control_line: Line,
        pot_line: Line,
        calibration: ServoCalibration,
        config: ContinuousServoConfig,
    ) -> Self {
        let units_per_rev = if calibration.units_per_rev == 0 {
            config.units_per_rev
        } else {
            calibration.units_per_rev
        };

        Self {
            control_line,
            pot_line,
            zero_value: calibration.zero_value,
            position: calibration.position,
            target_position: calibration.position,
            target_velocity: config.default_velocity.min(config.full_speed_velocity),
            seeking: false,
            applied_velocity: 0,
            residual: 0,
            units_per_rev,
            config,
        }
    }

    /// Calibrate a servo and persist the result
    ///
    /// Stops the drive, averages [`CALIBRATION_SAMPLES`] potentiometer
    /// reads into the zero reference and resets the position to 0.
    pub fn calibrate<B, S>(
        index: u8,
        control_line: Line,
        pot_line: Line,
        config: ContinuousServoConfig,
        io: &mut B,
        store: &mut S,
    ) -> Result<Self, Error>
    where
        B: AnalogInput + PwmOutput + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        io.write_pwm(control_line, config.pulse.neutral_us)
            .map_err(Error::write(control_line))?;

        let mut sum: u32 = 0;
        for _ in 0..CALIBRATION_SAMPLES {
            sum += io.read_analog(pot_line).map_err(Error::read(pot_line))? as u32;
        }
        let zero_value = (sum / CALIBRATION_SAMPLES as u32) as u16;

        let calibration = ServoCalibration {
            zero_value,
            units_per_rev: config.units_per_rev,
            position: 0,
        };
        store.save(index, &calibration)?;

        info!("Servo {} calibrated, zero at {}", index, zero_value);
        Ok(Self::with_calibration(control_line, pot_line, calibration, config))
    }

    /// Restore a servo from its saved calibration
    ///
    /// Fails with [`Error::UncalibratedServo`] if nothing was saved.
    pub fn restore<B, S>(
        index: u8,
        control_line: Line,
        pot_line: Line,
        config: ContinuousServoConfig,
        io: &mut B,
        store: &mut S,
    ) -> Result<Self, Error>
    where
        B: PwmOutput + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        let Some(calibration) = store.load(index)? else {
            warn!("Servo {} has no saved calibration", index);
            return Err(Error::UncalibratedServo(index));
        };

        io.write_pwm(control_line, config.pulse.neutral_us)
            .map_err(Error::write(control_line))?;

        info!(
            "Servo {} restored at position {}",
            index, calibration.position
        );
        Ok(Self::with_calibration(control_line, pot_line, calibration, config))
    }

    /// Start seeking `target` (position units)
    ///
    /// Takes effect on the next [`step`](Self::step). A target equal to
    /// the current estimate is reported reached on that step.
    pub fn start_moving_to(&mut self, target: i32) {
        self.target_position = target;
        self.seeking = true;
    }

    /// Start seeking an angle in degrees (0° is position 0)
    pub fn start_moving_to_degrees(&mut self, degrees: f32) {
        self.start_moving_to(self.angle_to_position(degrees / 360.0));
    }

    /// Start seeking an angle in radians (0 rad is position 0)
    pub fn start_moving_to_angle(&mut self, radians: f32) {
        self.start_moving_to(self.angle_to_position(radians / TAU));
    }

    fn angle_to_position(&self, revolutions: f32) -> i32 {
        (revolutions * self.units_per_rev as f32).round() as i32
    }

    /// Set the seeking speed (units/s)
    ///
    /// Only the magnitude is used; the direction always points at the
    /// target. Clamped to the configured full-speed velocity.
    pub fn set_velocity(&mut self, velocity: i32) {
        let max = self.config.full_speed_velocity as u32;
        self.target_velocity = velocity.unsigned_abs().min(max) as u16;
    }

    /// Advance the estimate by `ms` and update the drive
    ///
    /// Elapsed time is clamped to the configured maximum step, so a late
    /// tick cannot throw the estimate far off. The estimate never moves
    /// past the target: crossing it snaps to the target, the drive is
    /// stopped and [`ServoEvent::GoalReached`] is returned. If the stop
    /// write fails the arrival is still reported, the estimate keeps
    /// integrating the running drive, and the next step retries the stop.
    pub fn step<O>(&mut self, out: &mut O, ms: u32) -> Result<Option<ServoEvent>, Error>
    where
        O: PwmOutput + ?Sized,
    {
        let ms = ms.min(self.config.max_step_ms);
        self.integrate(ms);

        if !self.seeking {
            // A failed stop write leaves the drive running; retry it
            if self.applied_velocity != 0 {
                self.drive(out, 0)?;
            }
            return Ok(None);
        }

        if self.position == self.target_position {
            self.seeking = false;
            self.residual = 0;
            trace!("Servo on line {} reached {}", self.control_line, self.position);
            // The arrival stands; a failed stop is retried and reported next step
            if let Err(e) = self.drive(out, 0) {
                warn!("Servo on line {} failed to stop: {}", self.control_line, e);
            }
            return Ok(Some(ServoEvent::GoalReached));
        }

        let direction = (self.target_position - self.position).signum();
        let velocity = direction * self.target_velocity as i32;
        if velocity != self.applied_velocity {
            self.drive(out, velocity)?;
        }
        Ok(None)
    }

    fn integrate(&mut self, ms: u32) {
        if self.applied_velocity == 0 {
            return;
        }

        let total = self.residual as i64 + self.applied_velocity as i64 * ms as i64;
        let before = self.position as i64;
        let mut after = before + total / 1000;
        self.residual = (total % 1000) as i32;

        if self.seeking {
            let target = self.target_position as i64;
            let crossed = (before < target && after >= target) || (before > target && after <= target);
            if crossed {
                after = target;
                self.residual = 0;
            }
        }

        self.position = after.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    }

    fn drive<O>(&mut self, out: &mut O, velocity: i32) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        let pulse = self
            .config
            .pulse
            .velocity_to_pulse(velocity, self.config.full_speed_velocity);
        out.write_pwm(self.control_line, pulse)
            .map_err(Error::write(self.control_line))?;

        if velocity.signum() != self.applied_velocity.signum() {
            self.residual = 0;
        }
        self.applied_velocity = velocity;
        Ok(())
    }

    /// Cancel the goal and stop the drive
    pub fn stop<O>(&mut self, out: &mut O) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        self.seeking = false;
        self.target_position = self.position;
        self.drive(out, 0)
    }

    /// Persist the current position with the calibration
    pub fn save<S>(&self, index: u8, store: &mut S) -> Result<(), Error>
    where
        S: CalibrationStore + ?Sized,
    {
        store.save(index, &self.calibration())?;
        debug!("Servo {} saved at {}", index, self.position);
        Ok(())
    }

    /// Current position estimate (no I/O)
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Position being sought
    pub fn target_position(&self) -> i32 {
        self.target_position
    }

    /// Seeking speed (units/s)
    pub fn velocity(&self) -> u16 {
        self.target_velocity
    }

    /// Check if a goal is pending
    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// Potentiometer reading at position zero
    pub fn zero_value(&self) -> u16 {
        self.zero_value
    }

    /// Potentiometer line
    pub fn pot_line(&self) -> Line {
        self.pot_line
    }

    /// What [`save`](Self::save) persists
    pub fn calibration(&self) -> ServoCalibration {
        ServoCalibration {
            zero_value: self.zero_value,
            units_per_rev: self.units_per_rev,
            position: self.position,
        }
    }
}
