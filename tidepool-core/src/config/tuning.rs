//! Thresholds, angles, timings and servo pulse settings

use core::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Light sensor reading at and above which the room counts as light
pub const MIN_LIGHT_VAL: u16 = 100;

/// Piezo reading below which a tap is ignored
pub const PIEZO_MIN_TAP_VAL: u16 = 50;

/// Jellyfish lift angle when hidden
pub const JELLYFISH_RAISED_ANGLE: u8 = 0;

/// Jellyfish lift angle when shown
pub const JELLYFISH_LOWERED_ANGLE: u8 = 180;

/// Mechanical limit of a limited rotation servo (degrees)
pub const LRS_MAX_ANGLE: u8 = 180;

/// Straight-line sub-goals per fish goal
pub const FISH_SUB_STEPS_TO_GOAL: u8 = 10;

/// Fish orientation wiggle amplitude (degrees of the orientation servo)
pub const WIGGLE_AMPLITUDE: f32 = 10.0;

/// Fish orientation wiggle speed (rad/s)
pub const WIGGLE_SPEED: f32 = PI;

/// Fast polling cadence
pub const SHORT_TIME_STEP_MS: u32 = 10;

/// Slow polling cadence
pub const LONG_TIME_STEP_MS: u32 = 100;

/// Potentiometer reads averaged during calibration
pub const CALIBRATION_SAMPLES: u8 = 8;

/// Default fish travel speed (position units/s along the longest axis)
pub const DEFAULT_FISH_VELOCITY: u16 = 120;

/// Sub-step time budget multiplier over the expected travel time
pub const WATCHDOG_FACTOR: u32 = 3;

/// Extra sub-step time budget for start-up lag
pub const WATCHDOG_SLACK_MS: u32 = 500;

/// Re-dispatches of a stalled sub-goal before the goal is abandoned
pub const MAX_SUB_STEP_RETRIES: u8 = 2;

/// Servo pulse widths in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoPulseConfig {
    /// Pulse for angle 0 / full reverse
    pub min_us: u16,
    /// Pulse for stop (continuous rotation)
    pub neutral_us: u16,
    /// Pulse for the angle limit / full forward
    pub max_us: u16,
}

impl ServoPulseConfig {
    /// Hobby positional servo, 0-180° over 544-2400µs
    pub const fn limited() -> Self {
        Self {
            min_us: 544,
            neutral_us: 1472,
            max_us: 2400,
        }
    }

    /// Continuous rotation servo, stopped at 1500µs
    pub const fn continuous() -> Self {
        Self {
            min_us: 1000,
            neutral_us: 1500,
            max_us: 2000,
        }
    }

    /// Pulse for an absolute angle, clamped to the mechanical limit
    pub fn angle_to_pulse(&self, angle: u8) -> u16 {
        let angle = angle.min(LRS_MAX_ANGLE) as u32;
        let span = (self.max_us - self.min_us) as u32;
        self.min_us + (angle * span / LRS_MAX_ANGLE as u32) as u16
    }

    /// Pulse for a signed velocity, linear up to `full_speed`
    ///
    /// Zero maps to the neutral pulse; anything beyond `full_speed`
    /// saturates at the end stops.
    pub fn velocity_to_pulse(&self, velocity: i32, full_speed: u16) -> u16 {
        if velocity == 0 || full_speed == 0 {
            return self.neutral_us;
        }
        let full = full_speed as i32;
        let v = velocity.clamp(-full, full);
        let neutral = self.neutral_us as i32;
        let pulse = if v > 0 {
            neutral + v * (self.max_us as i32 - neutral) / full
        } else {
            neutral + v * (neutral - self.min_us as i32) / full
        };
        pulse.clamp(self.min_us as i32, self.max_us as i32) as u16
    }
}

/// Continuous rotation servo settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContinuousServoConfig {
    /// Velocity used until `set_velocity` is called (units/s)
    pub default_velocity: u16,
    /// Velocity reached at the end-stop pulse (units/s)
    pub full_speed_velocity: u16,
    /// Position units per output revolution, used for angle goals
    pub units_per_rev: u16,
    /// Longest elapsed time integrated by one step (ms)
    pub max_step_ms: u32,
    /// Drive pulse widths
    pub pulse: ServoPulseConfig,
}

impl Default for ContinuousServoConfig {
    fn default() -> Self {
        Self {
            default_velocity: 120,
            full_speed_velocity: 720,
            units_per_rev: 360,
            max_step_ms: 250,
            pulse: ServoPulseConfig::continuous(),
        }
    }
}
