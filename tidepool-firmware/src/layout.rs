//! Exhibit wiring and the built-in show
//!
//! One aquarium: a fish on three continuous rotation axes with an
//! orientation servo, a jellyfish on a lift servo with an LED, four tap
//! sensors on the glass and a light sensor facing the room.

use heapless::Vec;

use tidepool_core::actuators::{LedId, LimitedServoId, ServoId};
use tidepool_core::aquarium::AquariumId;
use tidepool_core::config::{AquariumPolicy, JellyfishVisibility, TapReaction};
use tidepool_core::creatures::{FishId, JellyfishId};
use tidepool_core::motion::Point3;
use tidepool_core::sensors::{GroupId, LightId, PiezoId};
use tidepool_core::traits::{Board, CalibrationStore, Line};
use tidepool_core::{Error, Exhibit};

// ---- GPIO lines (PWM slice channel A pins) ----

pub const FISH_X_PWM: Line = 0;
pub const FISH_Y_PWM: Line = 2;
pub const FISH_Z_PWM: Line = 4;
pub const FISH_THETA_PWM: Line = 6;
pub const JELLYFISH_LIFT_PWM: Line = 8;
pub const JELLYFISH_LED: Line = 15;

// ---- Analog multiplexer lines ----

pub const FISH_X_POT: Line = 0;
pub const FISH_Y_POT: Line = 1;
pub const FISH_Z_POT: Line = 2;
pub const ROOM_LIGHT: Line = 3;
/// Glass corners, clockwise from the front left
pub const PIEZO_LINES: [Line; 4] = [8, 9, 10, 11];

// ---- Entity ids ----

pub const AQUARIUM: AquariumId = AquariumId::new(0);
pub const FISH: FishId = FishId::new(0);
pub const JELLYFISH: JellyfishId = JellyfishId::new(0);
pub const FISH_AXES: [ServoId; 3] = [ServoId::new(0), ServoId::new(1), ServoId::new(2)];
pub const FISH_THETA: LimitedServoId = LimitedServoId::new(0);
pub const JELLYFISH_LIFT: LimitedServoId = LimitedServoId::new(1);
pub const JELLYFISH_LIGHT: LedId = LedId::new(0);
pub const ROOM_LIGHT_SENSOR: LightId = LightId::new(0);
pub const GLASS: GroupId = GroupId::new(0);

const AXIS_LINES: [(Line, Line); 3] = [
    (FISH_X_PWM, FISH_X_POT),
    (FISH_Y_PWM, FISH_Y_POT),
    (FISH_Z_PWM, FISH_Z_POT),
];

/// Fish goal per glass corner, in the same order as [`PIEZO_LINES`]
const TAP_GOALS: [Point3; 4] = [
    Point3::new(40, 40, 60),
    Point3::new(40, 320, 60),
    Point3::new(320, 320, 60),
    Point3::new(320, 40, 60),
];

const PATROL: [Point3; 4] = [
    Point3::new(180, 60, 120),
    Point3::new(300, 180, 160),
    Point3::new(180, 300, 120),
    Point3::new(60, 180, 80),
];

/// The show used when flash holds no policy
pub fn default_policy() -> AquariumPolicy {
    let mut policy = AquariumPolicy {
        tap_reaction: TapReaction::ChaseTap,
        visibility: JellyfishVisibility::WhenDark,
        ..AquariumPolicy::default()
    };
    policy.tap_goals = Vec::from_slice(&TAP_GOALS).unwrap_or_default();
    policy.patrol = Vec::from_slice(&PATROL).unwrap_or_default();
    policy
}

/// Configure every entity of the exhibit
///
/// Axes with a stored calibration are restored, the others are calibrated
/// where they stand, which becomes their zero.
pub fn assemble<B: Board, S: CalibrationStore>(
    exhibit: &mut Exhibit<B, S>,
    policy: AquariumPolicy,
) -> Result<(), Error> {
    for (id, (control, pot)) in FISH_AXES.into_iter().zip(AXIS_LINES) {
        match exhibit.crs_init(id, control, pot, false) {
            Err(Error::UncalibratedServo(_)) => {
                defmt::warn!("Axis {} has no calibration, calibrating in place", id);
                exhibit.crs_init(id, control, pot, true)?;
            }
            other => other?,
        }
    }

    exhibit.lrs_init(FISH_THETA, FISH_THETA_PWM)?;
    exhibit.lrs_init(JELLYFISH_LIFT, JELLYFISH_LIFT_PWM)?;
    exhibit.led_init(JELLYFISH_LIGHT, JELLYFISH_LED)?;
    exhibit.light_init(ROOM_LIGHT_SENSOR, ROOM_LIGHT)?;

    exhibit.group_init(GLASS)?;
    for (index, line) in PIEZO_LINES.into_iter().enumerate() {
        let sensor = PiezoId::new(index as u8);
        exhibit.piezo_init(sensor, line)?;
        exhibit.group_add(GLASS, sensor)?;
    }

    exhibit.jellyfish_init(JELLYFISH, JELLYFISH_LIFT, JELLYFISH_LIGHT)?;
    exhibit.fish_init(FISH, FISH_AXES, FISH_THETA)?;
    exhibit.aquarium_init(AQUARIUM, FISH, JELLYFISH, ROOM_LIGHT_SENSOR, GLASS, policy)?;
    Ok(())
}
