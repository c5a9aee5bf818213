//! Entity tables of the exhibit

use crate::actuators::{ContinuousRotationServo, Led, LimitedRotationServo};
use crate::arena::Arena;
use crate::config::{
    MAX_CONT_ROT_SERVOS, MAX_FISH, MAX_JELLYFISH, MAX_LEDS, MAX_LIGHT_SENSORS,
    MAX_LIM_ROT_SERVOS, MAX_PIEZO_SENSORS, MAX_PIEZO_SENSOR_GROUPS,
};
use crate::creatures::{Fish, Jellyfish};
use crate::sensors::{LightSensor, PiezoSensor, PiezoSensorGroup};

/// Every entity the aquariums refer to
///
/// Entities are created once at startup and live as long as the scene.
/// Composites reference each other only through handles into these
/// tables.
pub struct Scene {
    pub servos: Arena<ContinuousRotationServo, MAX_CONT_ROT_SERVOS>,
    pub limited: Arena<LimitedRotationServo, MAX_LIM_ROT_SERVOS>,
    pub piezos: Arena<PiezoSensor, MAX_PIEZO_SENSORS>,
    pub lights: Arena<LightSensor, MAX_LIGHT_SENSORS>,
    pub leds: Arena<Led, MAX_LEDS>,
    pub jellyfish: Arena<Jellyfish, MAX_JELLYFISH>,
    pub fish: Arena<Fish, MAX_FISH>,
    pub groups: Arena<PiezoSensorGroup, MAX_PIEZO_SENSOR_GROUPS>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            servos: Arena::new(),
            limited: Arena::new(),
            piezos: Arena::new(),
            lights: Arena::new(),
            leds: Arena::new(),
            jellyfish: Arena::new(),
            fish: Arena::new(),
            groups: Arena::new(),
        }
    }
}
