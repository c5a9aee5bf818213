//! Entity table capacities
//!
//! The exhibit topology is fixed, so every table is sized at compile time.

/// Continuous rotation servos (fish x/y/z axes plus a spare)
pub const MAX_CONT_ROT_SERVOS: usize = 4;

/// Limited rotation servos (jellyfish lift, fish orientation)
pub const MAX_LIM_ROT_SERVOS: usize = 4;

/// Piezo tap sensors
pub const MAX_PIEZO_SENSORS: usize = 8;

/// Light sensors
pub const MAX_LIGHT_SENSORS: usize = 2;

/// LEDs
pub const MAX_LEDS: usize = 4;

/// Jellyfish puppets
pub const MAX_JELLYFISH: usize = 2;

/// Fish puppets
pub const MAX_FISH: usize = 2;

/// Piezo sensor groups
pub const MAX_PIEZO_SENSOR_GROUPS: usize = 2;

/// Aquariums
pub const MAX_AQUARIUMS: usize = 1;

/// Patrol waypoints per aquarium
pub const MAX_PATROL_POINTS: usize = 8;

/// Events buffered within one tick
pub const EVENT_QUEUE_SIZE: usize = 16;
