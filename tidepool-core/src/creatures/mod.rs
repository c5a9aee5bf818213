//! Animated puppets built from servos and LEDs
//!
//! Creatures never own their actuators. They hold handles into the
//! servo and LED tables and are handed those tables on every call.

pub mod fish;
pub mod jellyfish;

pub use fish::{Fish, FishId, FishState};
pub use jellyfish::{Jellyfish, JellyfishId};
