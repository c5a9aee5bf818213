//! Servo and LED controllers

pub mod crs;
pub mod led;
pub mod lrs;

pub use crs::{ContinuousRotationServo, ServoId};
pub use led::{Led, LedId};
pub use lrs::{LimitedRotationServo, LimitedServoId};
