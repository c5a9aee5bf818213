//! Tap and light sensors
//!
//! All sensors are polled; none keeps state beyond its line and threshold.

pub mod group;
pub mod light;
pub mod piezo;

pub use group::{GroupId, PiezoSensorGroup, Tap};
pub use light::{LightId, LightSensor};
pub use piezo::{PiezoId, PiezoSensor};
