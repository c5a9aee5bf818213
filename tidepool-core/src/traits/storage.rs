//! Persistent calibration storage
//!
//! The store is keyed by continuous rotation servo index and must survive
//! power loss. Implementations decide how and when bytes reach flash; the
//! control loop only ever calls these two non-blocking methods.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors from the calibration store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StorageError {
    /// No free slot for another servo
    Full,
    /// Backing storage not reachable
    Unavailable,
    /// Stored data failed validation
    Corrupted,
}

/// What a continuous rotation servo persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoCalibration {
    /// Potentiometer reading at position zero
    pub zero_value: u16,
    /// Position units per output shaft revolution
    pub units_per_rev: u16,
    /// Last checkpointed position estimate
    pub position: i32,
}

/// Durable key-value store for servo calibration
pub trait CalibrationStore {
    /// Load the record for `servo`, `None` if it was never saved
    fn load(&mut self, servo: u8) -> Result<Option<ServoCalibration>, StorageError>;

    /// Save the record for `servo`
    fn save(&mut self, servo: u8, calibration: &ServoCalibration) -> Result<(), StorageError>;
}
