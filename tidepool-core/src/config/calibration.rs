//! Servo calibration table
//!
//! Holds the calibration record of every continuous rotation servo with a
//! header for validation. The firmware persists the whole table to flash
//! with postcard; in RAM it is also the [`CalibrationStore`] the control
//! loop reads and writes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::limits::MAX_CONT_ROT_SERVOS;
use crate::traits::{CalibrationStore, ServoCalibration, StorageError};

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x5345_5256; // "SERV"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// One servo's slot in the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoSlot {
    /// Servo index (0-based)
    pub servo_index: u8,
    /// Whether this slot holds a record
    pub valid: bool,
    /// The record
    pub calibration: ServoCalibration,
}

impl ServoSlot {
    /// Create a valid slot
    pub const fn new(servo_index: u8, calibration: ServoCalibration) -> Self {
        Self {
            servo_index,
            valid: true,
            calibration,
        }
    }

    /// Clear this slot
    pub fn clear(&mut self) {
        self.valid = false;
        self.calibration = ServoCalibration::default();
    }
}

/// Complete calibration data stored in flash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationData {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Servo records
    pub servos: [ServoSlot; MAX_CONT_ROT_SERVOS],
    /// CRC32 checksum (calculated over magic..servos)
    pub crc: u32,
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationData {
    /// Create empty calibration data
    pub const fn new() -> Self {
        Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            servos: [ServoSlot {
                servo_index: 0,
                valid: false,
                calibration: ServoCalibration {
                    zero_value: 0,
                    units_per_rev: 0,
                    position: 0,
                },
            }; MAX_CONT_ROT_SERVOS],
            crc: 0,
        }
    }

    /// Check if the header is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Get the record for a servo
    pub fn get(&self, servo_index: u8) -> Option<&ServoCalibration> {
        self.servos
            .iter()
            .find(|s| s.valid && s.servo_index == servo_index)
            .map(|s| &s.calibration)
    }

    /// Set the record for a servo
    ///
    /// Reuses the servo's slot or takes an empty one.
    /// Returns false if no slots are available.
    pub fn set(&mut self, servo_index: u8, calibration: ServoCalibration) -> bool {
        let slot = ServoSlot::new(servo_index, calibration);

        if let Some(existing) = self
            .servos
            .iter_mut()
            .find(|s| s.valid && s.servo_index == servo_index)
        {
            *existing = slot;
            return true;
        }

        if let Some(empty) = self.servos.iter_mut().find(|s| !s.valid) {
            *empty = slot;
            return true;
        }

        false
    }

    /// Clear the record for a servo
    pub fn clear_servo(&mut self, servo_index: u8) {
        for slot in &mut self.servos {
            if slot.servo_index == servo_index {
                slot.clear();
            }
        }
    }

    /// Number of servos with a record
    pub fn valid_count(&self) -> usize {
        self.servos.iter().filter(|s| s.valid).count()
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);

        for slot in &self.servos {
            crc = crc32_update(crc, &[slot.servo_index, slot.valid as u8]);
            crc = crc32_update(crc, &slot.calibration.zero_value.to_le_bytes());
            crc = crc32_update(crc, &slot.calibration.units_per_rev.to_le_bytes());
            crc = crc32_update(crc, &slot.calibration.position.to_le_bytes());
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

impl CalibrationStore for CalibrationData {
    fn load(&mut self, servo: u8) -> Result<Option<ServoCalibration>, StorageError> {
        Ok(self.get(servo).copied())
    }

    fn save(&mut self, servo: u8, calibration: &ServoCalibration) -> Result<(), StorageError> {
        if self.set(servo, *calibration) {
            Ok(())
        } else {
            Err(StorageError::Full)
        }
    }
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
