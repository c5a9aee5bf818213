//! Calibration store used by the control loop
//!
//! Keeps the table in RAM so `load`/`save` never block the tick, and hands
//! every changed table to the calibration task for the flash write.

use tidepool_core::config::CalibrationData;
use tidepool_core::traits::{CalibrationStore, ServoCalibration, StorageError};

use crate::channels::CALIBRATION_SAVE;

pub struct FlashMirroredStore {
    table: CalibrationData,
}

impl FlashMirroredStore {
    pub fn new(table: CalibrationData) -> Self {
        Self { table }
    }
}

impl CalibrationStore for FlashMirroredStore {
    fn load(&mut self, servo: u8) -> Result<Option<ServoCalibration>, StorageError> {
        self.table.load(servo)
    }

    fn save(&mut self, servo: u8, calibration: &ServoCalibration) -> Result<(), StorageError> {
        if self.table.get(servo) == Some(calibration) {
            return Ok(());
        }
        self.table.save(servo, calibration)?;
        self.table.update_crc();
        CALIBRATION_SAVE.signal(self.table.clone());
        Ok(())
    }
}
