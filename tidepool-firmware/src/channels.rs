//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use tidepool_core::config::CalibrationData;

/// Latest calibration table waiting to be written to flash
///
/// Raised by the control loop whenever a servo record changes. Only the
/// newest table matters, so a pending value is simply replaced.
pub static CALIBRATION_SAVE: Signal<CriticalSectionRawMutex, CalibrationData> = Signal::new();
