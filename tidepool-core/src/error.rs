//! Error taxonomy for the exhibit controller
//!
//! Every boundary function (`init`, `go_to`, `step`, sensor polls,
//! actuator commands) returns [`Error`] instead of corrupting state.
//! Nothing in this crate panics; composite steps keep stepping their
//! remaining actuators after a fault and report the first one at the end.

use crate::traits::{IoError, StorageError};

/// Which entity table an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntityKind {
    ContinuousServo,
    LimitedServo,
    PiezoSensor,
    LightSensor,
    Led,
    Jellyfish,
    Fish,
    PiezoSensorGroup,
    Aquarium,
}

/// Errors returned by the control logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Index outside the configured table, or an unconfigured slot
    InvalidId { kind: EntityKind, index: u8 },
    /// Continuous rotation servo used before calibration or restore
    UncalibratedServo(u8),
    /// Analog read failed on the given line
    SensorReadFailure { line: u8 },
    /// PWM or digital write failed on the given line
    ActuatorWriteFailure { line: u8 },
    /// Fish gave up on its goal after exhausting sub-goal retries
    GoalUnreachable(u8),
    /// Calibration store failed
    Storage(StorageError),
    /// Sensor group has no room for another member
    GroupFull,
}

impl Error {
    /// Map a failed analog read on `line`
    pub fn read(line: u8) -> impl FnOnce(IoError) -> Self {
        move |_| Error::SensorReadFailure { line }
    }

    /// Map a failed actuator write on `line`
    pub fn write(line: u8) -> impl FnOnce(IoError) -> Self {
        move |_| Error::ActuatorWriteFailure { line }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

/// Keeps the first fault seen while stepping several actuators
#[derive(Debug, Default)]
pub(crate) struct FirstFault(Option<Error>);

impl FirstFault {
    /// Record `result`'s error if it is the first one
    pub(crate) fn record<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                if self.0.is_none() {
                    self.0 = Some(e);
                }
                None
            }
        }
    }

    /// Ok if nothing failed, otherwise the first error
    pub(crate) fn into_result(self) -> Result<(), Error> {
        match self.0 {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
