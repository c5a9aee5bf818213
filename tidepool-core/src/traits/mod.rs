//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and the
//! board-specific implementations. The core only ever calls into them;
//! timers, PWM peripherals and flash belong to the implementor.

pub mod io;
pub mod storage;

pub use io::{AnalogInput, Board, DigitalOutput, IoError, Line, PwmOutput};
pub use storage::{CalibrationStore, ServoCalibration, StorageError};
