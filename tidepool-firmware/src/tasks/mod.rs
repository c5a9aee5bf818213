//! Embassy async tasks
//!
//! The control loop owns the exhibit and never awaits anything but its
//! ticker; flash writes happen in the calibration task.

pub mod calibration;
pub mod control;

pub use calibration::calibration_task;
pub use control::control_task;
