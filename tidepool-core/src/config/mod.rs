//! Configuration types
//!
//! Compile-time capacities, tuning constants, the runtime aquarium policy
//! and the calibration table that is persisted as postcard binary data.

pub mod calibration;
pub mod limits;
pub mod policy;
pub mod tuning;

pub use calibration::*;
pub use limits::*;
pub use policy::*;
pub use tuning::*;
