//! Motion geometry
//!
//! Straight-line paths between fish positions, split into equal sub-goals
//! so independent per-axis servos stay synchronized.

pub mod path;
pub mod point;

pub use path::StraightPath;
pub use point::Point3;
