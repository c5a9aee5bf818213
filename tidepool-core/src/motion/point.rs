//! Positions in continuous rotation servo units

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fish position, one coordinate per axis servo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    /// Home position
    pub const ORIGIN: Point3 = Point3::new(0, 0, 0);

    /// Create a point
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinates as `[x, y, z]`
    pub const fn axes(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Build from `[x, y, z]`
    pub const fn from_axes(axes: [i32; 3]) -> Self {
        Self::new(axes[0], axes[1], axes[2])
    }

    /// Per-axis displacement from `self` to `other`
    pub fn delta_to(self, other: Point3) -> [i64; 3] {
        [
            other.x as i64 - self.x as i64,
            other.y as i64 - self.y as i64,
            other.z as i64 - self.z as i64,
        ]
    }
}
