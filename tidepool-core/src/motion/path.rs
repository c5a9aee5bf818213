//! Straight-line path with sub-goal decomposition
//!
//! A fish goal is split into `sub_steps` equal waypoints. Waypoint `k`
//! sits at fraction `k / sub_steps` of the displacement on every axis, so
//! all three axis servos reach each checkpoint together, and a stalled
//! axis shows up within one sub-step instead of only at the final goal.

// Host tests link std, whose inherent float methods take precedence
#[cfg_attr(test, allow(unused_imports))]
use micromath::F32Ext;

use super::Point3;

/// Straight path from a start to a target position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StraightPath {
    start: Point3,
    target: Point3,
    sub_steps: u8,
}

impl StraightPath {
    /// Create a path split into `sub_steps` waypoints (at least one)
    pub fn new(start: Point3, target: Point3, sub_steps: u8) -> Self {
        Self {
            start,
            target,
            sub_steps: sub_steps.max(1),
        }
    }

    /// Where the path begins
    pub fn start(&self) -> Point3 {
        self.start
    }

    /// Where the path ends
    pub fn target(&self) -> Point3 {
        self.target
    }

    /// Number of waypoints
    pub fn sub_steps(&self) -> u8 {
        self.sub_steps
    }

    /// Waypoint `k` of `sub_steps` (`k` is clamped; 0 is the start)
    pub fn waypoint(&self, k: u8) -> Point3 {
        let k = k.min(self.sub_steps) as i64;
        let n = self.sub_steps as i64;
        let start = self.start.axes();
        let delta = self.start.delta_to(self.target);

        let mut axes = [0i32; 3];
        for (i, axis) in axes.iter_mut().enumerate() {
            *axis = (start[i] as i64 + delta[i] * k / n) as i32;
        }
        Point3::from_axes(axes)
    }

    /// Travel along the axis that moves furthest
    pub fn longest_axis_distance(&self) -> u32 {
        self.start
            .delta_to(self.target)
            .iter()
            .map(|d| d.unsigned_abs().min(u32::MAX as u64) as u32)
            .max()
            .unwrap_or(0)
    }

    /// Travel of the longest axis within one sub-step, rounded up
    pub fn sub_step_distance(&self) -> u32 {
        self.longest_axis_distance().div_ceil(self.sub_steps as u32)
    }

    /// Each axis' share of the longest axis' travel, in `[0, 1]`
    ///
    /// Scaling per-axis velocities by these makes every axis arrive at
    /// the same time. All zero for a path that goes nowhere.
    pub fn speed_portions(&self) -> [f32; 3] {
        let longest = self.longest_axis_distance();
        if longest == 0 {
            return [0.0; 3];
        }
        let delta = self.start.delta_to(self.target);
        delta.map(|d| d.unsigned_abs() as f32 / longest as f32)
    }

    /// Direction of travel in the x/y plane (radians, 0 = +x)
    ///
    /// `None` for purely vertical or zero-length paths.
    pub fn heading(&self) -> Option<f32> {
        let [dx, dy, _] = self.start.delta_to(self.target);
        if dx == 0 && dy == 0 {
            return None;
        }
        Some((dy as f32).atan2(dx as f32))
    }
}
