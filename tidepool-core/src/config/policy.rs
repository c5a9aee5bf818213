//! Aquarium behavior policy
//!
//! How taps and room light map to fish and jellyfish reactions is a
//! configuration choice, not part of the control structure. The defaults
//! give the exhibit its standard show: the fish patrols, darts toward a
//! tapped sensor, and the jellyfish comes down with its light on when the
//! room goes dark.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::limits::{MAX_PATROL_POINTS, MAX_PIEZO_SENSORS};
use super::tuning::DEFAULT_FISH_VELOCITY;
use crate::motion::Point3;

/// What a detected tap triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TapReaction {
    /// Send the fish to the goal configured for the tapped sensor
    #[default]
    ChaseTap,
    /// Lower the jellyfish for a while
    LowerJellyfish,
    /// Both of the above
    ChaseAndLower,
    /// Taps are logged only
    Ignore,
}

impl TapReaction {
    /// Check if the fish should move toward the tap
    pub fn chases(self) -> bool {
        matches!(self, TapReaction::ChaseTap | TapReaction::ChaseAndLower)
    }

    /// Check if the jellyfish should come down
    pub fn lowers(self) -> bool {
        matches!(self, TapReaction::LowerJellyfish | TapReaction::ChaseAndLower)
    }
}

/// When the jellyfish is shown (lowered with its LED on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JellyfishVisibility {
    /// Shown in the dark, hidden in the light
    #[default]
    WhenDark,
    /// Shown in the light, hidden in the dark
    WhenLight,
}

impl JellyfishVisibility {
    /// Check if the jellyfish should be lowered for the given light level
    pub fn lowered(self, is_light: bool) -> bool {
        match self {
            JellyfishVisibility::WhenDark => !is_light,
            JellyfishVisibility::WhenLight => is_light,
        }
    }
}

/// Runtime behavior of one aquarium
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AquariumPolicy {
    /// Reaction to a tap
    pub tap_reaction: TapReaction,
    /// Jellyfish light rule
    pub visibility: JellyfishVisibility,
    /// Fish goal per tap sensor, indexed by the sensor's position in the group
    pub tap_goals: Vec<Point3, MAX_PIEZO_SENSORS>,
    /// Goals visited in turn whenever the fish is not chasing a tap
    pub patrol: Vec<Point3, MAX_PATROL_POINTS>,
    /// Taps within this window after a handled tap are ignored (ms)
    pub tap_cooldown_ms: u32,
    /// How long a tap keeps the jellyfish lowered (ms)
    pub jellyfish_hold_ms: u32,
    /// Fish travel speed (units/s along the longest axis)
    pub fish_velocity: u16,
}

impl Default for AquariumPolicy {
    fn default() -> Self {
        Self {
            tap_reaction: TapReaction::default(),
            visibility: JellyfishVisibility::default(),
            tap_goals: Vec::new(),
            patrol: Vec::new(),
            tap_cooldown_ms: 500,
            jellyfish_hold_ms: 5000,
            fish_velocity: DEFAULT_FISH_VELOCITY,
        }
    }
}

impl AquariumPolicy {
    /// Goal for the sensor at `slot` in the group, if one is configured
    pub fn tap_goal(&self, slot: usize) -> Option<Point3> {
        self.tap_goals.get(slot).copied()
    }

    /// Patrol goal at `index`, wrapping around the route
    pub fn patrol_goal(&self, index: usize) -> Option<Point3> {
        if self.patrol.is_empty() {
            None
        } else {
            self.patrol.get(index % self.patrol.len()).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_reaction_flags() {
        assert!(TapReaction::ChaseTap.chases());
        assert!(!TapReaction::ChaseTap.lowers());
        assert!(TapReaction::LowerJellyfish.lowers());
        assert!(!TapReaction::LowerJellyfish.chases());
        assert!(TapReaction::ChaseAndLower.chases());
        assert!(TapReaction::ChaseAndLower.lowers());
        assert!(!TapReaction::Ignore.chases());
        assert!(!TapReaction::Ignore.lowers());
    }

    #[test]
    fn test_visibility() {
        assert!(JellyfishVisibility::WhenDark.lowered(false));
        assert!(!JellyfishVisibility::WhenDark.lowered(true));
        assert!(JellyfishVisibility::WhenLight.lowered(true));
        assert!(!JellyfishVisibility::WhenLight.lowered(false));
    }

    #[test]
    fn test_patrol_wraps() {
        let mut policy = AquariumPolicy::default();
        assert_eq!(policy.patrol_goal(0), None);

        policy.patrol.push(Point3::new(1, 0, 0)).unwrap();
        policy.patrol.push(Point3::new(2, 0, 0)).unwrap();
        assert_eq!(policy.patrol_goal(0), Some(Point3::new(1, 0, 0)));
        assert_eq!(policy.patrol_goal(3), Some(Point3::new(2, 0, 0)));
    }

    #[test]
    fn test_tap_goal_lookup() {
        let mut policy = AquariumPolicy::default();
        policy.tap_goals.push(Point3::new(5, 5, 5)).unwrap();
        assert_eq!(policy.tap_goal(0), Some(Point3::new(5, 5, 5)));
        assert_eq!(policy.tap_goal(1), None);
    }
}
