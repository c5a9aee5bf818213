//! Board-agnostic control logic for the Tidepool aquarium exhibit
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (analog in, servo PWM out, digital out,
//!   calibration storage)
//! - Continuous and limited rotation servo controllers
//! - Tap and light sensors, LEDs
//! - Jellyfish and fish puppets, including the fish goal-seeking planner
//! - The aquarium orchestrator driven by a short and a long polling step
//! - Configuration, calibration and error types
//!
//! Every entity lives in a fixed-capacity [`arena::Arena`] and is referred
//! to through typed [`arena::Handle`]s. Nothing allocates; all waiting is
//! state carried between `step` calls.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod actuators;
pub mod aquarium;
pub mod arena;
pub mod config;
pub mod creatures;
pub mod error;
pub mod events;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod motion;
pub mod sensors;
pub mod traits;

pub use aquarium::{Aquarium, Exhibit, Scene};
pub use error::{EntityKind, Error};
