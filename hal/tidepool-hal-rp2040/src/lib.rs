//! RP2040-specific HAL for the Tidepool exhibit
//!
//! Implements the `tidepool-core` I/O traits and the `tidepool-hal`
//! storage trait on top of embassy-rp:
//!
//! - Servo pulse outputs on PWM slices at 50 Hz with 1 µs resolution
//! - Analog inputs behind 8:1 multiplexers sharing three select lines
//! - LED outputs on plain GPIO
//! - Line bookkeeping so one GPIO never backs two devices
//! - Flash storage driver (implements `tidepool_hal::FlashStorage`)

#![no_std]

pub mod board;
pub mod flash;
pub mod lines;

pub use board::{AnalogMux, BoardError, Rp2040Board};

// Re-export shared traits from tidepool-hal for convenience
pub use tidepool_hal::{FlashStorage as FlashStorageTrait, StorageKey};
