//! Tidepool Hardware Abstraction Layer
//!
//! Storage abstractions shared between the chip-specific HALs. The control
//! logic in `tidepool-core` only talks to the synchronous I/O and
//! calibration traits; the firmware uses [`flash::FlashStorage`] to move
//! calibration tables and aquarium policies to and from non-volatile
//! memory.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tidepool-firmware                      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tidepool-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ tidepool-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
