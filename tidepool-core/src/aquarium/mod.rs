//! Exhibit orchestration
//!
//! [`Scene`] owns every entity table, [`Aquarium`] ties one fish, one
//! jellyfish, a light sensor and a tap sensor group into a show, and
//! [`Exhibit`] owns the board, the calibration store and the aquariums
//! and is what the scheduler calls.

mod exhibit;
mod scene;
mod tank;

pub use exhibit::Exhibit;
pub use scene::Scene;
pub use tank::{Aquarium, AquariumId};
