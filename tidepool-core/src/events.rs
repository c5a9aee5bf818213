//! Events raised while stepping
//!
//! Goal completion is reported synchronously: a servo's `step` returns a
//! [`ServoEvent`], and composites push [`Event`]s onto an [`EventQueue`]
//! that the exhibit drains before the tick ends, so handlers run in a
//! fixed order within the same tick.

use heapless::Deque;

use crate::aquarium::AquariumId;
use crate::config::EVENT_QUEUE_SIZE;
use crate::creatures::FishId;
use crate::sensors::PiezoId;

/// Result of stepping a continuous rotation servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoEvent {
    /// The position estimate reached the target; the drive is stopped
    GoalReached,
}

/// Exhibit-level events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Fish arrived at its final goal
    FishGoalReached(FishId),
    /// Fish abandoned its goal after the sub-goal watchdog gave up
    FishGoalUnreachable(FishId),
    /// A tap was handled by an aquarium
    Tapped {
        aquarium: AquariumId,
        sensor: PiezoId,
        /// Position of the sensor in the aquarium's group
        slot: u8,
        /// Raw piezo reading
        strength: u16,
    },
    /// The room light level changed (or was read for the first time)
    LightChanged { aquarium: AquariumId, is_light: bool },
}

impl Event {
    /// Fish the event concerns, if any
    pub fn fish(&self) -> Option<FishId> {
        match self {
            Event::FishGoalReached(fish) | Event::FishGoalUnreachable(fish) => Some(*fish),
            _ => None,
        }
    }
}

/// Pending events of the current tick
pub type EventQueue = Deque<Event, EVENT_QUEUE_SIZE>;

/// Queue `event`, dropping it with a warning if the queue is full
pub(crate) fn emit(queue: &mut EventQueue, event: Event) {
    if queue.push_back(event).is_err() {
        warn!("Event queue full, dropping {}", event);
    }
}
