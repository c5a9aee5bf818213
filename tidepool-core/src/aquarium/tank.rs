//! Aquarium show logic
//!
//! Two cadences drive an aquarium. The short step polls the tap sensors
//! and keeps the fish moving; the long step watches the room light and
//! shows or hides the jellyfish. Fish arrivals come back through
//! [`Aquarium::on_fish_reached_goal`], which checkpoints the axis
//! positions and sends the fish to its next patrol point, so the fish
//! keeps swimming between taps.

use super::Scene;
use crate::arena::{Entity, Handle};
use crate::config::AquariumPolicy;
use crate::creatures::FishId;
use crate::creatures::JellyfishId;
use crate::error::{EntityKind, Error, FirstFault};
use crate::events::{emit, Event, EventQueue};
use crate::motion::Point3;
use crate::sensors::{GroupId, LightId, Tap};
use crate::traits::{Board, CalibrationStore};

/// Handle to an aquarium
pub type AquariumId = Handle<Aquarium>;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Aquarium {
    fish: FishId,
    jellyfish: JellyfishId,
    light_sensor: LightId,
    sensor_group: GroupId,
    policy: AquariumPolicy,
    /// Last light reading, `None` before the first long step
    is_light: Option<bool>,
    /// Jellyfish needs the visibility rule applied
    refresh: bool,
    /// Remaining tap cooldown (ms)
    cooldown_ms: u32,
    /// Remaining time a tap keeps the jellyfish lowered (ms)
    hold_ms: u32,
    patrol_index: usize,
}

impl Entity for Aquarium {
    const KIND: EntityKind = EntityKind::Aquarium;
}

impl Aquarium {
    pub fn new(
        fish: FishId,
        jellyfish: JellyfishId,
        light_sensor: LightId,
        sensor_group: GroupId,
        policy: AquariumPolicy,
    ) -> Self {
        Self {
            fish,
            jellyfish,
            light_sensor,
            sensor_group,
            policy,
            is_light: None,
            refresh: true,
            cooldown_ms: 0,
            hold_ms: 0,
            patrol_index: 0,
        }
    }

    /// Fast cadence: react to taps and step the fish
    pub fn short_step<B>(
        &mut self,
        id: AquariumId,
        scene: &mut Scene,
        io: &mut B,
        ms: u32,
        events: &mut EventQueue,
    ) -> Result<(), Error>
    where
        B: Board + ?Sized,
    {
        let mut faults = FirstFault::default();
        self.cooldown_ms = self.cooldown_ms.saturating_sub(ms);

        let tap = faults
            .record(
                scene
                    .groups
                    .get(self.sensor_group)
                    .and_then(|group| group.tapped(&scene.piezos, io)),
            )
            .flatten();

        if let Some(tap) = tap {
            if self.cooldown_ms == 0 {
                faults.record(self.on_tap(id, tap, scene, io, events));
            } else {
                trace!("Aquarium {} tap within cooldown", id);
            }
        }

        let fish = self.fish;
        faults.record(scene.fish.get_mut(fish).and_then(|f| {
            f.step(fish, &mut scene.servos, &mut scene.limited, io, ms, events)
        }));

        faults.into_result()
    }

    fn on_tap<B>(
        &mut self,
        id: AquariumId,
        tap: Tap,
        scene: &mut Scene,
        io: &mut B,
        events: &mut EventQueue,
    ) -> Result<(), Error>
    where
        B: Board + ?Sized,
    {
        self.cooldown_ms = self.policy.tap_cooldown_ms;
        info!(
            "Aquarium {} tapped on sensor {} (strength {})",
            id, tap.sensor, tap.strength
        );
        emit(
            events,
            Event::Tapped {
                aquarium: id,
                sensor: tap.sensor,
                slot: tap.slot,
                strength: tap.strength,
            },
        );

        let reaction = self.policy.tap_reaction;
        let mut faults = FirstFault::default();

        if reaction.chases() {
            match self.policy.tap_goal(tap.slot as usize) {
                Some(goal) => {
                    faults.record(self.send_fish(scene, goal));
                }
                None => debug!("No tap goal for slot {}", tap.slot),
            }
        }

        if reaction.lowers() {
            self.hold_ms = self.policy.jellyfish_hold_ms;
            self.refresh = true;
            faults.record(self.show_jellyfish(scene, io, true));
        }

        faults.into_result()
    }

    /// Slow cadence: apply the light rule to the jellyfish
    ///
    /// The first reading always applies the rule. Afterwards the jellyfish
    /// only moves on a light transition or when a tap hold runs out.
    pub fn long_step<B>(
        &mut self,
        id: AquariumId,
        scene: &mut Scene,
        io: &mut B,
        ms: u32,
        events: &mut EventQueue,
    ) -> Result<(), Error>
    where
        B: Board + ?Sized,
    {
        if self.hold_ms > 0 {
            self.hold_ms = self.hold_ms.saturating_sub(ms);
            if self.hold_ms == 0 {
                self.refresh = true;
            }
        }

        let is_light = scene.lights.get(self.light_sensor)?.is_light(io)?;
        if self.is_light != Some(is_light) {
            self.is_light = Some(is_light);
            self.refresh = true;
            info!("Aquarium {} light: {}", id, is_light);
            emit(events, Event::LightChanged { aquarium: id, is_light });
        }

        if self.refresh && self.hold_ms == 0 {
            let lowered = self.policy.visibility.lowered(is_light);
            self.show_jellyfish(scene, io, lowered)?;
            self.refresh = false;
        }

        Ok(())
    }

    /// Handle a fish arrival
    ///
    /// Ignored unless `fish` belongs to this aquarium. Saves the axis
    /// positions so a restart resumes from here, then heads for the next
    /// patrol point.
    pub fn on_fish_reached_goal<S>(
        &mut self,
        fish: FishId,
        scene: &mut Scene,
        store: &mut S,
    ) -> Result<(), Error>
    where
        S: CalibrationStore + ?Sized,
    {
        if fish != self.fish {
            return Ok(());
        }

        let mut faults = FirstFault::default();
        for axis in scene.fish.get(fish)?.axes() {
            faults.record(
                scene
                    .servos
                    .get(axis)
                    .and_then(|servo| servo.save(axis.index(), store)),
            );
        }
        faults.record(self.patrol(scene));
        faults.into_result()
    }

    /// Handle a fish giving up on its goal by moving on along the patrol
    pub fn on_fish_goal_unreachable(&mut self, fish: FishId, scene: &mut Scene) -> Result<(), Error> {
        if fish != self.fish {
            return Ok(());
        }
        self.patrol(scene)
    }

    fn patrol(&mut self, scene: &mut Scene) -> Result<(), Error> {
        let Some(goal) = self.policy.patrol_goal(self.patrol_index) else {
            return Ok(());
        };
        self.patrol_index = (self.patrol_index + 1) % self.policy.patrol.len();
        self.send_fish(scene, goal)
    }

    fn send_fish(&self, scene: &mut Scene, goal: Point3) -> Result<(), Error> {
        scene.fish.get_mut(self.fish)?.go_to(&mut scene.servos, goal)
    }

    fn show_jellyfish<B>(&self, scene: &mut Scene, io: &mut B, lowered: bool) -> Result<(), Error>
    where
        B: Board + ?Sized,
    {
        let jellyfish = scene.jellyfish.get(self.jellyfish)?;
        if lowered {
            debug!("Lowering jellyfish {}", self.jellyfish);
            jellyfish.lower(&mut scene.limited, &mut scene.leds, io)
        } else {
            debug!("Raising jellyfish {}", self.jellyfish);
            jellyfish.raise(&mut scene.limited, &mut scene.leds, io)
        }
    }

    pub fn fish(&self) -> FishId {
        self.fish
    }

    pub fn jellyfish(&self) -> JellyfishId {
        self.jellyfish
    }

    pub fn light_sensor(&self) -> LightId {
        self.light_sensor
    }

    pub fn sensor_group(&self) -> GroupId {
        self.sensor_group
    }

    pub fn policy(&self) -> &AquariumPolicy {
        &self.policy
    }

    /// Last light reading
    pub fn is_light(&self) -> Option<bool> {
        self.is_light
    }
}
