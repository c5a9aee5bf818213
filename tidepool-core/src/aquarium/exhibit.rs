//! The exhibit: board, calibration store, scene and aquariums
//!
//! Every operation takes typed handles and fails with a typed [`Error`]
//! instead of touching a slot that was never configured. Events raised
//! while stepping are dispatched before the step returns, so a fish that
//! arrives during a short step already has its next goal when the
//! scheduler regains control.

use super::{Aquarium, AquariumId, Scene};
use crate::actuators::{ContinuousRotationServo, Led, LedId, LimitedRotationServo, LimitedServoId, ServoId};
use crate::arena::Arena;
use crate::config::{AquariumPolicy, ContinuousServoConfig, DEFAULT_FISH_VELOCITY, MAX_AQUARIUMS};
use crate::creatures::{Fish, FishId, Jellyfish, JellyfishId};
use crate::error::{Error, FirstFault};
use crate::events::{Event, EventQueue, ServoEvent};
use crate::motion::Point3;
use crate::sensors::{GroupId, LightId, LightSensor, PiezoId, PiezoSensor, PiezoSensorGroup, Tap};
use crate::traits::{Board, CalibrationStore, Line};

/// Hook called with every dispatched event
pub type EventObserver = fn(&Event);

/// Top-level controller
pub struct Exhibit<B, S> {
    board: B,
    store: S,
    scene: Scene,
    aquariums: Arena<Aquarium, MAX_AQUARIUMS>,
    events: EventQueue,
    servo_config: ContinuousServoConfig,
    observer: Option<EventObserver>,
}

impl<B: Board, S: CalibrationStore> Exhibit<B, S> {
    /// Create an exhibit with an empty scene
    pub fn new(board: B, store: S) -> Self {
        Self {
            board,
            store,
            scene: Scene::new(),
            aquariums: Arena::new(),
            events: EventQueue::new(),
            servo_config: ContinuousServoConfig::default(),
            observer: None,
        }
    }

    /// Use `config` for continuous rotation servos initialized from now on
    pub fn with_servo_config(mut self, config: ContinuousServoConfig) -> Self {
        self.servo_config = config;
        self
    }

    /// Call `observer` for every event dispatched
    pub fn set_observer(&mut self, observer: EventObserver) {
        self.observer = Some(observer);
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn aquarium(&self, id: AquariumId) -> Result<&Aquarium, Error> {
        self.aquariums.get(id)
    }

    // ---- Continuous rotation servos ----

    /// Configure a continuous rotation servo
    ///
    /// With `calibrate` the zero reference is measured and saved;
    /// otherwise the saved calibration and position are restored, failing
    /// with [`Error::UncalibratedServo`] if there are none.
    pub fn crs_init(
        &mut self,
        id: ServoId,
        control_line: Line,
        pot_line: Line,
        calibrate: bool,
    ) -> Result<(), Error> {
        self.scene.servos.check_range(id)?;
        let servo = if calibrate {
            ContinuousRotationServo::calibrate(
                id.index(),
                control_line,
                pot_line,
                self.servo_config,
                &mut self.board,
                &mut self.store,
            )?
        } else {
            ContinuousRotationServo::restore(
                id.index(),
                control_line,
                pot_line,
                self.servo_config,
                &mut self.board,
                &mut self.store,
            )?
        };
        self.scene.servos.init(id, servo)?;
        Ok(())
    }

    pub fn crs_start_moving_to(&mut self, id: ServoId, position: i32) -> Result<(), Error> {
        self.scene.servos.get_mut(id)?.start_moving_to(position);
        Ok(())
    }

    pub fn crs_start_moving_to_degrees(&mut self, id: ServoId, degrees: f32) -> Result<(), Error> {
        self.scene.servos.get_mut(id)?.start_moving_to_degrees(degrees);
        Ok(())
    }

    pub fn crs_start_moving_to_angle(&mut self, id: ServoId, radians: f32) -> Result<(), Error> {
        self.scene.servos.get_mut(id)?.start_moving_to_angle(radians);
        Ok(())
    }

    pub fn crs_set_velocity(&mut self, id: ServoId, velocity: i32) -> Result<(), Error> {
        self.scene.servos.get_mut(id)?.set_velocity(velocity);
        Ok(())
    }

    /// Step a servo on its own; the returned event is the goal callback
    pub fn crs_step(&mut self, id: ServoId, ms: u32) -> Result<Option<ServoEvent>, Error> {
        self.scene.servos.get_mut(id)?.step(&mut self.board, ms)
    }

    pub fn crs_get_pos(&self, id: ServoId) -> Result<i32, Error> {
        Ok(self.scene.servos.get(id)?.position())
    }

    /// Persist the servo's calibration and current position
    pub fn crs_save(&mut self, id: ServoId) -> Result<(), Error> {
        self.scene.servos.get(id)?.save(id.index(), &mut self.store)
    }

    pub fn crs_stop(&mut self, id: ServoId) -> Result<(), Error> {
        self.scene.servos.get_mut(id)?.stop(&mut self.board)
    }

    // ---- Limited rotation servos ----

    pub fn lrs_init(&mut self, id: LimitedServoId, control_line: Line) -> Result<(), Error> {
        self.scene
            .limited
            .init(id, LimitedRotationServo::new(control_line))?;
        Ok(())
    }

    pub fn lrs_set_angle(&mut self, id: LimitedServoId, angle: u8) -> Result<(), Error> {
        self.scene.limited.get_mut(id)?.set_angle(&mut self.board, angle)
    }

    pub fn lrs_step(&mut self, id: LimitedServoId) -> Result<(), Error> {
        self.scene.limited.get_mut(id)?.step()
    }

    /// Last commanded angle
    pub fn lrs_angle(&self, id: LimitedServoId) -> Result<Option<u8>, Error> {
        Ok(self.scene.limited.get(id)?.angle())
    }

    // ---- Sensors and LEDs ----

    pub fn piezo_init(&mut self, id: PiezoId, line: Line) -> Result<(), Error> {
        self.scene.piezos.init(id, PiezoSensor::new(line))?;
        Ok(())
    }

    /// Tap strength, 0 when below the threshold
    pub fn piezo_is_fired(&mut self, id: PiezoId) -> Result<u16, Error> {
        self.scene.piezos.get(id)?.is_fired(&mut self.board)
    }

    pub fn light_init(&mut self, id: LightId, line: Line) -> Result<(), Error> {
        self.scene.lights.init(id, LightSensor::new(line))?;
        Ok(())
    }

    pub fn light_is_light(&mut self, id: LightId) -> Result<bool, Error> {
        self.scene.lights.get(id)?.is_light(&mut self.board)
    }

    pub fn led_init(&mut self, id: LedId, line: Line) -> Result<(), Error> {
        self.scene.leds.check_range(id)?;
        let led = Led::init(line, &mut self.board)?;
        self.scene.leds.init(id, led)?;
        Ok(())
    }

    pub fn led_turn_on(&mut self, id: LedId) -> Result<(), Error> {
        self.scene.leds.get_mut(id)?.turn_on(&mut self.board)
    }

    pub fn led_turn_off(&mut self, id: LedId) -> Result<(), Error> {
        self.scene.leds.get_mut(id)?.turn_off(&mut self.board)
    }

    pub fn led_is_on(&self, id: LedId) -> Result<bool, Error> {
        Ok(self.scene.leds.get(id)?.is_on())
    }

    pub fn group_init(&mut self, id: GroupId) -> Result<(), Error> {
        self.scene.groups.init(id, PiezoSensorGroup::new())?;
        Ok(())
    }

    /// Append a configured piezo sensor to a group
    pub fn group_add(&mut self, id: GroupId, sensor: PiezoId) -> Result<(), Error> {
        self.scene.piezos.get(sensor)?;
        self.scene.groups.get_mut(id)?.add(sensor)
    }

    /// First tapped member in insertion order
    pub fn group_tapped(&mut self, id: GroupId) -> Result<Option<Tap>, Error> {
        self.scene
            .groups
            .get(id)?
            .tapped(&self.scene.piezos, &mut self.board)
    }

    // ---- Jellyfish ----

    pub fn jellyfish_init(
        &mut self,
        id: JellyfishId,
        servo: LimitedServoId,
        led: LedId,
    ) -> Result<(), Error> {
        self.scene.limited.get(servo)?;
        self.scene.leds.get(led)?;
        self.scene.jellyfish.init(id, Jellyfish::new(servo, led))?;
        Ok(())
    }

    pub fn jellyfish_lower(&mut self, id: JellyfishId) -> Result<(), Error> {
        let scene = &mut self.scene;
        scene
            .jellyfish
            .get(id)?
            .lower(&mut scene.limited, &mut scene.leds, &mut self.board)
    }

    pub fn jellyfish_raise(&mut self, id: JellyfishId) -> Result<(), Error> {
        let scene = &mut self.scene;
        scene
            .jellyfish
            .get(id)?
            .raise(&mut scene.limited, &mut scene.leds, &mut self.board)
    }

    // ---- Fish ----

    /// Configure a fish and send it home
    pub fn fish_init(
        &mut self,
        id: FishId,
        axes: [ServoId; 3],
        theta: LimitedServoId,
    ) -> Result<(), Error> {
        self.scene.fish.check_range(id)?;
        self.scene.limited.get(theta)?;

        let mut fish = Fish::new(axes, theta, DEFAULT_FISH_VELOCITY);
        fish.go_to(&mut self.scene.servos, Point3::ORIGIN)?;
        self.scene.fish.init(id, fish)?;
        info!("Fish {} heading home", id);
        Ok(())
    }

    pub fn fish_go_to(&mut self, id: FishId, target: Point3) -> Result<(), Error> {
        let scene = &mut self.scene;
        scene.fish.get_mut(id)?.go_to(&mut scene.servos, target)
    }

    pub fn fish_set_velocity(&mut self, id: FishId, velocity: u16) -> Result<(), Error> {
        self.scene.fish.get_mut(id)?.set_velocity(velocity);
        Ok(())
    }

    /// Step a fish that no aquarium drives, then dispatch its events
    pub fn fish_step(&mut self, id: FishId, ms: u32) -> Result<(), Error> {
        let scene = &mut self.scene;
        let stepped = scene.fish.get_mut(id).and_then(|fish| {
            fish.step(
                id,
                &mut scene.servos,
                &mut scene.limited,
                &mut self.board,
                ms,
                &mut self.events,
            )
        });
        let dispatched = self.dispatch_events();
        stepped.and(dispatched)
    }

    pub fn fish_position(&self, id: FishId) -> Result<Point3, Error> {
        self.scene.fish.get(id)?.position(&self.scene.servos)
    }

    pub fn fish_is_idle(&self, id: FishId) -> Result<bool, Error> {
        Ok(self.scene.fish.get(id)?.is_idle())
    }

    pub fn fish_stop(&mut self, id: FishId) -> Result<(), Error> {
        let scene = &mut self.scene;
        scene
            .fish
            .get_mut(id)?
            .stop(&mut scene.servos, &mut self.board)
    }

    // ---- Aquariums ----

    /// Configure an aquarium from configured parts
    pub fn aquarium_init(
        &mut self,
        id: AquariumId,
        fish: FishId,
        jellyfish: JellyfishId,
        light_sensor: LightId,
        sensor_group: GroupId,
        policy: AquariumPolicy,
    ) -> Result<(), Error> {
        self.aquariums.check_range(id)?;
        self.scene.jellyfish.get(jellyfish)?;
        self.scene.lights.get(light_sensor)?;
        self.scene.groups.get(sensor_group)?;
        self.scene.fish.get_mut(fish)?.set_velocity(policy.fish_velocity);

        self.aquariums.init(
            id,
            Aquarium::new(fish, jellyfish, light_sensor, sensor_group, policy),
        )?;
        info!("Aquarium {} ready", id);
        Ok(())
    }

    /// Fast cadence of one aquarium
    pub fn short_step(&mut self, id: AquariumId, ms: u32) -> Result<(), Error> {
        let stepped = self.aquariums.get_mut(id).and_then(|aquarium| {
            aquarium.short_step(id, &mut self.scene, &mut self.board, ms, &mut self.events)
        });
        let dispatched = self.dispatch_events();
        stepped.and(dispatched)
    }

    /// Slow cadence of one aquarium
    pub fn long_step(&mut self, id: AquariumId, ms: u32) -> Result<(), Error> {
        let stepped = self.aquariums.get_mut(id).and_then(|aquarium| {
            aquarium.long_step(id, &mut self.scene, &mut self.board, ms, &mut self.events)
        });
        let dispatched = self.dispatch_events();
        stepped.and(dispatched)
    }

    /// Tell every aquarium showing `fish` that it arrived
    pub fn on_fish_reached_goal(&mut self, fish: FishId) -> Result<(), Error> {
        let mut faults = FirstFault::default();
        for (_, aquarium) in self.aquariums.iter_mut() {
            faults.record(aquarium.on_fish_reached_goal(fish, &mut self.scene, &mut self.store));
        }
        faults.into_result()
    }

    fn on_fish_goal_unreachable(&mut self, fish: FishId) -> Result<(), Error> {
        let mut faults = FirstFault::default();
        for (_, aquarium) in self.aquariums.iter_mut() {
            faults.record(aquarium.on_fish_goal_unreachable(fish, &mut self.scene));
        }
        faults.into_result()
    }

    fn dispatch_events(&mut self) -> Result<(), Error> {
        let mut faults = FirstFault::default();

        while let Some(event) = self.events.pop_front() {
            if let Some(observer) = self.observer {
                observer(&event);
            }
            match event {
                Event::FishGoalReached(fish) => {
                    faults.record(self.on_fish_reached_goal(fish));
                }
                Event::FishGoalUnreachable(fish) => {
                    faults.record(self.on_fish_goal_unreachable(fish));
                }
                Event::Tapped { .. } | Event::LightChanged { .. } => {}
            }
        }

        faults.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalibrationData, JellyfishVisibility, TapReaction};
    use crate::error::EntityKind;
    use crate::mock::MockBoard;
    use crate::traits::ServoCalibration;
    use core::sync::atomic::{AtomicU32, Ordering};

    const POT_BASE: Line = 20;
    const THETA_LINE: Line = 5;
    const JELLY_SERVO_LINE: Line = 9;
    const JELLY_LED_LINE: Line = 3;
    const PIEZO_LINES: [Line; 2] = [10, 11];
    const LIGHT_LINE: Line = 28;

    const AQUARIUM: AquariumId = AquariumId::new(0);
    const FISH: FishId = FishId::new(0);
    const JELLY: JellyfishId = JellyfishId::new(0);

    type TestExhibit = Exhibit<MockBoard, CalibrationData>;

    fn build(policy: AquariumPolicy) -> TestExhibit {
        let mut board = MockBoard::new();
        board.set_analog(LIGHT_LINE, 500);
        let mut ex = Exhibit::new(board, CalibrationData::new());

        for i in 0..3u8 {
            ex.crs_init(ServoId::new(i), i, POT_BASE + i, true).unwrap();
        }
        ex.lrs_init(LimitedServoId::new(0), JELLY_SERVO_LINE).unwrap();
        ex.lrs_init(LimitedServoId::new(1), THETA_LINE).unwrap();
        ex.led_init(LedId::new(0), JELLY_LED_LINE).unwrap();
        ex.jellyfish_init(JELLY, LimitedServoId::new(0), LedId::new(0))
            .unwrap();
        ex.fish_init(
            FISH,
            [ServoId::new(0), ServoId::new(1), ServoId::new(2)],
            LimitedServoId::new(1),
        )
        .unwrap();

        ex.group_init(GroupId::new(0)).unwrap();
        for (i, line) in PIEZO_LINES.into_iter().enumerate() {
            ex.piezo_init(PiezoId::new(i as u8), line).unwrap();
            ex.group_add(GroupId::new(0), PiezoId::new(i as u8)).unwrap();
        }
        ex.light_init(LightId::new(0), LIGHT_LINE).unwrap();

        ex.aquarium_init(
            AQUARIUM,
            FISH,
            JELLY,
            LightId::new(0),
            GroupId::new(0),
            policy,
        )
        .unwrap();
        ex
    }

    fn short_steps(ex: &mut TestExhibit, steps: u32) {
        for _ in 0..steps {
            let _ = ex.short_step(AQUARIUM, 10);
        }
    }

    fn run_until(ex: &mut TestExhibit, max_steps: u32, done: impl Fn(&TestExhibit) -> bool) {
        for _ in 0..max_steps {
            if done(ex) {
                return;
            }
            let _ = ex.short_step(AQUARIUM, 10);
        }
        assert!(done(ex), "condition not met in {} steps", max_steps);
    }

    fn fish_target(ex: &TestExhibit) -> Point3 {
        ex.scene().fish.get(FISH).unwrap().target()
    }

    #[test]
    fn test_jellyfish_lower_scenario() {
        let mut ex = build(AquariumPolicy::default());
        ex.jellyfish_lower(JELLY).unwrap();

        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(true));
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(180)));

        ex.jellyfish_raise(JELLY).unwrap();
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(false));
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(0)));
    }

    #[test]
    fn test_crs_restores_saved_position() {
        let mut store = CalibrationData::new();
        store.set(
            0,
            ServoCalibration {
                zero_value: 512,
                units_per_rev: 360,
                position: 500,
            },
        );
        let mut ex = Exhibit::new(MockBoard::new(), store);

        ex.crs_init(ServoId::new(0), 0, POT_BASE, false).unwrap();
        assert_eq!(ex.crs_get_pos(ServoId::new(0)), Ok(500));
    }

    #[test]
    fn test_crs_restore_without_calibration() {
        let mut ex = Exhibit::new(MockBoard::new(), CalibrationData::new());

        assert_eq!(
            ex.crs_init(ServoId::new(1), 1, POT_BASE + 1, false),
            Err(Error::UncalibratedServo(1))
        );
        assert_eq!(
            ex.crs_get_pos(ServoId::new(1)),
            Err(Error::UncalibratedServo(1))
        );
        assert_eq!(
            ex.crs_step(ServoId::new(1), 10),
            Err(Error::UncalibratedServo(1))
        );
    }

    #[test]
    fn test_crs_standalone_goal() {
        let mut ex = Exhibit::new(MockBoard::new(), CalibrationData::new());
        let servo = ServoId::new(0);
        ex.crs_init(servo, 0, POT_BASE, true).unwrap();
        ex.crs_set_velocity(servo, 200).unwrap();
        ex.crs_start_moving_to_degrees(servo, 10.0).unwrap();

        let mut reached = false;
        for _ in 0..100 {
            if ex.crs_step(servo, 10).unwrap() == Some(ServoEvent::GoalReached) {
                reached = true;
                break;
            }
        }
        assert!(reached);
        assert_eq!(ex.crs_get_pos(servo), Ok(10));

        ex.crs_save(servo).unwrap();
        assert_eq!(ex.store().get(0).map(|c| c.position), Some(10));
    }

    #[test]
    fn test_invalid_ids() {
        let mut ex = build(AquariumPolicy::default());

        assert_eq!(
            ex.crs_init(ServoId::new(9), 0, 0, true),
            Err(Error::InvalidId {
                kind: EntityKind::ContinuousServo,
                index: 9
            })
        );
        assert_eq!(
            ex.led_turn_on(LedId::new(3)),
            Err(Error::InvalidId {
                kind: EntityKind::Led,
                index: 3
            })
        );
        assert_eq!(
            ex.group_add(GroupId::new(0), PiezoId::new(5)),
            Err(Error::InvalidId {
                kind: EntityKind::PiezoSensor,
                index: 5
            })
        );
        assert_eq!(
            ex.short_step(AquariumId::new(4), 10),
            Err(Error::InvalidId {
                kind: EntityKind::Aquarium,
                index: 4
            })
        );
    }

    #[test]
    fn test_fish_init_needs_calibrated_axes() {
        let mut ex = Exhibit::new(MockBoard::new(), CalibrationData::new());
        ex.lrs_init(LimitedServoId::new(0), THETA_LINE).unwrap();

        assert_eq!(
            ex.fish_init(
                FISH,
                [ServoId::new(0), ServoId::new(1), ServoId::new(2)],
                LimitedServoId::new(0),
            ),
            Err(Error::UncalibratedServo(0))
        );
        assert!(ex.fish_is_idle(FISH).is_err());
    }

    #[test]
    fn test_sensor_queries() {
        let mut ex = build(AquariumPolicy::default());

        ex.board_mut().set_analog(PIEZO_LINES[1], 700);
        assert_eq!(ex.piezo_is_fired(PiezoId::new(0)), Ok(0));
        assert_eq!(ex.piezo_is_fired(PiezoId::new(1)), Ok(700));
        assert_eq!(
            ex.group_tapped(GroupId::new(0)),
            Ok(Some(Tap {
                slot: 1,
                sensor: PiezoId::new(1),
                strength: 700
            }))
        );

        ex.board_mut().set_analog(LIGHT_LINE, 99);
        assert_eq!(ex.light_is_light(LightId::new(0)), Ok(false));
        ex.board_mut().set_analog(LIGHT_LINE, 100);
        assert_eq!(ex.light_is_light(LightId::new(0)), Ok(true));
    }

    #[test]
    fn test_fish_goes_home_on_init() {
        let mut ex = build(AquariumPolicy::default());
        assert_eq!(ex.fish_is_idle(FISH), Ok(false));
        assert_eq!(fish_target(&ex), Point3::ORIGIN);

        run_until(&mut ex, 100, |ex| ex.fish_is_idle(FISH) == Ok(true));
        assert_eq!(ex.fish_position(FISH), Ok(Point3::ORIGIN));
    }

    #[test]
    fn test_tap_sends_fish_to_tap_goal() {
        let mut policy = AquariumPolicy::default();
        policy.tap_goals.push(Point3::new(100, 0, 0)).unwrap();
        policy.tap_goals.push(Point3::new(0, 100, 0)).unwrap();
        let mut ex = build(policy);

        ex.board_mut().set_analog(PIEZO_LINES[1], 600);
        ex.short_step(AQUARIUM, 10).unwrap();
        assert_eq!(fish_target(&ex), Point3::new(0, 100, 0));

        ex.board_mut().set_analog(PIEZO_LINES[1], 0);
        run_until(&mut ex, 3000, |ex| ex.fish_is_idle(FISH) == Ok(true));
        assert_eq!(ex.fish_position(FISH), Ok(Point3::new(0, 100, 0)));

        // Arrival checkpoints every axis
        assert_eq!(ex.store().get(1).map(|c| c.position), Some(100));
        assert_eq!(ex.store().get(0).map(|c| c.position), Some(0));
    }

    static COOLDOWN_TAPS: AtomicU32 = AtomicU32::new(0);

    fn count_cooldown_taps(event: &Event) {
        if matches!(event, Event::Tapped { .. }) {
            COOLDOWN_TAPS.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_tap_cooldown() {
        let mut policy = AquariumPolicy::default();
        policy.tap_cooldown_ms = 500;
        let mut ex = build(policy);
        ex.set_observer(count_cooldown_taps);

        // A tap held for one second is handled at 0 ms and 500 ms
        ex.board_mut().set_analog(PIEZO_LINES[0], 300);
        short_steps(&mut ex, 100);
        assert_eq!(COOLDOWN_TAPS.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_light_rule_shows_jellyfish_in_the_dark() {
        let mut ex = build(AquariumPolicy::default());

        // First reading applies the rule even without a transition
        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.aquarium(AQUARIUM).unwrap().is_light(), Some(true));
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(0)));
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(false));

        ex.board_mut().set_analog(LIGHT_LINE, 20);
        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(180)));
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(true));

        ex.board_mut().set_analog(LIGHT_LINE, 900);
        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(0)));
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(false));
    }

    #[test]
    fn test_inverse_light_rule() {
        let mut policy = AquariumPolicy::default();
        policy.visibility = JellyfishVisibility::WhenLight;
        let mut ex = build(policy);

        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(true));
    }

    #[test]
    fn test_tap_lowers_jellyfish_for_hold_time() {
        let mut policy = AquariumPolicy::default();
        policy.tap_reaction = TapReaction::LowerJellyfish;
        policy.jellyfish_hold_ms = 300;
        let mut ex = build(policy);

        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(false));

        ex.board_mut().set_analog(PIEZO_LINES[0], 300);
        ex.short_step(AQUARIUM, 10).unwrap();
        ex.board_mut().set_analog(PIEZO_LINES[0], 0);
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(true));
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(180)));

        // Chasing is off
        assert_eq!(fish_target(&ex), Point3::ORIGIN);

        ex.long_step(AQUARIUM, 100).unwrap();
        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(true));

        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(false));
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(0)));
    }

    #[test]
    fn test_patrol_cycles_on_arrival() {
        let mut policy = AquariumPolicy::default();
        policy.patrol.push(Point3::new(50, 0, 0)).unwrap();
        policy.patrol.push(Point3::new(0, 50, 0)).unwrap();
        let mut ex = build(policy);

        run_until(&mut ex, 200, |ex| fish_target(ex) == Point3::new(50, 0, 0));
        run_until(&mut ex, 3000, |ex| fish_target(ex) == Point3::new(0, 50, 0));
        assert_eq!(ex.store().get(0).map(|c| c.position), Some(50));

        run_until(&mut ex, 3000, |ex| fish_target(ex) == Point3::new(50, 0, 0));
        assert_eq!(ex.fish_position(FISH), Ok(Point3::new(0, 50, 0)));
    }

    #[test]
    fn test_unreachable_goal_moves_on() {
        let mut policy = AquariumPolicy::default();
        policy.patrol.push(Point3::new(100, 0, 0)).unwrap();
        policy.patrol.push(Point3::new(0, 20, 0)).unwrap();
        let mut ex = build(policy);

        run_until(&mut ex, 200, |ex| fish_target(ex) == Point3::new(100, 0, 0));
        ex.board_mut().fail_line(0);

        run_until(&mut ex, 3000, |ex| fish_target(ex) == Point3::new(0, 20, 0));
        run_until(&mut ex, 3000, |ex| {
            ex.fish_position(FISH) == Ok(Point3::new(0, 20, 0))
        });
    }

    #[test]
    fn test_sensor_fault_does_not_stop_fish() {
        let mut ex = build(AquariumPolicy::default());
        run_until(&mut ex, 100, |ex| ex.fish_is_idle(FISH) == Ok(true));

        ex.fish_go_to(FISH, Point3::new(60, 0, 0)).unwrap();
        ex.board_mut().fail_line(PIEZO_LINES[0]);

        assert_eq!(
            ex.short_step(AQUARIUM, 10),
            Err(Error::SensorReadFailure {
                line: PIEZO_LINES[0]
            })
        );
        run_until(&mut ex, 2000, |ex| ex.fish_is_idle(FISH) == Ok(true));
        assert_eq!(ex.fish_position(FISH), Ok(Point3::new(60, 0, 0)));
    }

    #[test]
    fn test_jellyfish_fault_reported_after_led() {
        let mut ex = build(AquariumPolicy::default());
        ex.board_mut().fail_line(JELLY_SERVO_LINE);
        ex.board_mut().set_analog(LIGHT_LINE, 10);

        assert_eq!(
            ex.long_step(AQUARIUM, 100),
            Err(Error::ActuatorWriteFailure {
                line: JELLY_SERVO_LINE
            })
        );
        assert_eq!(ex.led_is_on(LedId::new(0)), Ok(true));

        // Retried on the next long step once the servo recovers
        ex.board_mut().heal_line(JELLY_SERVO_LINE);
        ex.long_step(AQUARIUM, 100).unwrap();
        assert_eq!(ex.lrs_angle(LimitedServoId::new(0)), Ok(Some(180)));
    }

    #[test]
    fn test_standalone_fish_step() {
        let mut ex = Exhibit::new(MockBoard::new(), CalibrationData::new());
        for i in 0..3u8 {
            ex.crs_init(ServoId::new(i), i, POT_BASE + i, true).unwrap();
        }
        ex.lrs_init(LimitedServoId::new(0), THETA_LINE).unwrap();
        ex.fish_init(
            FISH,
            [ServoId::new(0), ServoId::new(1), ServoId::new(2)],
            LimitedServoId::new(0),
        )
        .unwrap();
        ex.fish_set_velocity(FISH, 240).unwrap();
        ex.fish_go_to(FISH, Point3::new(-30, 40, 10)).unwrap();

        for _ in 0..1000 {
            ex.fish_step(FISH, 10).unwrap();
            if ex.fish_is_idle(FISH).unwrap() {
                break;
            }
        }
        assert_eq!(ex.fish_position(FISH), Ok(Point3::new(-30, 40, 10)));

        ex.fish_go_to(FISH, Point3::new(200, 0, 0)).unwrap();
        ex.fish_step(FISH, 10).unwrap();
        ex.fish_stop(FISH).unwrap();
        assert_eq!(ex.fish_is_idle(FISH), Ok(true));
    }
}
