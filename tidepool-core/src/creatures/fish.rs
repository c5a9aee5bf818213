//! Fish: three-axis goal seeking with an orientation servo
//!
//! The fish hangs from three continuous rotation servos (x, y, z) and
//! turns on a limited rotation servo. A goal is travelled in a straight
//! line split into [`FISH_SUB_STEPS_TO_GOAL`] sub-goals. Waypoints are
//! whole units, so a short axis moves in uneven steps; each sub-goal paces
//! every axis by its own waypoint delta so all three reach it together.
//! The next sub-goal is dispatched only when all three have reported
//! arrival.
//!
//! ```text
//!            go_to
//!   Idle ─────────────▶ Seeking ──┐ all axes reached,
//!    ▲                    │  ▲     │ sub-goals left
//!    │  last sub-goal     │  └─────┘
//!    └────────────────────┘
//!       or watchdog gave up
//! ```
//!
//! While seeking, the orientation servo points along the heading and
//! wiggles sinusoidally. The wiggle never gates goal completion.

use core::f32::consts::TAU;

// Host tests link std, whose inherent float methods take precedence
#[cfg_attr(test, allow(unused_imports))]
use micromath::F32Ext;

use crate::actuators::{ContinuousRotationServo, LimitedRotationServo, LimitedServoId, ServoId};
use crate::arena::{Arena, Entity, Handle};
use crate::config::{
    FISH_SUB_STEPS_TO_GOAL, LRS_MAX_ANGLE, MAX_SUB_STEP_RETRIES, WATCHDOG_FACTOR,
    WATCHDOG_SLACK_MS, WIGGLE_AMPLITUDE, WIGGLE_SPEED,
};
use crate::error::{EntityKind, Error, FirstFault};
use crate::events::{emit, Event, EventQueue, ServoEvent};
use crate::motion::{Point3, StraightPath};
use crate::traits::PwmOutput;

/// Handle to a fish
pub type FishId = Handle<Fish>;

const ALL_AXES: u8 = 0b111;

/// Planner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FishState {
    /// No pending goal
    Idle,
    /// Working through the sub-goals of a goal
    Seeking,
}

/// Time budget of the current sub-goal
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Watchdog {
    elapsed_ms: u32,
    budget_ms: u32,
    retries: u8,
}

impl Watchdog {
    fn arm(expected_ms: u32) -> Self {
        Self {
            elapsed_ms: 0,
            budget_ms: expected_ms
                .saturating_mul(WATCHDOG_FACTOR)
                .saturating_add(WATCHDOG_SLACK_MS),
            retries: 0,
        }
    }

    fn expired(&mut self, ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        self.elapsed_ms > self.budget_ms
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fish {
    axes: [ServoId; 3],
    theta: LimitedServoId,
    /// Travel speed along the longest axis (units/s)
    velocity: u16,
    state: FishState,
    path: StraightPath,
    /// Per-axis speeds for the current sub-goal
    axis_velocity: [u16; 3],
    sub_steps_left: u8,
    /// Bit per axis still moving toward the current sub-goal
    pending: u8,
    /// Time since the current goal was issued
    since_start_ms: u32,
    heading_deg: f32,
    /// Wiggle phase (rad)
    wiggle_phase: f32,
    watchdog: Watchdog,
}

impl Entity for Fish {
    const KIND: EntityKind = EntityKind::Fish;
}

impl Fish {
    /// Create an idle fish on the given axis servos
    pub fn new(axes: [ServoId; 3], theta: LimitedServoId, velocity: u16) -> Self {
        Self {
            axes,
            theta,
            velocity,
            state: FishState::Idle,
            path: StraightPath::new(Point3::ORIGIN, Point3::ORIGIN, FISH_SUB_STEPS_TO_GOAL),
            axis_velocity: [0; 3],
            sub_steps_left: 0,
            pending: 0,
            since_start_ms: 0,
            heading_deg: 0.0,
            wiggle_phase: 0.0,
            watchdog: Watchdog::default(),
        }
    }

    /// Head for `target`, replacing any goal in flight
    ///
    /// The path always starts from the current position estimate, never
    /// from the start of an interrupted goal.
    pub fn go_to<const N: usize>(
        &mut self,
        servos: &mut Arena<ContinuousRotationServo, N>,
        target: Point3,
    ) -> Result<(), Error> {
        let start = self.position(servos)?;
        let path = StraightPath::new(start, target, FISH_SUB_STEPS_TO_GOAL);

        if let Some(heading) = path.heading() {
            self.heading_deg = heading.to_degrees();
        }

        self.path = path;
        self.sub_steps_left = path.sub_steps();
        self.since_start_ms = 0;
        self.wiggle_phase = 0.0;
        self.state = FishState::Seeking;

        debug!("Fish heading from {} to {}", start, target);
        self.dispatch_next(servos)
    }

    fn dispatch_next<const N: usize>(
        &mut self,
        servos: &mut Arena<ContinuousRotationServo, N>,
    ) -> Result<(), Error> {
        let k = self.path.sub_steps() - self.sub_steps_left + 1;
        self.sub_steps_left -= 1;
        self.pending = ALL_AXES;

        let mut faults = FirstFault::default();
        faults.record(self.pace(servos, k));
        self.watchdog = Watchdog::arm(self.expected_sub_step_ms(k));
        faults.record(self.send_waypoint(servos, k, ALL_AXES));
        faults.into_result()
    }

    /// Set the axis speeds for sub-goal `k`
    ///
    /// The axis with the largest waypoint delta runs at the fish velocity
    /// and the others at `ceil(|delta| * velocity / largest)`, so none
    /// takes longer than the largest. Axes with nothing to do still get
    /// 1 unit/s.
    fn pace<const N: usize>(
        &mut self,
        servos: &mut Arena<ContinuousRotationServo, N>,
        k: u8,
    ) -> Result<(), Error> {
        let delta = self.sub_step_delta(k);
        let largest = delta.iter().map(|d| d.unsigned_abs()).max().unwrap_or(0);
        let mut faults = FirstFault::default();

        for (i, &axis) in self.axes.iter().enumerate() {
            let velocity = match largest {
                0 => 0,
                l => (delta[i].unsigned_abs() * self.velocity as u64).div_ceil(l),
            };
            if let Some(servo) = faults.record(servos.get_mut(axis)) {
                servo.set_velocity(velocity.clamp(1, u16::MAX as u64) as i32);
                self.axis_velocity[i] = servo.velocity();
            }
        }
        faults.into_result()
    }

    fn sub_step_delta(&self, k: u8) -> [i64; 3] {
        self.path
            .waypoint(k.saturating_sub(1))
            .delta_to(self.path.waypoint(k))
    }

    /// Slowest axis' travel time for sub-goal `k`
    fn expected_sub_step_ms(&self, k: u8) -> u32 {
        let delta = self.sub_step_delta(k);

        (0..3)
            .map(|i| {
                let distance = delta[i].unsigned_abs();
                let velocity = self.axis_velocity[i].max(1) as u64;
                (distance * 1000).div_ceil(velocity).min(u32::MAX as u64) as u32
            })
            .max()
            .unwrap_or(0)
    }

    fn send_waypoint<const N: usize>(
        &self,
        servos: &mut Arena<ContinuousRotationServo, N>,
        k: u8,
        axes: u8,
    ) -> Result<(), Error> {
        let waypoint = self.path.waypoint(k).axes();
        let mut faults = FirstFault::default();

        for (i, &axis) in self.axes.iter().enumerate() {
            if axes & (1 << i) != 0 {
                faults.record(servos.get_mut(axis).map(|s| s.start_moving_to(waypoint[i])));
            }
        }
        faults.into_result()
    }

    /// Advance the axes, the planner and the orientation by `ms`
    ///
    /// Every axis is stepped even when another one fails; the first fault
    /// is returned once the whole step is done. Arrival at the final goal
    /// pushes [`Event::FishGoalReached`]; a sub-goal that stalls past its
    /// retries stops the fish and pushes [`Event::FishGoalUnreachable`].
    pub fn step<O, const C: usize, const L: usize>(
        &mut self,
        id: FishId,
        servos: &mut Arena<ContinuousRotationServo, C>,
        limited: &mut Arena<LimitedRotationServo, L>,
        out: &mut O,
        ms: u32,
        events: &mut EventQueue,
    ) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        let mut faults = FirstFault::default();

        for (i, &axis) in self.axes.iter().enumerate() {
            let event = faults.record(servos.get_mut(axis).and_then(|s| s.step(out, ms)));
            if event == Some(Some(ServoEvent::GoalReached)) {
                self.pending &= !(1 << i);
            }
        }

        if self.state == FishState::Idle {
            return faults.into_result();
        }

        self.since_start_ms = self.since_start_ms.saturating_add(ms);
        self.wiggle_phase = (self.wiggle_phase + WIGGLE_SPEED * ms as f32 / 1000.0) % TAU;

        if self.pending == 0 {
            if self.sub_steps_left > 0 {
                faults.record(self.dispatch_next(servos));
            } else {
                self.state = FishState::Idle;
                info!(
                    "Fish {} reached {} in {} ms",
                    id,
                    self.path.target(),
                    self.since_start_ms
                );
                emit(events, Event::FishGoalReached(id));
                return faults.into_result();
            }
        } else if self.watchdog.expired(ms) {
            faults.record(self.on_stall(id, servos, out, events));
            if self.state == FishState::Idle {
                return faults.into_result();
            }
        }

        faults.record(self.orient(limited, out));
        faults.into_result()
    }

    fn on_stall<O, const C: usize>(
        &mut self,
        id: FishId,
        servos: &mut Arena<ContinuousRotationServo, C>,
        out: &mut O,
        events: &mut EventQueue,
    ) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        if self.watchdog.retries < MAX_SUB_STEP_RETRIES {
            self.watchdog.retries += 1;
            self.watchdog.elapsed_ms = 0;
            warn!(
                "Fish {} sub-goal stalled (axes {}), retry {}",
                id, self.pending, self.watchdog.retries
            );
            let k = self.path.sub_steps() - self.sub_steps_left;
            return self.send_waypoint(servos, k, self.pending);
        }

        warn!("Fish {} gave up on {}", id, self.path.target());
        let mut faults = FirstFault::default();
        faults.record::<()>(Err(Error::GoalUnreachable(id.index())));
        faults.record(self.halt(servos, out));
        emit(events, Event::FishGoalUnreachable(id));
        faults.into_result()
    }

    fn halt<O, const C: usize>(
        &mut self,
        servos: &mut Arena<ContinuousRotationServo, C>,
        out: &mut O,
    ) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        self.state = FishState::Idle;
        self.sub_steps_left = 0;
        self.pending = 0;

        let mut faults = FirstFault::default();
        for &axis in &self.axes {
            faults.record(servos.get_mut(axis).and_then(|s| s.stop(out)));
        }
        faults.into_result()
    }

    /// Orientation servo angle: heading folded onto the servo range plus wiggle
    fn orientation(&self) -> u8 {
        let wiggle = WIGGLE_AMPLITUDE * self.wiggle_phase.sin();
        let angle = (self.heading_deg + 180.0) / 2.0 + wiggle;
        angle.clamp(0.0, LRS_MAX_ANGLE as f32).round() as u8
    }

    fn orient<O, const L: usize>(
        &self,
        limited: &mut Arena<LimitedRotationServo, L>,
        out: &mut O,
    ) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        let angle = self.orientation();
        let servo = limited.get_mut(self.theta)?;
        if servo.angle() != Some(angle) {
            servo.set_angle(out, angle)?;
        }
        Ok(())
    }

    /// Cancel the goal and stop all axes
    pub fn stop<O, const C: usize>(
        &mut self,
        servos: &mut Arena<ContinuousRotationServo, C>,
        out: &mut O,
    ) -> Result<(), Error>
    where
        O: PwmOutput + ?Sized,
    {
        self.halt(servos, out)
    }

    /// Current position estimate of the three axes
    pub fn position<const N: usize>(
        &self,
        servos: &Arena<ContinuousRotationServo, N>,
    ) -> Result<Point3, Error> {
        let [x, y, z] = self.axes;
        Ok(Point3::new(
            servos.get(x)?.position(),
            servos.get(y)?.position(),
            servos.get(z)?.position(),
        ))
    }

    /// Set the travel speed used by the next [`go_to`](Self::go_to)
    pub fn set_velocity(&mut self, velocity: u16) {
        self.velocity = velocity;
    }

    pub fn state(&self) -> FishState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == FishState::Idle
    }

    /// Current or last goal
    pub fn target(&self) -> Point3 {
        self.path.target()
    }

    /// Path of the current or last goal
    pub fn path(&self) -> &StraightPath {
        &self.path
    }

    pub fn sub_steps_left(&self) -> u8 {
        self.sub_steps_left
    }

    pub fn axes(&self) -> [ServoId; 3] {
        self.axes
    }

    pub fn theta(&self) -> LimitedServoId {
        self.theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalibrationData, ContinuousServoConfig, DEFAULT_FISH_VELOCITY};
    use crate::mock::MockBoard;
    use proptest::prelude::*;

    const THETA_LINE: u8 = 5;

    struct Rig {
        board: MockBoard,
        servos: Arena<ContinuousRotationServo, 3>,
        limited: Arena<LimitedRotationServo, 1>,
        events: EventQueue,
        fish: Fish,
    }

    impl Rig {
        fn new() -> Self {
            let mut board = MockBoard::new();
            let mut store = CalibrationData::new();
            let mut servos = Arena::new();
            for i in 0..3u8 {
                let servo = ContinuousRotationServo::calibrate(
                    i,
                    i,
                    20 + i,
                    ContinuousServoConfig::default(),
                    &mut board,
                    &mut store,
                )
                .unwrap();
                servos.init(ServoId::new(i), servo).unwrap();
            }

            let mut limited = Arena::new();
            limited
                .init(LimitedServoId::new(0), LimitedRotationServo::new(THETA_LINE))
                .unwrap();

            let fish = Fish::new(
                [ServoId::new(0), ServoId::new(1), ServoId::new(2)],
                LimitedServoId::new(0),
                DEFAULT_FISH_VELOCITY,
            );

            Self {
                board,
                servos,
                limited,
                events: EventQueue::new(),
                fish,
            }
        }

        fn go_to(&mut self, x: i32, y: i32, z: i32) {
            self.fish
                .go_to(&mut self.servos, Point3::new(x, y, z))
                .unwrap();
        }

        fn tick(&mut self, ms: u32) -> Result<(), Error> {
            self.fish.step(
                FishId::new(0),
                &mut self.servos,
                &mut self.limited,
                &mut self.board,
                ms,
                &mut self.events,
            )
        }

        fn run_until_event(&mut self, max_ticks: u32) -> Option<(Event, u32)> {
            for tick in 1..=max_ticks {
                let _ = self.tick(10);
                if let Some(event) = self.events.pop_front() {
                    return Some((event, tick));
                }
            }
            None
        }

        fn position(&self) -> Point3 {
            self.fish.position(&self.servos).unwrap()
        }

        fn axis_target(&self, axis: u8) -> i32 {
            self.servos
                .get(ServoId::new(axis))
                .unwrap()
                .target_position()
        }
    }

    #[test]
    fn test_reaches_goal() {
        let mut rig = Rig::new();
        rig.go_to(120, -60, 30);
        assert_eq!(rig.fish.state(), FishState::Seeking);

        let (event, _) = rig.run_until_event(2000).unwrap();
        assert_eq!(event, Event::FishGoalReached(FishId::new(0)));
        assert_eq!(rig.position(), Point3::new(120, -60, 30));
        assert!(rig.fish.is_idle());
        assert_eq!(rig.fish.sub_steps_left(), 0);
    }

    #[test]
    fn test_dispatches_first_waypoint() {
        let mut rig = Rig::new();
        rig.go_to(100, -50, 20);

        assert_eq!(rig.axis_target(0), 10);
        assert_eq!(rig.axis_target(1), -5);
        assert_eq!(rig.axis_target(2), 2);
        assert_eq!(rig.fish.sub_steps_left(), FISH_SUB_STEPS_TO_GOAL - 1);
    }

    #[test]
    fn test_axis_speeds_proportional() {
        let mut rig = Rig::new();
        rig.go_to(240, 120, 0);

        let speed = |axis| rig.servos.get(ServoId::new(axis)).unwrap().velocity();
        assert_eq!(speed(0), DEFAULT_FISH_VELOCITY);
        assert_eq!(speed(1), DEFAULT_FISH_VELOCITY / 2);
        // Axes that do not move still get a minimal speed
        assert_eq!(speed(2), 1);
    }

    #[test]
    fn test_short_axes_keep_pace_with_long_axis() {
        // 40 units per sub-step at 120 units/s is 34 ticks of travel plus
        // one tick to start the drive, for every sub-goal
        for goal in [(400, 0, 0), (400, 30, 3), (400, 0, 5), (400, 0, 1)] {
            let mut rig = Rig::new();
            rig.go_to(goal.0, goal.1, goal.2);

            let (event, ticks) = rig.run_until_event(2000).unwrap();
            assert_eq!(event, Event::FishGoalReached(FishId::new(0)));
            assert_eq!(ticks * 10, 3500, "goal {:?}", goal);
            assert_eq!(rig.position(), Point3::new(goal.0, goal.1, goal.2));
        }
    }

    #[test]
    fn test_axis_speed_follows_sub_step_delta() {
        let mut rig = Rig::new();
        rig.go_to(400, 0, 1);
        let speed = |rig: &Rig, axis| rig.servos.get(ServoId::new(axis)).unwrap().velocity();

        // z only moves on the last sub-goal
        assert_eq!(speed(&rig, 0), DEFAULT_FISH_VELOCITY);
        assert_eq!(speed(&rig, 2), 1);

        while rig.fish.sub_steps_left() > 0 {
            rig.tick(10).unwrap();
        }
        assert_eq!(rig.axis_target(2), 1);
        // One unit in the time x covers 40
        assert_eq!(speed(&rig, 2), 3);
    }

    #[test]
    fn test_go_to_mid_seek_restarts_from_current_position() {
        let mut rig = Rig::new();
        rig.go_to(300, 0, 0);
        for _ in 0..150 {
            rig.tick(10).unwrap();
        }

        let here = rig.position();
        assert!(here.x > 0 && here.x < 300);

        rig.go_to(0, 300, 0);
        assert_eq!(rig.fish.path().start(), here);

        // First sub-goal is one tenth of the way from here
        let first = rig.fish.path().waypoint(1);
        assert_eq!(rig.axis_target(0), first.x);
        assert_eq!(rig.axis_target(1), first.y);
        assert!((first.x - here.x).abs() <= rig.fish.path().sub_step_distance() as i32);
        assert!((first.y - here.y).abs() <= rig.fish.path().sub_step_distance() as i32);

        let (event, _) = rig.run_until_event(4000).unwrap();
        assert_eq!(event, Event::FishGoalReached(FishId::new(0)));
        assert_eq!(rig.position(), Point3::new(0, 300, 0));
    }

    #[test]
    fn test_zero_length_goal_completes() {
        let mut rig = Rig::new();
        rig.go_to(0, 0, 0);

        let (event, ticks) = rig.run_until_event(100).unwrap();
        assert_eq!(event, Event::FishGoalReached(FishId::new(0)));
        assert!(ticks <= 2 * FISH_SUB_STEPS_TO_GOAL as u32);
    }

    #[test]
    fn test_orientation_follows_heading() {
        let mut rig = Rig::new();

        rig.go_to(-100, 0, 0);
        rig.tick(10).unwrap();
        let angle = rig.limited.get(LimitedServoId::new(0)).unwrap().angle().unwrap();
        assert!(angle >= 178, "angle {}", angle);

        rig.go_to(rig.position().x, 100, 0);
        rig.tick(10).unwrap();
        let angle = rig.limited.get(LimitedServoId::new(0)).unwrap().angle().unwrap();
        // 90° heading folds onto 135 with a small wiggle
        assert!((125..=145).contains(&angle), "angle {}", angle);
    }

    #[test]
    fn test_stalled_axis_gives_up_without_stopping_others() {
        let mut rig = Rig::new();
        rig.board.fail_line(0);
        rig.go_to(100, 100, 0);

        let mut unreachable = None;
        for tick in 1..=2000u32 {
            let _ = rig.tick(10);
            if let Some(event) = rig.events.pop_front() {
                unreachable = Some((event, tick));
                break;
            }
        }

        let (event, _) = unreachable.unwrap();
        assert_eq!(event, Event::FishGoalUnreachable(FishId::new(0)));
        assert!(rig.fish.is_idle());
        // The healthy y axis kept stepping and reached its first sub-goal
        assert_eq!(rig.position().y, 10);
        assert_eq!(rig.position().x, 0);
    }

    #[test]
    fn test_give_up_reports_goal_unreachable() {
        let mut rig = Rig::new();
        rig.go_to(50, 0, 0);
        rig.tick(10).unwrap();

        // A sub-goal that has used up its retries
        rig.fish.watchdog.retries = MAX_SUB_STEP_RETRIES;
        rig.fish.watchdog.elapsed_ms = rig.fish.watchdog.budget_ms;
        rig.fish.pending = 0b001;
        rig.servos.get_mut(ServoId::new(0)).unwrap().stop(&mut rig.board).unwrap();

        assert_eq!(rig.tick(10), Err(Error::GoalUnreachable(0)));
        assert_eq!(
            rig.events.pop_front(),
            Some(Event::FishGoalUnreachable(FishId::new(0)))
        );
        assert!(rig.fish.is_idle());
    }

    #[test]
    fn test_missing_axis() {
        let mut rig = Rig::new();
        rig.fish.axes[2] = ServoId::new(7);
        assert_eq!(
            rig.fish.go_to(&mut rig.servos, Point3::new(1, 1, 1)),
            Err(Error::InvalidId {
                kind: EntityKind::ContinuousServo,
                index: 7
            })
        );
        assert!(rig.fish.is_idle());
    }

    #[test]
    fn test_stop() {
        let mut rig = Rig::new();
        rig.go_to(200, 0, 0);
        for _ in 0..20 {
            rig.tick(10).unwrap();
        }
        rig.fish.stop(&mut rig.servos, &mut rig.board).unwrap();
        let parked = rig.position();

        for _ in 0..20 {
            rig.tick(10).unwrap();
        }
        assert_eq!(rig.position(), parked);
        assert!(rig.events.is_empty());
        assert_eq!(rig.board.pwm(0), Some(1500));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_synchronized_arrival(
            x in -400i32..400,
            y in -400i32..400,
            z in -400i32..400,
        ) {
            let mut rig = Rig::new();
            rig.go_to(x, y, z);
            let path = *rig.fish.path();
            let velocity = DEFAULT_FISH_VELOCITY as u32;
            let sub_steps = FISH_SUB_STEPS_TO_GOAL as u32;

            // Last tick on which each axis moved
            let mut last_move = [0u32; 3];
            let mut arrived = None;
            for tick in 1..=20_000u32 {
                let before = rig.position().axes();
                let _ = rig.tick(10);
                let after = rig.position().axes();
                for axis in 0..3 {
                    if before[axis] != after[axis] {
                        last_move[axis] = tick;
                    }
                }
                if let Some(event) = rig.events.pop_front() {
                    prop_assert_eq!(event, Event::FishGoalReached(FishId::new(0)));
                    arrived = Some(tick);
                    break;
                }
            }
            let arrived = arrived.unwrap();
            prop_assert_eq!(rig.position(), Point3::new(x, y, z));
            prop_assert!(rig.fish.is_idle());

            // Travel time of the longest axis, plus per sub-goal one unit of
            // rounding and two ticks to start and stop the drives
            let per_sub_step_lag = 1000u32.div_ceil(velocity) + 20;
            let budget = (path.longest_axis_distance() * 1000).div_ceil(velocity)
                + sub_steps * per_sub_step_lag;
            prop_assert!(arrived * 10 <= budget, "{} ms > {} ms", arrived * 10, budget);

            // Every moving axis finishes within the last sub-goal
            let last_sub_step_ticks = (path.sub_step_distance() * 100).div_ceil(velocity) + 2;
            let delta = path.start().delta_to(path.target());
            for axis in 0..3 {
                if delta[axis] != 0 {
                    prop_assert!(
                        arrived - last_move[axis] <= last_sub_step_ticks,
                        "axis {} done at tick {}, goal at {}",
                        axis,
                        last_move[axis],
                        arrived
                    );
                }
            }
        }

        #[test]
        fn prop_sub_goals_on_the_line(
            x in -400i32..400,
            y in -400i32..400,
        ) {
            let mut rig = Rig::new();
            rig.go_to(x, y, 0);
            let path = *rig.fish.path();

            let mut k = 1;
            for _ in 0..20_000 {
                // Every dispatched sub-goal is waypoint k of the path
                prop_assert_eq!(rig.axis_target(0), path.waypoint(k).x);
                prop_assert_eq!(rig.axis_target(1), path.waypoint(k).y);

                let before = rig.fish.sub_steps_left();
                let _ = rig.tick(10);
                if rig.fish.is_idle() {
                    break;
                }
                if rig.fish.sub_steps_left() != before {
                    k += 1;
                }
            }
            prop_assert_eq!(k, FISH_SUB_STEPS_TO_GOAL);
        }
    }
}
