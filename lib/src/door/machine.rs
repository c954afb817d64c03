use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use super::{open_extent, AccessGate, BoxExtent, DoorConfig, Leaf};

#[derive(strum::Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// `side` is the half-space of the actor that opened the door.
    Opening { side: bool },
    Closing { auto_closing: bool },
}

/// Something observable happened to a door.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DoorSignal {
    Denied,
    OpeningStarted { side: bool },
    Opened,
    AutoCloseScheduled { delay: f32 },
    ClosingStarted { auto_closing: bool },
    Closed,
}

/// Open/close state of one door, advanced by [`DoorMechanism::advance`].
///
/// `is_closed` is the target of the running (or last finished) transition,
/// so a door that is `Closing` already reports closed. `normalized_time` is the
/// progress of the running transition and is 0 whenever nothing runs.
#[derive(Clone, Debug)]
pub struct DoorMechanism {
    config: DoorConfig,
    leaves: Vec<Leaf>,
    is_closed: bool,
    normalized_time: f32,
    transition: Option<Transition>,
    side: bool,
    closed_volume: BoxExtent,
    volume: BoxExtent,
    auto_close: Option<Timer>,
}

impl DoorMechanism {
    pub fn new(config: DoorConfig, leaves: Vec<Leaf>, closed_volume: BoxExtent) -> Self {
        let mut door = Self {
            config,
            leaves,
            is_closed: true,
            normalized_time: 0.0,
            transition: None,
            side: true,
            closed_volume,
            volume: closed_volume,
            auto_close: None,
        };

        if door.config.start_open {
            let direction = door.swing_direction(true);
            door.is_closed = false;
            door.volume = door.open_volume(true);
            door.leaves
                .iter_mut()
                .for_each(|leaf| leaf.step_opening(1.0, direction));
        }

        door
    }

    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn normalized_time(&self) -> f32 {
        self.normalized_time
    }

    pub fn active_transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Side of the most recent opening.
    pub fn side(&self) -> bool {
        self.side
    }

    pub fn volume(&self) -> BoxExtent {
        self.volume
    }

    pub fn closed_volume(&self) -> BoxExtent {
        self.closed_volume
    }

    pub fn open_volume(&self, side: bool) -> BoxExtent {
        open_extent(
            self.config.axis,
            self.closed_volume,
            self.config.open_scale,
            self.config.apply_offset,
            side,
        )
    }

    /// Seconds until the pending auto-close fires.
    pub fn auto_close_remaining(&self) -> Option<f32> {
        self.auto_close.as_ref().map(|timer| timer.remaining_secs())
    }

    pub fn phase(&self) -> DoorPhase {
        match (self.transition, self.is_closed) {
            (Some(Transition::Opening { .. }), _) => DoorPhase::Opening,
            (Some(Transition::Closing { .. }), _) => DoorPhase::Closing,
            (None, true) => DoorPhase::Closed,
            (None, false) => DoorPhase::Open,
        }
    }

    /// Content behind the door is only reachable once it is fully open.
    pub fn content_area_enabled(&self) -> bool {
        self.phase() == DoorPhase::Open
    }

    pub fn swing_direction(&self, side: bool) -> f32 {
        if side || !self.config.two_way {
            1.0
        } else {
            -1.0
        }
    }

    pub fn hint_text(&self, gate: &AccessGate) -> &str {
        let hints = &self.config.hints;
        if !self.is_closed {
            &hints.close
        } else if gate.can_activate(&self.config) {
            &hints.open
        } else {
            &hints.locked
        }
    }

    /// Opens a closed door or closes an open one. A request that arrives while
    /// a transition runs reverses it from the current pose.
    pub fn request_toggle(&mut self, side: bool, gate: &AccessGate) -> DoorSignal {
        if self.is_closed {
            self.begin_opening(side, gate)
        } else {
            self.begin_closing(false)
        }
    }

    /// Proximity only ever opens a resting, closed door.
    pub fn notify_proximity(&mut self, side: bool, gate: &AccessGate) -> Option<DoorSignal> {
        if !self.config.auto_open || self.phase() != DoorPhase::Closed {
            return None;
        }
        Some(self.begin_opening(side, gate))
    }

    /// Moves the running transition forward by `delta` seconds and fires a due auto-close.
    pub fn advance<R: Rng + ?Sized>(&mut self, delta: f32, rng: &mut R) -> Vec<DoorSignal> {
        let delta = delta.max(0.0);
        let mut signals = Vec::new();

        if let Some(timer) = self.auto_close.as_mut() {
            timer.tick(Duration::from_secs_f32(delta));
            if timer.finished() {
                self.auto_close = None;
                if self.phase() == DoorPhase::Open {
                    signals.push(self.begin_closing(true));
                }
            }
        }

        let Some(transition) = self.transition else {
            return signals;
        };

        self.normalized_time = (self.normalized_time + delta / self.config.transition_secs).min(1.0);
        let t = self.normalized_time;

        match transition {
            Transition::Opening { side } => {
                let direction = self.swing_direction(side);
                self.leaves
                    .iter_mut()
                    .for_each(|leaf| leaf.step_opening(t, direction));

                if t >= 1.0 {
                    self.finish();
                    signals.push(DoorSignal::Opened);

                    if self.config.auto_close {
                        let delay = self.sample_auto_close_delay(rng);
                        self.auto_close = Some(Timer::from_seconds(delay, TimerMode::Once));
                        signals.push(DoorSignal::AutoCloseScheduled { delay });
                    }
                }
            }
            Transition::Closing { .. } => {
                self.leaves.iter_mut().for_each(|leaf| leaf.step_closing(t));

                if t >= 1.0 {
                    self.leaves.iter_mut().for_each(Leaf::snap_closed);
                    self.volume = self.closed_volume;
                    self.finish();
                    signals.push(DoorSignal::Closed);
                }
            }
        }

        signals
    }

    fn begin_opening(&mut self, side: bool, gate: &AccessGate) -> DoorSignal {
        if !gate.can_activate(&self.config) {
            return DoorSignal::Denied;
        }

        // Reversing a close swings back toward the side the leaves are already on.
        let side = match self.transition {
            Some(Transition::Closing { .. }) => self.side,
            _ => side,
        };

        self.start(Transition::Opening { side });
        self.is_closed = false;
        self.side = side;
        self.volume = self.open_volume(side);

        DoorSignal::OpeningStarted { side }
    }

    fn begin_closing(&mut self, auto_closing: bool) -> DoorSignal {
        self.start(Transition::Closing { auto_closing });
        self.is_closed = true;
        self.leaves.iter_mut().for_each(Leaf::begin_closing);

        DoorSignal::ClosingStarted { auto_closing }
    }

    /// Replaces whatever runs now. An interrupted transition hands its mirrored
    /// progress to the new one; both directions share one duration.
    fn start(&mut self, transition: Transition) {
        self.auto_close = None;
        self.normalized_time = match self.transition.take() {
            Some(_) => 1.0 - self.normalized_time,
            None => 0.0,
        };
        self.transition = Some(transition);
    }

    fn finish(&mut self) {
        self.transition = None;
        self.normalized_time = 0.0;
    }

    fn sample_auto_close_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let range = self.config.auto_close_delay;
        if range.max <= range.min {
            return range.min;
        }
        rng.gen_range(range.min..=range.max)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::door::{DelayRange, DoorAxis, LeafMotion, Pose, StateFlags};

    const TICK: f32 = 0.1;

    fn leaf(id: u32) -> Leaf {
        Leaf::new(
            Entity::from_raw(id),
            LeafMotion {
                rotation: Vec3::new(0.0, 90.0, 0.0),
                movement: Vec3::new(0.25, 0.0, 0.5),
            },
            Pose {
                translation: Vec3::new(id as f32, 0.0, 0.0),
                rotation: Quat::from_rotation_y(0.3),
            },
        )
    }

    fn door(config: DoorConfig) -> DoorMechanism {
        DoorMechanism::new(
            config,
            vec![leaf(1), leaf(2)],
            BoxExtent::new(Vec3::new(2.0, 3.0, 1.0), Vec3::ZERO),
        )
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn run_until_idle(door: &mut DoorMechanism, rng: &mut StdRng) -> Vec<DoorSignal> {
        let mut signals = Vec::new();
        for _ in 0..1000 {
            if door.active_transition().is_none() {
                break;
            }
            signals.extend(door.advance(TICK, rng));
        }
        signals
    }

    #[test]
    fn full_cycle_returns_exactly_to_closed_pose() {
        let mut door = door(DoorConfig::default());
        let mut rng = rng();
        let gate = AccessGate::default();
        let closed = door.leaves().iter().map(Leaf::closed).collect::<Vec<_>>();

        assert_eq!(door.phase(), DoorPhase::Closed);
        assert_eq!(
            door.request_toggle(true, &gate),
            DoorSignal::OpeningStarted { side: true }
        );
        assert_eq!(door.phase(), DoorPhase::Opening);
        assert_eq!(run_until_idle(&mut door, &mut rng), vec![DoorSignal::Opened]);
        assert_eq!(door.phase(), DoorPhase::Open);
        assert_eq!(door.normalized_time(), 0.0);
        assert!(door.content_area_enabled());

        assert_eq!(
            door.request_toggle(false, &gate),
            DoorSignal::ClosingStarted { auto_closing: false }
        );
        assert!(!door.content_area_enabled());
        assert_eq!(run_until_idle(&mut door, &mut rng), vec![DoorSignal::Closed]);
        assert_eq!(door.phase(), DoorPhase::Closed);
        assert_eq!(door.normalized_time(), 0.0);

        for (leaf, closed) in door.leaves().iter().zip(closed) {
            assert_eq!(leaf.current(), closed);
            assert_eq!(leaf.open_rotation(), None);
        }
        assert_eq!(door.volume(), door.closed_volume());
    }

    #[test]
    fn interrupting_opening_mirrors_progress_without_jump() {
        let gate = AccessGate::default();
        let mut rng = rng();

        for ticks in 1..15 {
            let mut door = door(DoorConfig::default());
            door.request_toggle(true, &gate);
            for _ in 0..ticks {
                door.advance(TICK, &mut rng);
            }
            let t = door.normalized_time();
            let before = door.leaves()[0].current();

            door.request_toggle(true, &gate);
            assert_eq!(door.phase(), DoorPhase::Closing);
            assert!((door.normalized_time() - (1.0 - t)).abs() < 1e-6);

            let resumed = door.leaves()[0].closing_pose(door.normalized_time());
            assert!(resumed.translation.abs_diff_eq(before.translation, 1e-5));
        }
    }

    #[test]
    fn interrupting_closing_reopens_from_mirrored_time() {
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(DoorConfig::default());

        door.request_toggle(true, &gate);
        run_until_idle(&mut door, &mut rng);
        door.request_toggle(true, &gate);
        for _ in 0..4 {
            door.advance(TICK, &mut rng);
        }
        let t = door.normalized_time();
        let before = door.leaves()[0].current();

        assert_eq!(
            door.request_toggle(true, &gate),
            DoorSignal::OpeningStarted { side: true }
        );
        assert!((door.normalized_time() - (1.0 - t)).abs() < 1e-6);
        let resumed = door.leaves()[0].opening_pose(door.normalized_time(), 1.0);
        assert!(resumed.translation.abs_diff_eq(before.translation, 1e-5));
    }

    #[test]
    fn reopening_two_way_door_keeps_swing_side() {
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(DoorConfig {
            two_way: true,
            open_scale: 3.0,
            ..default()
        });

        door.request_toggle(true, &gate);
        run_until_idle(&mut door, &mut rng);
        door.request_toggle(true, &gate);
        for _ in 0..3 {
            door.advance(TICK, &mut rng);
        }
        let before = door.leaves()[0].current();

        // Approached from the other side while half closed.
        assert_eq!(
            door.request_toggle(false, &gate),
            DoorSignal::OpeningStarted { side: true }
        );
        assert!(door.side());
        assert_eq!(door.volume(), door.open_volume(true));

        door.advance(0.0, &mut rng);
        let after = door.leaves()[0].current();
        assert!(after.rotation.angle_between(before.rotation) < 1e-3);
        assert!(after.translation.abs_diff_eq(before.translation, 1e-5));
    }

    #[test]
    fn two_way_door_at_rest_opens_toward_caller_side() {
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(DoorConfig {
            two_way: true,
            ..default()
        });

        door.request_toggle(true, &gate);
        run_until_idle(&mut door, &mut rng);
        door.request_toggle(true, &gate);
        run_until_idle(&mut door, &mut rng);

        assert_eq!(
            door.request_toggle(false, &gate),
            DoorSignal::OpeningStarted { side: false }
        );
        assert!(!door.side());
    }

    #[test]
    fn toggling_open_door_starts_a_single_close() {
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(DoorConfig::default());

        door.request_toggle(true, &gate);
        run_until_idle(&mut door, &mut rng);
        door.request_toggle(true, &gate);

        assert_eq!(
            door.active_transition(),
            Some(Transition::Closing { auto_closing: false })
        );
        assert_eq!(door.normalized_time(), 0.0);
        let signals = run_until_idle(&mut door, &mut rng);
        assert_eq!(signals, vec![DoorSignal::Closed]);
    }

    #[test]
    fn locked_door_refuses_and_reports_locked_hint() {
        let config = DoorConfig {
            required_states: vec!["power".to_owned()],
            ..default()
        };
        let mut door = door(config);
        let gate = AccessGate::default();

        assert_eq!(door.request_toggle(true, &gate), DoorSignal::Denied);
        assert_eq!(door.phase(), DoorPhase::Closed);
        assert_eq!(door.active_transition(), None);
        assert_eq!(door.hint_text(&gate), "Locked");

        let mut flags = StateFlags::default();
        flags.set("power");
        let gate = AccessGate::from_resources(Some(&flags), None);
        assert_eq!(door.hint_text(&gate), "Open");
        assert_eq!(
            door.request_toggle(true, &gate),
            DoorSignal::OpeningStarted { side: true }
        );
        assert_eq!(door.hint_text(&AccessGate::default()), "Close");
    }

    #[test]
    fn auto_close_scheduled_once_within_range() {
        let config = DoorConfig {
            auto_close: true,
            auto_close_delay: DelayRange { min: 2.0, max: 3.0 },
            ..default()
        };
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(config);

        door.request_toggle(true, &gate);
        let signals = run_until_idle(&mut door, &mut rng);
        let delays = signals
            .iter()
            .filter_map(|signal| match signal {
                DoorSignal::AutoCloseScheduled { delay } => Some(*delay),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(delays.len(), 1);
        assert!((2.0..=3.0).contains(&delays[0]));

        let mut closes = 0;
        for _ in 0..60 {
            closes += door
                .advance(TICK, &mut rng)
                .iter()
                .filter(|s| matches!(s, DoorSignal::ClosingStarted { auto_closing: true }))
                .count();
        }
        assert_eq!(closes, 1);
        assert_eq!(door.phase(), DoorPhase::Closed);
    }

    #[test]
    fn manual_toggle_cancels_pending_auto_close() {
        let config = DoorConfig {
            auto_close: true,
            auto_close_delay: DelayRange { min: 1.0, max: 1.0 },
            ..default()
        };
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(config);

        door.request_toggle(true, &gate);
        run_until_idle(&mut door, &mut rng);
        assert_eq!(door.auto_close_remaining(), Some(1.0));

        door.request_toggle(true, &gate);
        assert_eq!(door.auto_close_remaining(), None);
        run_until_idle(&mut door, &mut rng);

        for _ in 0..30 {
            assert!(door.advance(TICK, &mut rng).is_empty());
        }
        assert_eq!(door.phase(), DoorPhase::Closed);
    }

    #[test]
    fn two_way_door_swings_and_offsets_by_side() {
        let config = DoorConfig {
            two_way: true,
            open_scale: 3.0,
            axis: DoorAxis::Z,
            ..default()
        };
        let gate = AccessGate::default();

        let mut front = door(config.clone());
        front.request_toggle(true, &gate);
        let mut back = door(config);
        back.request_toggle(false, &gate);

        assert_eq!(front.volume().center.z, -1.5);
        assert_eq!(back.volume().center.z, 1.5);
        assert_eq!(front.volume().size.z, 3.0);

        let swing = |door: &DoorMechanism, side: bool| {
            let leaf = &door.leaves()[0];
            let open = leaf.opening_pose(1.0, door.swing_direction(side));
            (leaf.closed().rotation.inverse() * open.rotation).to_axis_angle()
        };
        let (front_axis, front_angle) = swing(&front, true);
        let (back_axis, back_angle) = swing(&back, false);
        assert!((front_angle - back_angle).abs() < 1e-5);
        assert!(front_axis.y > 0.99);
        assert!(back_axis.y < -0.99);
    }

    #[test]
    fn one_way_door_ignores_side_for_swing() {
        let door = door(DoorConfig::default());
        assert_eq!(door.swing_direction(true), door.swing_direction(false));
    }

    #[test]
    fn proximity_only_opens_resting_closed_door() {
        let gate = AccessGate::default();
        let mut rng = rng();

        let mut manual = door(DoorConfig::default());
        assert_eq!(manual.notify_proximity(true, &gate), None);

        let mut auto = door(DoorConfig {
            auto_open: true,
            ..default()
        });
        assert_eq!(
            auto.notify_proximity(false, &gate),
            Some(DoorSignal::OpeningStarted { side: false })
        );
        assert_eq!(auto.notify_proximity(true, &gate), None);
        run_until_idle(&mut auto, &mut rng);
        assert_eq!(auto.notify_proximity(true, &gate), None);

        auto.request_toggle(true, &gate);
        auto.advance(TICK, &mut rng);
        assert_eq!(auto.phase(), DoorPhase::Closing);
        assert_eq!(auto.notify_proximity(true, &gate), None);
    }

    #[test]
    fn start_open_snaps_to_open_pose() {
        let door = door(DoorConfig {
            start_open: true,
            open_scale: 2.0,
            ..default()
        });

        assert_eq!(door.phase(), DoorPhase::Open);
        assert!(door.content_area_enabled());
        assert_eq!(door.volume(), door.open_volume(true));
        let leaf = &door.leaves()[0];
        assert_eq!(leaf.current(), leaf.opening_pose(1.0, 1.0));
    }

    #[test]
    fn opening_volume_applies_immediately_and_reverts_on_close() {
        let gate = AccessGate::default();
        let mut rng = rng();
        let mut door = door(DoorConfig {
            open_scale: 3.0,
            ..default()
        });

        door.request_toggle(false, &gate);
        assert_eq!(door.volume(), door.open_volume(false));

        run_until_idle(&mut door, &mut rng);
        door.request_toggle(true, &gate);
        door.advance(TICK, &mut rng);
        assert_eq!(door.volume(), door.open_volume(false));

        run_until_idle(&mut door, &mut rng);
        assert_eq!(door.volume(), door.closed_volume());
    }
}
