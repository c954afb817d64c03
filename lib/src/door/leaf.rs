use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// How far a leaf travels between its closed and open pose.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct LeafMotion {
    /// Euler angles in degrees, applied Y then X then Z.
    pub rotation: Vec3,
    /// Translation along the leaf's own axes.
    pub movement: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafSpec {
    /// `None` marks a leaf whose transform went missing; it is dropped on setup.
    pub target: Option<Entity>,
    pub motion: LeafMotion,
}

impl LeafSpec {
    pub fn new(target: Entity, motion: LeafMotion) -> Self {
        Self {
            target: Some(target),
            motion,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            translation: transform.translation,
            rotation: transform.rotation,
        }
    }

    pub fn apply(&self, transform: &mut Transform) {
        transform.translation = self.translation;
        transform.rotation = self.rotation;
    }
}

pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

/// One animated part of a door.
#[derive(Clone, Debug)]
pub struct Leaf {
    target: Entity,
    rotation_delta: Vec3,
    closed: Pose,
    open_translation: Vec3,
    /// Orientation reached when closing began; only set while a close is in flight.
    open_rotation: Option<Quat>,
    current: Pose,
}

impl Leaf {
    /// `closed` is the leaf's pose as found in the scene.
    pub fn new(target: Entity, motion: LeafMotion, closed: Pose) -> Self {
        Self {
            target,
            rotation_delta: motion.rotation,
            closed,
            open_translation: closed.translation - closed.rotation * motion.movement,
            open_rotation: None,
            current: closed,
        }
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn closed(&self) -> Pose {
        self.closed
    }

    pub fn open_translation(&self) -> Vec3 {
        self.open_translation
    }

    pub fn open_rotation(&self) -> Option<Quat> {
        self.open_rotation
    }

    pub fn current(&self) -> Pose {
        self.current
    }

    /// `direction` is +1 or -1 and picks which way the leaf swings.
    pub fn opening_pose(&self, t: f32, direction: f32) -> Pose {
        Pose {
            translation: self.closed.translation.lerp(self.open_translation, t),
            rotation: self.closed.rotation * euler_degrees(self.rotation_delta * direction * t),
        }
    }

    pub fn closing_pose(&self, t: f32) -> Pose {
        let from = self.open_rotation.unwrap_or(self.current.rotation);
        Pose {
            translation: self.open_translation.lerp(self.closed.translation, t),
            rotation: from.slerp(self.closed.rotation, t),
        }
    }

    pub(crate) fn begin_closing(&mut self) {
        self.open_rotation = Some(self.current.rotation);
    }

    pub(crate) fn step_opening(&mut self, t: f32, direction: f32) {
        self.current = self.opening_pose(t, direction);
    }

    pub(crate) fn step_closing(&mut self, t: f32) {
        self.current = self.closing_pose(t);
    }

    pub(crate) fn snap_closed(&mut self) {
        self.current = self.closed;
        self.open_rotation = None;
    }
}
