use bevy::prelude::*;

use super::DoorAxis;

/// Resting plane of a door, used to tell which side an actor stands on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SidePlane {
    origin: Vec3,
    normal: Vec3,
}

impl SidePlane {
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: normal.normalize_or(Vec3::Z),
        }
    }

    pub fn from_transform(transform: &GlobalTransform, axis: DoorAxis) -> Self {
        Self::new(transform.translation(), transform.rotation() * axis.unit())
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// `true` when `point` is on the side the normal points to. Points on the plane count as `true`.
    pub fn side(&self, point: Vec3) -> bool {
        (point - self.origin).dot(self.normal) >= 0.0
    }
}
