use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::DoorAxis;

/// Axis-aligned box in the door's local space.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxExtent {
    pub size: Vec3,
    pub center: Vec3,
}

impl BoxExtent {
    pub fn new(size: Vec3, center: Vec3) -> Self {
        Self { size, center }
    }
}

/// Blocking volume while open, covering the area the leaves sweep.
///
/// The volume is stretched along `axis` and pushed to the side facing away from
/// the actor, so `side` selects the sign of the shift.
pub fn open_extent(
    axis: DoorAxis,
    closed: BoxExtent,
    open_scale: f32,
    apply_offset: bool,
    side: bool,
) -> BoxExtent {
    let axis = axis.index();

    let mut size = closed.size;
    size[axis] *= open_scale;

    let mut center = closed.center;
    if apply_offset {
        let offset = size[axis] / 2.0;
        let offset = if side { offset } else { -offset };
        center[axis] = closed.center[axis] - offset;
    }

    BoxExtent { size, center }
}
