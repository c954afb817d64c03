use bevy::{prelude::*, transform::TransformSystem};
use bevy_rand::{plugin::EntropyPlugin, prelude::WyRand};

mod access;
mod config;
mod geometry;
mod leaf;
mod machine;
mod side;
mod systems;

pub use access::*;
pub use config::*;
pub use geometry::*;
pub use leaf::*;
pub use machine::*;
pub use side::*;

/// Describes a door to build. The plugin reads it once, captures the leaves'
/// current poses as closed, and inserts a [`Door`].
#[derive(Component, Clone, Debug)]
pub struct DoorSpec {
    pub config: DoorConfig,
    pub leaves: Vec<LeafSpec>,
    /// Blocking volume while closed, in the door's local space.
    pub volume: BoxExtent,
    /// Proximity trigger, needed for `auto_open`.
    pub sensor: Option<BoxExtent>,
    /// Colliders that only exist while the door stands open.
    pub content_area: Vec<Entity>,
}

#[derive(Component)]
pub struct Door {
    mechanism: DoorMechanism,
    plane: SidePlane,
    blocker: Entity,
    sensor: Option<Entity>,
    content_area: Vec<Entity>,
    content_enabled: bool,
}

impl Door {
    pub fn mechanism(&self) -> &DoorMechanism {
        &self.mechanism
    }

    pub fn config(&self) -> &DoorConfig {
        self.mechanism.config()
    }

    pub fn phase(&self) -> DoorPhase {
        self.mechanism.phase()
    }

    pub fn side_plane(&self) -> SidePlane {
        self.plane
    }

    pub fn side_of(&self, point: Vec3) -> bool {
        self.plane.side(point)
    }

    pub fn blocker(&self) -> Entity {
        self.blocker
    }

    pub fn sensor(&self) -> Option<Entity> {
        self.sensor
    }

    pub fn content_area(&self) -> &[Entity] {
        &self.content_area
    }
}

/// Collider that keeps actors out of the space a door occupies.
#[derive(Component)]
pub struct DoorBlocker {
    pub door: Entity,
    applied: BoxExtent,
}

#[derive(Component)]
pub struct DoorSensor {
    pub door: Entity,
}

/// Only actors can open doors by walking into them.
#[derive(Component, Default)]
pub struct DoorActor;

/// What interacting with the door would do right now.
#[derive(Component, Default, Debug, Clone, PartialEq)]
pub struct DoorHint(pub String);

#[derive(Event, Clone, Copy, Debug)]
pub struct ToggleDoor {
    pub door: Entity,
    pub actor: Entity,
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct DoorChanged {
    pub door: Entity,
    pub signal: DoorSignal,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DoorSystems;

/// Doors draw auto-close delays from the global [`WyRand`] source. Add your own
/// [`EntropyPlugin`] before this plugin to seed it; otherwise one seeded from the OS is added.
pub struct DoorPlugin;

impl Plugin for DoorPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EntropyPlugin<WyRand>>() {
            app.add_plugins(EntropyPlugin::<WyRand>::default());
        }

        app.add_event::<ToggleDoor>();
        app.add_event::<DoorChanged>();
        app.add_systems(
            Update,
            (
                systems::toggle_doors,
                systems::open_doors_on_contact,
                systems::animate_doors,
                systems::sync_door_blockers,
                systems::sync_content_areas,
                systems::update_door_hints,
            )
                .chain()
                .in_set(DoorSystems),
        );
        app.add_systems(
            PostUpdate,
            systems::setup_doors.after(TransformSystem::TransformPropagate),
        );
    }
}
