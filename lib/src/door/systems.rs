use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_rand::{global::GlobalEntropy, prelude::WyRand};

use crate::physics::{door_blocker_layers, door_sensor_layers};

use super::{
    AccessGate, Door, DoorActor, DoorBlocker, DoorChanged, DoorHint, DoorMechanism, DoorSensor,
    DoorSignal, DoorSpec, Inventory, Leaf, Pose, SidePlane, StateFlags, ToggleDoor,
};

pub(super) fn setup_doors(
    mut commands: Commands,
    specs: Query<(Entity, &DoorSpec, &GlobalTransform), Added<DoorSpec>>,
    mut transforms: Query<&mut Transform>,
) {
    for (entity, spec, global_transform) in specs.iter() {
        if let Err(err) = spec.config.validate() {
            warn!(door = ?entity, %err, "invalid door config, not building door");
            continue;
        }

        let leaves = spec
            .leaves
            .iter()
            .enumerate()
            .filter_map(|(index, leaf)| {
                let Some(target) = leaf.target else {
                    warn!(door = ?entity, index, "leaf has no target, skipping");
                    return None;
                };
                let Ok(transform) = transforms.get(target) else {
                    warn!(door = ?entity, index, leaf = ?target, "leaf has no transform, skipping");
                    return None;
                };
                Some(Leaf::new(target, leaf.motion, Pose::from_transform(transform)))
            })
            .collect::<Vec<_>>();

        let mechanism = DoorMechanism::new(spec.config.clone(), leaves, spec.volume);

        // Doors that start open have already moved their leaves.
        for leaf in mechanism.leaves() {
            if let Ok(mut transform) = transforms.get_mut(leaf.target()) {
                leaf.current().apply(&mut transform);
            }
        }

        let volume = mechanism.volume();
        let blocker = commands
            .spawn((
                DoorBlocker {
                    door: entity,
                    applied: volume,
                },
                Transform::from_translation(volume.center),
                RigidBody::Static,
                cuboid(volume.size),
                door_blocker_layers(),
            ))
            .id();
        commands.entity(entity).add_child(blocker);

        let sensor = spec.sensor.map(|extent| {
            let sensor = commands
                .spawn((
                    DoorSensor { door: entity },
                    Transform::from_translation(extent.center),
                    RigidBody::Static,
                    cuboid(extent.size),
                    Sensor,
                    door_sensor_layers(),
                ))
                .id();
            commands.entity(entity).add_child(sensor);
            sensor
        });

        let content_enabled = mechanism.content_area_enabled();
        set_content_area(&mut commands, &spec.content_area, content_enabled);

        info!(
            door = ?entity,
            leaves = mechanism.leaves().len(),
            phase = %mechanism.phase(),
            "door ready"
        );

        commands.entity(entity).insert((
            Door {
                mechanism,
                plane: SidePlane::from_transform(global_transform, spec.config.axis),
                blocker,
                sensor,
                content_area: spec.content_area.clone(),
                content_enabled,
            },
            DoorHint::default(),
        ));
    }
}

pub(super) fn toggle_doors(
    mut events: EventReader<ToggleDoor>,
    mut changed: EventWriter<DoorChanged>,
    mut doors: Query<&mut Door>,
    actors: Query<&GlobalTransform>,
    flags: Option<Res<StateFlags>>,
    inventory: Option<Res<Inventory>>,
) {
    let gate = AccessGate::from_resources(flags.as_deref(), inventory.as_deref());

    for &ToggleDoor { door: entity, actor } in events.read() {
        let Ok(mut door) = doors.get_mut(entity) else {
            continue;
        };
        let Ok(actor) = actors.get(actor) else {
            continue;
        };

        let side = door.side_of(actor.translation());
        let signal = door.mechanism.request_toggle(side, &gate);
        report(&mut changed, entity, signal);
    }
}

pub(super) fn open_doors_on_contact(
    mut collisions: EventReader<CollisionStarted>,
    mut changed: EventWriter<DoorChanged>,
    mut doors: Query<&mut Door>,
    sensors: Query<&DoorSensor>,
    actors: Query<&GlobalTransform, With<DoorActor>>,
    flags: Option<Res<StateFlags>>,
    inventory: Option<Res<Inventory>>,
) {
    let gate = AccessGate::from_resources(flags.as_deref(), inventory.as_deref());

    for CollisionStarted(entity1, entity2) in collisions.read() {
        let (sensor, actor) = match (sensors.get(*entity1), actors.get(*entity2)) {
            (Ok(sensor), Ok(actor)) => (sensor, actor),
            _ => match (sensors.get(*entity2), actors.get(*entity1)) {
                (Ok(sensor), Ok(actor)) => (sensor, actor),
                _ => continue,
            },
        };
        let Ok(mut door) = doors.get_mut(sensor.door) else {
            continue;
        };

        let side = door.side_of(actor.translation());
        if let Some(signal) = door.mechanism.notify_proximity(side, &gate) {
            report(&mut changed, sensor.door, signal);
        }
    }
}

pub(super) fn animate_doors(
    time: Res<Time>,
    mut rng: GlobalEntropy<WyRand>,
    mut changed: EventWriter<DoorChanged>,
    mut doors: Query<(Entity, &mut Door)>,
    mut leaves: Query<&mut Transform, (Without<Door>, Without<DoorBlocker>)>,
) {
    for (entity, mut door) in doors.iter_mut() {
        let animating = door.mechanism.active_transition().is_some();
        let signals = door.mechanism.advance(time.delta_secs(), &mut **rng);

        if animating || !signals.is_empty() {
            // Every leaf of a door moves with the same normalized time.
            for leaf in door.mechanism.leaves() {
                if let Ok(mut transform) = leaves.get_mut(leaf.target()) {
                    leaf.current().apply(&mut transform);
                }
            }
        }

        for signal in signals {
            report(&mut changed, entity, signal);
        }
    }
}

pub(super) fn sync_door_blockers(
    doors: Query<&Door>,
    mut blockers: Query<(&mut DoorBlocker, &mut Transform, &mut Collider), Without<Door>>,
) {
    for door in doors.iter() {
        let Ok((mut blocker, mut transform, mut collider)) = blockers.get_mut(door.blocker) else {
            continue;
        };

        let volume = door.mechanism.volume();
        if blocker.applied == volume {
            continue;
        }

        transform.translation = volume.center;
        *collider = cuboid(volume.size);
        blocker.applied = volume;
    }
}

pub(super) fn sync_content_areas(mut commands: Commands, mut doors: Query<&mut Door>) {
    for mut door in doors.iter_mut() {
        let enabled = door.mechanism.content_area_enabled();
        if door.content_enabled == enabled {
            continue;
        }

        door.content_enabled = enabled;
        set_content_area(&mut commands, &door.content_area, enabled);
    }
}

pub(super) fn update_door_hints(
    mut doors: Query<(&Door, &mut DoorHint)>,
    flags: Option<Res<StateFlags>>,
    inventory: Option<Res<Inventory>>,
) {
    let gate = AccessGate::from_resources(flags.as_deref(), inventory.as_deref());

    for (door, mut hint) in doors.iter_mut() {
        let text = door.mechanism.hint_text(&gate);
        if hint.0 != text {
            hint.0 = text.to_owned();
        }
    }
}

//
// Utility
//

fn cuboid(size: Vec3) -> Collider {
    Collider::cuboid(size.x, size.y, size.z)
}

fn set_content_area(commands: &mut Commands, content_area: &[Entity], enabled: bool) {
    for &entity in content_area {
        let Some(mut entity) = commands.get_entity(entity) else {
            continue;
        };
        if enabled {
            entity.remove::<ColliderDisabled>();
        } else {
            entity.try_insert(ColliderDisabled);
        }
    }
}

fn report(changed: &mut EventWriter<DoorChanged>, door: Entity, signal: DoorSignal) {
    match signal {
        DoorSignal::Denied => debug!(door = ?door, "door is locked"),
        DoorSignal::AutoCloseScheduled { delay } => debug!(door = ?door, delay, "auto close scheduled"),
        signal => debug!(door = ?door, ?signal, "door changed"),
    }
    changed.send(DoorChanged { door, signal });
}
