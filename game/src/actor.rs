use avian3d::prelude::*;
use bevy::prelude::*;
use lib::{
    door::{Door, DoorActor, DoorChanged, StateFlags, ToggleDoor},
    physics::actor_layers,
};

const SPEED: f32 = 5.0;
const REACH: f32 = 3.0;
const KEYCARD: &str = "keycard";

#[derive(Component)]
pub struct Player;

/// Door the player would toggle by pressing the interact key.
#[derive(Resource, Default)]
pub struct FocusedDoor(pub Option<Entity>);

pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FocusedDoor>();
        app.add_systems(Startup, spawn_player);
        app.add_systems(
            Update,
            (move_player, focus_door, interact, toggle_keycard, log_door_changes),
        );
    }
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands
        .spawn((
            Player,
            DoorActor,
            Transform::from_xyz(0.0, 1.0, 6.0),
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::capsule(0.4, 1.0),
            actor_layers(),
            Mesh3d(meshes.add(Capsule3d::new(0.4, 1.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.2, 0.4, 0.9),
                ..default()
            })),
        ))
        .with_children(|parent| {
            parent.spawn((
                Camera3d::default(),
                Transform::from_xyz(0.0, 7.0, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
            ));
        });
}

fn move_player(keys: Res<ButtonInput<KeyCode>>, mut player: Query<&mut LinearVelocity, With<Player>>) {
    let Ok(mut velocity) = player.get_single_mut() else {
        return;
    };

    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }

    let horizontal = direction.normalize_or_zero() * SPEED;
    velocity.x = horizontal.x;
    velocity.z = horizontal.z;
}

fn focus_door(
    mut focused: ResMut<FocusedDoor>,
    player: Query<&GlobalTransform, With<Player>>,
    doors: Query<(Entity, &GlobalTransform), With<Door>>,
) {
    let Ok(player) = player.get_single() else {
        return;
    };

    focused.0 = doors
        .iter()
        .map(|(entity, transform)| (entity, transform.translation().distance(player.translation())))
        .filter(|(_, distance)| *distance <= REACH)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity);
}

fn interact(
    keys: Res<ButtonInput<KeyCode>>,
    focused: Res<FocusedDoor>,
    player: Query<Entity, With<Player>>,
    mut toggles: EventWriter<ToggleDoor>,
) {
    if !keys.just_pressed(KeyCode::KeyE) {
        return;
    }
    let (Some(door), Ok(actor)) = (focused.0, player.get_single()) else {
        return;
    };
    toggles.send(ToggleDoor { door, actor });
}

fn toggle_keycard(keys: Res<ButtonInput<KeyCode>>, mut flags: ResMut<StateFlags>) {
    if !keys.just_pressed(KeyCode::KeyK) {
        return;
    }
    if flags.is_set(KEYCARD) {
        flags.clear(KEYCARD);
    } else {
        flags.set(KEYCARD);
    }
    info!(held = flags.is_set(KEYCARD), "keycard toggled");
}

fn log_door_changes(mut events: EventReader<DoorChanged>, names: Query<&Name>) {
    for event in events.read() {
        let name = names
            .get(event.door)
            .map(|name| name.as_str().to_owned())
            .unwrap_or_else(|_| format!("{:?}", event.door));
        info!(door = %name, signal = ?event.signal, "door");
    }
}
