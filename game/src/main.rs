use std::path::Path;

use avian3d::prelude::*;
use bevy::{prelude::*, window::PresentMode};
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use bevy_rand::{plugin::EntropyPlugin, prelude::WyRand};
use lib::{
    door::{DoorHint, DoorPlugin, StateFlags},
    physics::{prop_layers, GameLayer},
};

mod actor;
mod catalog;

use actor::{ActorPlugin, FocusedDoor};
use catalog::{spawn_doorways, DoorwayCatalog};

fn main() -> anyhow::Result<()> {
    let catalog_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/doorways.ron");
    let catalog = DoorwayCatalog::load(&catalog_path)?;

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            present_mode: PresentMode::AutoNoVsync,
            title: "Doorways".to_string(),
            ..default()
        }),
        ..default()
    }));

    app.add_plugins((
        EguiPlugin,
        PhysicsPlugins::default(),
        EntropyPlugin::<WyRand>::default(),
    ));

    app.add_plugins((DoorPlugin, ActorPlugin));

    // Doors that need the keycard stay locked until the flag is set.
    app.init_resource::<StateFlags>();
    app.insert_resource(catalog);

    app.add_systems(Startup, (setup_world, spawn_doorways));
    app.add_systems(Update, hint_ui);

    app.run();

    Ok(())
}

fn setup_world(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(1.0, 1.0, 1.0).into(),
        brightness: 800.0,
    });
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground
    let (radius, height) = (32.0, 1.0);
    commands.spawn((
        RigidBody::Static,
        Transform::from_translation(Vec3::NEG_Y * (height / 2.0)),
        Collider::cylinder(radius, height),
        CollisionLayers::new(GameLayer::World, [GameLayer::all_bits()]),
        Mesh3d(meshes.add(Cylinder::new(radius, height).mesh().resolution(32))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.4, 0.4, 0.4),
            ..default()
        })),
    ));

    // Crates to push around; door blockers keep them out of swinging leaves.
    let crate_size = 0.8;
    let crate_mesh = meshes.add(Cuboid::from_length(crate_size));
    let crate_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.6, 0.5, 0.3),
        ..default()
    });
    for x in [-2.0, 2.0] {
        commands.spawn((
            RigidBody::Dynamic,
            Transform::from_xyz(x, crate_size / 2.0, 3.0),
            Collider::cuboid(crate_size, crate_size, crate_size),
            prop_layers(),
            Mesh3d(crate_mesh.clone()),
            MeshMaterial3d(crate_material.clone()),
        ));
    }
}

fn hint_ui(
    mut contexts: EguiContexts,
    focused: Res<FocusedDoor>,
    hints: Query<&DoorHint>,
    flags: Res<StateFlags>,
) {
    egui::Area::new(egui::Id::new("door_hint"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -48.0))
        .show(contexts.ctx_mut(), |ui| {
            if let Some(hint) = focused.0.and_then(|door| hints.get(door).ok()) {
                ui.heading(format!("[E] {}", hint.0));
            }
            ui.label(if flags.is_set("keycard") {
                "Keycard held [K]"
            } else {
                "No keycard [K]"
            });
        });
}
