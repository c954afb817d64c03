use std::{fs::File, io::Read, path::Path};

use anyhow::anyhow;
use avian3d::prelude::*;
use bevy::prelude::*;
use lib::{
    door::{BoxExtent, DoorConfig, DoorSpec, LeafMotion, LeafSpec},
    physics::GameLayer,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Resource)]
pub struct DoorwayCatalog {
    pub doorways: Vec<Doorway>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Doorway {
    pub name: String,
    pub position: Vec3,
    /// Degrees around +Y.
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub config: DoorConfig,
    pub leaves: Vec<DoorwayLeaf>,
    pub volume: BoxExtent,
    #[serde(default)]
    pub sensor: Option<BoxExtent>,
    /// Collider behind the door that only exists while it stands open.
    #[serde(default)]
    pub content: Option<BoxExtent>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DoorwayLeaf {
    /// Pivot of the leaf, relative to the doorway.
    pub hinge: Vec3,
    pub size: Vec3,
    /// Mesh center relative to the hinge.
    pub offset: Vec3,
    #[serde(default)]
    pub motion: LeafMotion,
}

impl DoorwayCatalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut file = File::open(path)
            .map_err(|err| anyhow!("failed to open {}: {err}", path.display()))?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;

        let catalog: Self = ron::from_str(&text)?;
        for doorway in &catalog.doorways {
            doorway
                .config
                .validate()
                .map_err(|err| anyhow!("doorway {:?}: {err}", doorway.name))?;
            if doorway.config.auto_open && doorway.sensor.is_none() {
                return Err(anyhow!(
                    "doorway {:?} opens automatically but has no sensor",
                    doorway.name
                ));
            }
        }

        Ok(catalog)
    }
}

pub fn spawn_doorways(
    mut commands: Commands,
    catalog: Res<DoorwayCatalog>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let leaf_material = materials.add(StandardMaterial {
        reflectance: 0.0,
        base_color: Color::srgb(0.45, 0.3, 0.2),
        ..default()
    });
    let content_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.2, 0.8, 0.3, 0.35),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    for doorway in &catalog.doorways {
        let root = commands
            .spawn((
                Name::new(doorway.name.clone()),
                Transform::from_translation(doorway.position)
                    .with_rotation(Quat::from_rotation_y(doorway.yaw.to_radians())),
                Visibility::default(),
            ))
            .id();

        let leaves = doorway
            .leaves
            .iter()
            .map(|leaf| {
                let hinge = commands
                    .spawn((Transform::from_translation(leaf.hinge), Visibility::default()))
                    .with_children(|parent| {
                        parent.spawn((
                            Transform::from_translation(leaf.offset),
                            Mesh3d(meshes.add(Cuboid::from_size(leaf.size))),
                            MeshMaterial3d(leaf_material.clone()),
                        ));
                    })
                    .id();
                commands.entity(root).add_child(hinge);
                LeafSpec::new(hinge, leaf.motion)
            })
            .collect::<Vec<_>>();

        let content_area = doorway
            .content
            .map(|extent| {
                let content = commands
                    .spawn((
                        Transform::from_translation(extent.center),
                        RigidBody::Static,
                        Collider::cuboid(extent.size.x, extent.size.y, extent.size.z),
                        CollisionLayers::new(GameLayer::ContentArea, [GameLayer::Actor]),
                        Mesh3d(meshes.add(Cuboid::from_size(extent.size))),
                        MeshMaterial3d(content_material.clone()),
                    ))
                    .id();
                commands.entity(root).add_child(content);
                content
            })
            .into_iter()
            .collect::<Vec<_>>();

        commands.entity(root).insert(DoorSpec {
            config: doorway.config.clone(),
            leaves,
            volume: doorway.volume,
            sensor: doorway.sensor,
            content_area,
        });

        info!(name = %doorway.name, "spawned doorway");
    }
}
