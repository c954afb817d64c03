use avian3d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug)]
pub enum GameLayer {
    #[default]
    World,
    Door,
    ContentArea,
    Sensor,
    Actor,
    Prop,
}

/// Layers for a door's blocking volume. Props are kept out of the space the
/// leaves occupy; actors walk through and are stopped by the leaves alone.
pub fn door_blocker_layers() -> CollisionLayers {
    CollisionLayers::new(GameLayer::Door, [GameLayer::Prop])
}

/// Layers for a proximity trigger. Sensors only ever report actors.
pub fn door_sensor_layers() -> CollisionLayers {
    CollisionLayers::new(GameLayer::Sensor, [GameLayer::Actor])
}

pub fn actor_layers() -> CollisionLayers {
    CollisionLayers::new(
        GameLayer::Actor,
        [
            GameLayer::World,
            GameLayer::ContentArea,
            GameLayer::Sensor,
            GameLayer::Prop,
        ],
    )
}

pub fn prop_layers() -> CollisionLayers {
    CollisionLayers::new(
        GameLayer::Prop,
        [
            GameLayer::World,
            GameLayer::Door,
            GameLayer::Actor,
            GameLayer::Prop,
        ],
    )
}
