pub mod door;
pub mod physics;
