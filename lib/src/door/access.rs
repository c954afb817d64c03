use std::collections::HashSet;

use bevy::prelude::*;

use super::DoorConfig;

/// External store of world state flags (power restored, key quest finished, ...).
pub trait PermissionService {
    fn are_states_set(&self, required: &[String]) -> bool;
}

pub trait InventoryService {
    fn has_items(&self, required: &[String]) -> bool;
}

/// Flags currently set in the world. Doors that require flags stay locked while
/// this resource is missing.
#[derive(Resource, Default, Debug, Clone)]
pub struct StateFlags(pub HashSet<String>);

impl StateFlags {
    pub fn set(&mut self, flag: impl Into<String>) {
        self.0.insert(flag.into());
    }

    pub fn clear(&mut self, flag: &str) {
        self.0.remove(flag);
    }

    pub fn is_set(&self, flag: &str) -> bool {
        self.0.contains(flag)
    }
}

impl PermissionService for StateFlags {
    fn are_states_set(&self, required: &[String]) -> bool {
        required.iter().all(|flag| self.0.contains(flag))
    }
}

/// Items held by the player.
#[derive(Resource, Default, Debug, Clone)]
pub struct Inventory(pub HashSet<String>);

impl InventoryService for Inventory {
    fn has_items(&self, required: &[String]) -> bool {
        required.iter().all(|item| self.0.contains(item))
    }
}

#[derive(Clone, Copy, Default)]
pub struct AccessGate<'a> {
    permissions: Option<&'a dyn PermissionService>,
    inventory: Option<&'a dyn InventoryService>,
}

impl<'a> AccessGate<'a> {
    pub fn new(
        permissions: Option<&'a dyn PermissionService>,
        inventory: Option<&'a dyn InventoryService>,
    ) -> Self {
        Self {
            permissions,
            inventory,
        }
    }

    pub fn from_resources(flags: Option<&'a StateFlags>, inventory: Option<&'a Inventory>) -> Self {
        Self::new(
            flags.map(|f| f as &dyn PermissionService),
            inventory.map(|i| i as &dyn InventoryService),
        )
    }

    /// An unreachable permission service fails closed. A missing inventory
    /// counts as holding everything.
    pub fn can_activate(&self, config: &DoorConfig) -> bool {
        if !config.is_gated() {
            return true;
        }

        let states = config.required_states.is_empty()
            || self
                .permissions
                .is_some_and(|p| p.are_states_set(&config.required_states));
        let items = config.required_items.is_empty()
            || self
                .inventory
                .map_or(true, |i| i.has_items(&config.required_items));

        states && items
    }
}
