use anyhow::anyhow;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Seconds a full open or close transition takes.
pub const DEFAULT_TRANSITION_SECS: f32 = 1.5;

/// Principal axis the blocking volume grows along when the door opens.
#[repr(u8)]
#[derive(
    EnumIter,
    strum::Display,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
pub enum DoorAxis {
    X = 0,
    Y = 1,
    #[default]
    Z = 2,
}

impl DoorAxis {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn unit(self) -> Vec3 {
        match self {
            DoorAxis::X => Vec3::X,
            DoorAxis::Y => Vec3::Y,
            DoorAxis::Z => Vec3::Z,
        }
    }
}

/// Inclusive range of seconds, sampled uniformly.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DelayRange {
    pub min: f32,
    pub max: f32,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self { min: 3.0, max: 5.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DoorHints {
    pub locked: String,
    pub open: String,
    pub close: String,
}

impl Default for DoorHints {
    fn default() -> Self {
        Self {
            locked: "Locked".to_owned(),
            open: "Open".to_owned(),
            close: "Close".to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DoorConfig {
    pub axis: DoorAxis,
    /// Multiplier applied to the blocking volume along `axis` while open.
    pub open_scale: f32,
    /// Shift the open volume away from the approaching actor.
    pub apply_offset: bool,
    pub two_way: bool,
    pub auto_open: bool,
    pub auto_close: bool,
    pub auto_close_delay: DelayRange,
    pub start_open: bool,
    pub transition_secs: f32,
    pub required_states: Vec<String>,
    pub required_items: Vec<String>,
    pub hints: DoorHints,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            axis: DoorAxis::Z,
            open_scale: 1.0,
            apply_offset: true,
            two_way: false,
            auto_open: false,
            auto_close: false,
            auto_close_delay: DelayRange::default(),
            start_open: false,
            transition_secs: DEFAULT_TRANSITION_SECS,
            required_states: Vec::new(),
            required_items: Vec::new(),
            hints: DoorHints::default(),
        }
    }
}

impl DoorConfig {
    pub fn from_ron(s: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.open_scale.is_finite() || self.open_scale <= 0.0 {
            return Err(anyhow!("open scale must be positive, got {}", self.open_scale));
        }
        if !self.transition_secs.is_finite() || self.transition_secs <= 0.0 {
            return Err(anyhow!(
                "transition duration must be positive, got {}",
                self.transition_secs
            ));
        }

        let DelayRange { min, max } = self.auto_close_delay;
        if !min.is_finite() || !max.is_finite() || min < 0.0 {
            return Err(anyhow!("auto close delay must be non-negative"));
        }
        if min > max {
            return Err(anyhow!("auto close delay range is reversed ({min} > {max})"));
        }

        Ok(())
    }

    pub fn is_gated(&self) -> bool {
        !self.required_states.is_empty() || !self.required_items.is_empty()
    }
}
