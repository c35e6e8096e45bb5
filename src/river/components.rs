use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Where river definitions are read from at startup and exported to from the
/// editor window.
pub const RIVER_DEFS_PATH: &str = "assets/rivers.json";

/// Per-river state. `bank` is the child entity holding the bank strip mesh;
/// it is allocated on the first generation and reused forever after.
#[derive(Component)]
pub struct River {
    pub rail_name: String,
    pub random_seed: u64,
    pub bank: Option<Entity>,
}

/// Serialized form of a river. `rail_name` is omitted when empty so an
/// exported-empty name re-imports as an empty name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RiverDef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rail_name: String,
    pub random_seed: u64,
}

impl River {
    pub fn from_def(def: &RiverDef) -> Self {
        Self {
            rail_name: def.rail_name.clone(),
            random_seed: def.random_seed,
            bank: None,
        }
    }

    pub fn to_def(&self) -> RiverDef {
        RiverDef {
            rail_name: self.rail_name.clone(),
            random_seed: self.random_seed,
        }
    }
}

/// Marker for the generated bank entity.
#[derive(Component)]
pub struct RiverBank;
