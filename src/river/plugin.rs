use bevy::prelude::*;

use crate::rail::systems::spawn_demo_rail;
use crate::river::resources::RiverConfig;
use crate::river::systems::{regenerate_rivers_on_rail_edit, setup_river_materials, spawn_rivers};

pub struct RiverPlugin;

impl Plugin for RiverPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RiverConfig>()
            .add_systems(
                Startup,
                (setup_river_materials, spawn_rivers)
                    .chain()
                    .after(spawn_demo_rail),
            )
            .add_systems(Update, regenerate_rivers_on_rail_edit);
    }
}
