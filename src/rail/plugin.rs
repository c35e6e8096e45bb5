use bevy::prelude::*;

use crate::rail::systems::spawn_demo_rail;

pub struct RailPlugin;

impl Plugin for RailPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_demo_rail);
    }
}
