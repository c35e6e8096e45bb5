use bevy::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::rail::components::RailNode;

pub const DEMO_RAIL_NAME: &str = "main_river";

const DEMO_NODE_COUNT: u32 = 12;
const DEMO_BASE_RADIUS: f32 = 40.0;
const DEMO_RADIUS_WOBBLE: f32 = 12.0;

/// Spawns the authored control points of the demo rail: a closed loop with a
/// Perlin-perturbed radius so the river meanders instead of being a circle.
pub fn spawn_demo_rail(mut commands: Commands) {
    let perlin = Perlin::new(7);

    for k in 0..DEMO_NODE_COUNT {
        let angle = k as f32 / DEMO_NODE_COUNT as f32 * std::f32::consts::TAU;
        let wobble = perlin.get([angle.cos() as f64 * 1.7, angle.sin() as f64 * 1.7]) as f32;
        let radius = DEMO_BASE_RADIUS + wobble * DEMO_RADIUS_WOBBLE;

        commands.spawn((
            RailNode {
                rail_name: DEMO_RAIL_NAME.to_string(),
                ordering: k,
            },
            Transform::from_xyz(radius * angle.cos(), 0.0, radius * angle.sin()),
            Name::new(format!("RailNode_{}_{}", DEMO_RAIL_NAME, k)),
        ));
    }

    info!("Spawned demo rail '{}' with {} nodes", DEMO_RAIL_NAME, DEMO_NODE_COUNT);
}
