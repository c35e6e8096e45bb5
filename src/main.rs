mod editor;
mod rail;
mod river;

use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use editor::EditorPlugin;
use rail::RailPlugin;
use river::RiverPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(EguiPlugin { enable_multipass_for_primary_context: true, ..Default::default() })
        .add_plugins(WorldInspectorPlugin::new())
        .add_plugins(RailPlugin)
        .add_plugins(RiverPlugin)
        .add_plugins(EditorPlugin)
        .add_systems(Startup, setup_scene)
        .run();
}

fn setup_scene(mut commands: Commands) {
    // Spawn directional light
    let light_pos = Vec3::new(0.0, 50.0, 0.0);
    commands.spawn((
        DirectionalLight {
            color: Color::WHITE,
            illuminance: 15000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(light_pos).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    // Overview camera looking down at the river loop
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 90.0, 110.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
