use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::rail::components::RailNode;
use crate::river::components::{River, RIVER_DEFS_PATH};

/// Generic edit notification: something changed the given entity. Consumers
/// decide relevance from the components the entity carries.
#[derive(Event)]
pub struct EntityUpdated {
    pub entity: Entity,
}

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EntityUpdated>()
            .add_systems(Update, rail_editor_ui);
    }
}

pub fn rail_editor_ui(
    mut contexts: EguiContexts,
    mut nodes: Query<(Entity, &RailNode, &mut Transform)>,
    rivers: Query<&River>,
    mut updated: EventWriter<EntityUpdated>,
) {
    egui::Window::new("Rail Editor")
        .default_width(300.0)
        .show(contexts.ctx_mut().unwrap(), |ui| {
            ui.heading("Control Points");

            let mut sorted: Vec<_> = nodes.iter_mut().collect();
            sorted.sort_by_key(|(_, node, _)| node.ordering);

            for (entity, node, mut transform) in sorted {
                ui.label(format!("{} #{}", node.rail_name, node.ordering));

                let mut changed = false;
                changed |= ui
                    .add(egui::Slider::new(&mut transform.translation.x, -80.0..=80.0).text("X"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut transform.translation.z, -80.0..=80.0).text("Z"))
                    .changed();

                if changed {
                    updated.write(EntityUpdated { entity });
                }
            }

            ui.separator();
            if ui.button("Export Rivers").clicked() {
                export_rivers(&rivers);
            }
        });
}

fn export_rivers(rivers: &Query<&River>) {
    let defs: Vec<_> = rivers.iter().map(River::to_def).collect();
    match serde_json::to_string_pretty(&defs) {
        Ok(json) => {
            if let Err(err) = std::fs::write(RIVER_DEFS_PATH, json) {
                warn!("Failed to write {RIVER_DEFS_PATH}: {err}");
            } else {
                info!("Exported {} river(s) to {RIVER_DEFS_PATH}", defs.len());
            }
        }
        Err(err) => warn!("Failed to serialize river definitions: {err}"),
    }
}
