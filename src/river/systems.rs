use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;

use crate::editor::EntityUpdated;
use crate::rail::components::RailNode;
use crate::rail::sampling::{rail_from_nodes, RailPath};
use crate::river::components::{River, RiverBank, RiverDef, RIVER_DEFS_PATH};
use crate::river::mesh_generation::generate_river_geometry;
use crate::river::resources::{RiverConfig, RiverMaterials};

/// The bank always uses this texture, regardless of river configuration.
const BANK_TEXTURE_PATH: &str = "textures/riverbank.png";

pub fn setup_river_materials(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<RiverConfig>,
) {
    let river_material = materials.add(StandardMaterial {
        base_color_texture: Some(asset_server.load(config.river_texture.clone())),
        perceptual_roughness: 0.25,
        reflectance: 0.6,
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });
    let bank_material = materials.add(StandardMaterial {
        base_color_texture: Some(asset_server.load(BANK_TEXTURE_PATH)),
        perceptual_roughness: 0.9,
        alpha_mode: AlphaMode::Opaque,
        ..default()
    });

    commands.insert_resource(RiverMaterials { river_material, bank_material });
}

/// Constructs every river from its serialized definition and generates its
/// meshes immediately. Definitions come from `assets/rivers.json` when the
/// file exists; otherwise a single default river on the demo rail is spawned.
pub fn spawn_rivers(
    mut commands: Commands,
    nodes: Query<(&RailNode, &Transform)>,
    config: Res<RiverConfig>,
    materials: Res<RiverMaterials>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for def in load_river_defs() {
        let mut river = River::from_def(&def);

        let Some(rail) = rail_from_nodes(&river.rail_name, nodes.iter()) else {
            warn!("River definition references unknown rail '{}'", river.rail_name);
            continue;
        };

        let entity = commands
            .spawn((
                Transform::IDENTITY,
                Visibility::default(),
                Name::new(format!("River_{}", river.rail_name)),
            ))
            .id();

        create_river_mesh(
            &mut commands,
            entity,
            &mut river,
            &rail,
            &config,
            &materials,
            &mut meshes,
        );
        commands.entity(entity).insert(river);
    }
}

/// Regenerates river meshes when a rail control point moves. Updates for
/// entities without rail-node data are ignored.
pub fn regenerate_rivers_on_rail_edit(
    mut commands: Commands,
    mut events: EventReader<EntityUpdated>,
    nodes: Query<(&RailNode, &Transform)>,
    mut rivers: Query<(Entity, &mut River)>,
    config: Res<RiverConfig>,
    materials: Res<RiverMaterials>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let mut rail_changed = false;
    for event in events.read() {
        if nodes.get(event.entity).is_ok() {
            rail_changed = true;
        }
    }
    if !rail_changed {
        return;
    }

    // TODO: only rebuild rivers whose rail actually changed. Rebuilding all of
    // them is correct but wasteful once many rivers exist.
    for (entity, mut river) in rivers.iter_mut() {
        let Some(rail) = rail_from_nodes(&river.rail_name, nodes.iter()) else {
            warn!("River on entity {entity} references unknown rail '{}'", river.rail_name);
            continue;
        };
        create_river_mesh(
            &mut commands,
            entity,
            &mut river,
            &rail,
            &config,
            &materials,
            &mut meshes,
        );
    }
}

/// Generates both meshes for one river and attaches them: the river strip on
/// the river entity itself, the bank strip on its (lazily created) child.
pub fn create_river_mesh(
    commands: &mut Commands,
    entity: Entity,
    river: &mut River,
    rail: &RailPath,
    config: &RiverConfig,
    materials: &RiverMaterials,
    meshes: &mut Assets<Mesh>,
) {
    let track = rail.positions(config.spline_step_size);
    let geometry = generate_river_geometry(&track, config, river.random_seed);

    let river_mesh = meshes.add(geometry.river.into_river_mesh());
    let bank_mesh = meshes.add(geometry.bank.into_bank_mesh());

    commands.entity(entity).insert((
        Mesh3d(river_mesh),
        MeshMaterial3d(materials.river_material.clone()),
        // Never cull the river.
        NoFrustumCulling,
    ));

    let bank = ensure_bank_entity(commands, entity, river);
    commands.entity(bank).insert((
        Mesh3d(bank_mesh),
        MeshMaterial3d(materials.bank_material.clone()),
        // Never cull the banking.
        NoFrustumCulling,
    ));
}

/// The bank entity is allocated once and reused on every regeneration. It is
/// a transform child of the river entity so it always moves with it.
fn ensure_bank_entity(commands: &mut Commands, river_entity: Entity, river: &mut River) -> Entity {
    if let Some(bank) = river.bank {
        return bank;
    }

    let bank = commands
        .spawn((
            RiverBank,
            Transform::IDENTITY,
            Visibility::default(),
            Name::new("RiverBank"),
        ))
        .id();
    commands.entity(river_entity).add_child(bank);
    river.bank = Some(bank);
    bank
}

fn load_river_defs() -> Vec<RiverDef> {
    let defs = match std::fs::read_to_string(RIVER_DEFS_PATH) {
        Ok(raw) => match serde_json::from_str::<Vec<RiverDef>>(&raw) {
            Ok(defs) => defs,
            Err(err) => {
                warn!("Failed to parse {RIVER_DEFS_PATH}: {err}");
                Vec::new()
            }
        },
        Err(_) => Vec::new(),
    };

    if defs.is_empty() {
        info!("No river definitions found, using the default demo river");
        vec![RiverDef {
            rail_name: crate::rail::systems::DEMO_RAIL_NAME.to_string(),
            random_seed: 42,
        }]
    } else {
        defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_entity_is_created_once_and_reused() {
        let mut world = World::new();
        let river_entity = world.spawn(Transform::IDENTITY).id();
        let mut river = River {
            rail_name: "test".into(),
            random_seed: 1,
            bank: None,
        };

        let first = {
            let mut commands = world.commands();
            ensure_bank_entity(&mut commands, river_entity, &mut river)
        };
        world.flush();

        let second = {
            let mut commands = world.commands();
            ensure_bank_entity(&mut commands, river_entity, &mut river)
        };
        world.flush();

        assert_eq!(first, second);
        assert_eq!(river.bank, Some(first));

        let mut banks = world.query::<&RiverBank>();
        assert_eq!(banks.iter(&world).count(), 1);
    }

    #[test]
    fn test_bank_entity_is_parented_to_the_river() {
        let mut world = World::new();
        let river_entity = world.spawn(Transform::IDENTITY).id();
        let mut river = River {
            rail_name: "test".into(),
            random_seed: 1,
            bank: None,
        };

        let bank = {
            let mut commands = world.commands();
            ensure_bank_entity(&mut commands, river_entity, &mut river)
        };
        world.flush();

        let child_of = world.entity(bank).get::<ChildOf>().expect("bank has no parent");
        assert_eq!(child_of.parent(), river_entity);
    }
}
