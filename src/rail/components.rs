use bevy::prelude::*;

/// One authored control point of a named rail. The node's world position
/// lives in its `Transform`, so moving the entity edits the rail.
#[derive(Component)]
pub struct RailNode {
    pub rail_name: String,
    pub ordering: u32,
}
