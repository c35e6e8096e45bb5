pub mod components;
pub mod plugin;
pub mod sampling;
pub mod systems;

pub use components::RailNode;
pub use plugin::RailPlugin;
pub use sampling::{rail_from_nodes, RailPath};
