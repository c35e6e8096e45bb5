pub mod components;
pub mod mesh_generation;
pub mod plugin;
pub mod resources;
pub mod systems;

pub use components::{River, RiverDef};
pub use plugin::RiverPlugin;
pub use resources::{BankContour, RiverConfig};
