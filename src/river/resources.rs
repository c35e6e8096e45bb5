use bevy::prelude::*;

/// One cross-sectional contour of the bank profile. Vertices drawn from it
/// land somewhere in `side_min..=side_max` along the track's side normal and
/// `up_min..=up_max` along `Vec3::Y`.
#[derive(Clone, Copy, Debug)]
pub struct BankContour {
    pub side_min: f32,
    pub side_max: f32,
    pub up_min: f32,
    pub up_max: f32,
}

impl BankContour {
    pub const fn new(side_min: f32, side_max: f32, up_min: f32, up_max: f32) -> Self {
        Self { side_min, side_max, up_min, up_max }
    }
}

#[derive(Resource, Clone)]
pub struct RiverConfig {
    /// Spacing between consecutive rail samples, in world units.
    pub spline_step_size: f32,
    /// Bank profile, ordered across the cross section. Contours `river_index`
    /// and `river_index + 1` are the two edges of the river channel.
    pub banks: Vec<BankContour>,
    pub river_index: usize,
    /// Vertical offset applied to every rail sample before banks are built.
    pub track_height: f32,
    /// How many times the river texture repeats along the whole loop.
    pub texture_tile_count: f32,
    /// Texture behind the river surface material.
    pub river_texture: String,
}

impl RiverConfig {
    pub fn num_contours(&self) -> usize {
        self.banks.len()
    }
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            spline_step_size: 2.0,
            // Eight contours, ordered from the far left bank across the
            // channel to the far right bank (side offsets decreasing).
            banks: vec![
                BankContour::new(16.0, 18.0, 1.5, 2.5),
                BankContour::new(10.0, 12.0, 0.8, 1.5),
                BankContour::new(6.0, 7.0, 0.3, 0.8),
                BankContour::new(2.5, 3.5, 0.0, 0.1),
                BankContour::new(-3.5, -2.5, 0.0, 0.1),
                BankContour::new(-7.0, -6.0, 0.3, 0.8),
                BankContour::new(-12.0, -10.0, 0.8, 1.5),
                BankContour::new(-18.0, -16.0, 1.5, 2.5),
            ],
            river_index: 3,
            track_height: 0.2,
            texture_tile_count: 16.0,
            river_texture: "textures/river.png".to_string(),
        }
    }
}

/// Shared material handles, resolved once at startup.
#[derive(Resource)]
pub struct RiverMaterials {
    pub river_material: Handle<StandardMaterial>,
    pub bank_material: Handle<StandardMaterial>,
}
