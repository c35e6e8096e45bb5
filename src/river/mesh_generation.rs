use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::river::resources::RiverConfig;

const INDICES_PER_QUAD: usize = 6;

/// How far a backtracking vertex is nudged ahead of its predecessor, as a
/// fraction of the local track delta.
const FORWARD_NUDGE: f32 = 1.0e-6;

/// Indexed triangle buffers with the shared river/bank vertex layout.
/// Normals and tangents are attached when the buffers become a `Mesh`.
#[derive(Clone, PartialEq, Debug)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u16>,
}

impl MeshBuffers {
    fn with_capacity(verts: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(verts),
            uvs: Vec::with_capacity(verts),
            indices: Vec::with_capacity(indices),
        }
    }

    fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs);
        mesh.insert_indices(Indices::U16(self.indices));
        mesh
    }

    /// River surface: a flat strip, so it gets a fixed up normal and tangent.
    pub fn into_river_mesh(self) -> Mesh {
        let vert_count = self.positions.len();
        let mut mesh = self.into_mesh();
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 1.0, 0.0]; vert_count]);
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_TANGENT,
            vec![[1.0, 0.0, 0.0, 1.0]; vert_count],
        );
        mesh
    }

    /// Bank terrain: smooth normals and tangents are derived from the final
    /// vertex and index data.
    pub fn into_bank_mesh(self) -> Mesh {
        let mut mesh = self.into_mesh();
        mesh.compute_smooth_normals();
        if let Err(err) = mesh.generate_tangents() {
            warn!("Failed to generate bank tangents: {err}");
        }
        mesh
    }
}

/// The two meshes produced by one regeneration.
pub struct RiverGeometry {
    pub river: MeshBuffers,
    pub bank: MeshBuffers,
}

/// Builds the river strip and the bank strip for a closed-loop `track`.
///
/// The track is circular: sample 0 follows the last sample. Each sample
/// contributes one row of `banks.len()` bank vertices with randomized
/// lateral/vertical offsets, and the two contours flanking the river channel
/// are copied into the river strip with fresh texture coordinates. Rows are
/// stitched into quads row-to-row; the seam between the last and first sample
/// shares positions but gets no indices.
///
/// Deterministic: the jitter comes from a generator seeded with `seed` on
/// entry, so the same track and seed reproduce the geometry exactly.
pub fn generate_river_geometry(track: &[Vec3], config: &RiverConfig, seed: u64) -> RiverGeometry {
    let num_contours = config.num_contours();
    let river_idx = config.river_index;
    let segment_count = track.len();

    assert!(segment_count >= 2, "river rail must yield at least two samples");
    assert!(
        num_contours >= 2 && river_idx < num_contours - 1,
        "river config needs >= 2 bank contours with river_index strictly inside them"
    );

    let num_bank_quads = num_contours - 2;
    let river_vert_max = segment_count * 2;
    let river_index_max = (segment_count - 1) * INDICES_PER_QUAD;
    let bank_vert_max = segment_count * num_contours;
    let bank_index_max = (segment_count - 1) * INDICES_PER_QUAD * num_bank_quads;
    assert!(
        bank_vert_max <= u16::MAX as usize + 1,
        "bank vertex count {bank_vert_max} overflows 16-bit indices"
    );

    let mut river = MeshBuffers::with_capacity(river_vert_max, river_index_max);
    let mut bank = MeshBuffers::with_capacity(bank_vert_max, bank_index_max);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut offsets = vec![Vec2::ZERO; num_contours];

    for i in 0..segment_count {
        // The track is a closed loop.
        let prev_i = if i == 0 { segment_count - 1 } else { i - 1 };

        let track_delta = track[i] - track[prev_i];
        let track_normal = track_delta.cross(Vec3::Y).normalize();
        let track_position = track[i] + config.track_height * Vec3::Y;

        // The river texture is tiled several times along the course of the
        // river, so V runs 0..tile_count around the loop and wraps at the seam.
        let texture_v = config.texture_tile_count * i as f32 / segment_count as f32;

        // Draw the (side, up) offsets of this row. side is the distance along
        // `track_normal`, up the distance along Y, both relative to
        // `track_position`.
        for (j, contour) in config.banks.iter().enumerate() {
            offsets[j] = Vec2::new(
                contour.side_min.lerp(contour.side_max, rng.random::<f32>()),
                contour.up_min.lerp(contour.up_max, rng.random::<f32>()),
            );
        }

        // Create the bank vertices for this row.
        for j in 0..num_contours {
            let off = offsets[j];
            let vertex = track_position + off.x * track_normal + off.y * Vec3::Y;

            // The texture is stretched from the side of the river to the far
            // end of the bank. There are two banks, separated by the river, so
            // U is normalized against this vertex's own bank width.
            let left_bank = j <= river_idx;
            let bank_start = if left_bank { 0 } else { river_idx + 1 };
            let bank_end = if left_bank { river_idx } else { num_contours - 1 };
            let bank_width = offsets[bank_start].x - offsets[bank_end].x;
            assert!(
                bank_width.abs() > f32::EPSILON,
                "degenerate bank width: contours {bank_start} and {bank_end} coincide"
            );
            let texture_u = (off.x - offsets[bank_end].x) / bank_width;

            bank.positions.push(vertex);
            bank.uvs.push(Vec2::new(texture_u, texture_v));
        }

        // Ensure vertices don't go behind the previous row on the inside of a
        // tight corner, which would fold the strip over itself.
        if i > 0 {
            let row = i * num_contours;
            let prev_row = row - num_contours;
            for j in 0..num_contours {
                let vert_delta = bank.positions[row + j] - bank.positions[prev_row + j];
                if vert_delta.dot(track_delta) <= 0.0 {
                    bank.positions[row + j] =
                        bank.positions[prev_row + j] + FORWARD_NUDGE * track_delta;
                }
            }
        }

        // Force the beginning and end rows to line up in their geometry.
        if i == segment_count - 1 {
            let row = i * num_contours;
            for j in 0..num_contours {
                bank.positions[row + j] = bank.positions[j];
            }
        }

        // The river reuses the two channel-edge vertices of this row, with
        // river texture coordinates instead of bank ones.
        let river_vert = i * num_contours + river_idx;
        river.positions.push(bank.positions[river_vert]);
        river.uvs.push(Vec2::new(0.0, texture_v));
        river.positions.push(bank.positions[river_vert + 1]);
        river.uvs.push(Vec2::new(1.0, texture_v));
    }

    // Not counting the first row, stitch each consecutive row pair into quads.
    for i in 0..segment_count - 1 {
        // River only has one quad per row pair.
        push_quad(&mut river.indices, 2 * i, 0, 2);

        // Case when num_contours = 8 and river_idx = 3:
        //
        //  0___1___2___3   4___5___6___7
        //  | _/| _/| _/|   | _/| _/| _/|
        //  |/__|/__|/__|   |/__|/__|/__|
        //  8   9  10  11  12  13  14  15
        for j in 0..=num_bank_quads {
            // Do not create bank geo for the river channel.
            if j == river_idx {
                continue;
            }
            push_quad(&mut bank.indices, i * num_contours, j, num_contours + j);
        }
    }

    // Make sure we used as much data as expected, and no more.
    assert_eq!(river.positions.len(), river_vert_max);
    assert_eq!(river.indices.len(), river_index_max);
    assert_eq!(bank.positions.len(), bank_vert_max);
    assert_eq!(bank.indices.len(), bank_index_max);

    RiverGeometry { river, bank }
}

/// Two triangles with a fixed diagonal: `(base+off1, base+off1+1, base+off2)`
/// and `(base+off2, base+off1+1, base+off2+1)`.
fn push_quad(indices: &mut Vec<u16>, base: usize, off1: usize, off2: usize) {
    let base = base as u16;
    let off1 = off1 as u16;
    let off2 = off2 as u16;
    indices.extend_from_slice(&[
        base + off1,
        base + off1 + 1,
        base + off2,
        base + off2,
        base + off1 + 1,
        base + off2 + 1,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_track() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(60.0, 0.0, 0.0),
            Vec3::new(60.0, 0.0, 60.0),
            Vec3::new(0.0, 0.0, 60.0),
        ]
    }

    fn rectangle_track(samples_per_side: usize) -> Vec<Vec3> {
        let mut track = Vec::new();
        for k in 0..samples_per_side {
            track.push(Vec3::new(k as f32 * 60.0 / samples_per_side as f32, 0.0, 0.0));
        }
        for k in 0..samples_per_side {
            track.push(Vec3::new(60.0, 0.0, k as f32 * 60.0 / samples_per_side as f32));
        }
        for k in 0..samples_per_side {
            track.push(Vec3::new(60.0 - k as f32 * 60.0 / samples_per_side as f32, 0.0, 60.0));
        }
        for k in 0..samples_per_side {
            track.push(Vec3::new(0.0, 0.0, 60.0 - k as f32 * 60.0 / samples_per_side as f32));
        }
        track
    }

    fn test_config() -> RiverConfig {
        RiverConfig::default()
    }

    #[test]
    fn test_buffer_sizes_match_analytic_counts() {
        let config = test_config();
        let num_contours = config.num_contours();
        for samples_per_side in [1, 2, 5] {
            let track = rectangle_track(samples_per_side);
            let s = track.len();
            let geometry = generate_river_geometry(&track, &config, 11);

            assert_eq!(geometry.river.positions.len(), 2 * s);
            assert_eq!(geometry.river.uvs.len(), 2 * s);
            assert_eq!(geometry.river.indices.len(), 6 * (s - 1));
            assert_eq!(geometry.bank.positions.len(), s * num_contours);
            assert_eq!(geometry.bank.uvs.len(), s * num_contours);
            assert_eq!(geometry.bank.indices.len(), 6 * (s - 1) * (num_contours - 2));
        }
    }

    #[test]
    fn test_scenario_8_contours_river_index_3_segment_count_4() {
        let track = square_track();
        let config = test_config();
        assert_eq!(config.num_contours(), 8);
        assert_eq!(config.river_index, 3);

        let geometry = generate_river_geometry(&track, &config, 5);
        assert_eq!(geometry.river.indices.len(), 18);
        // Six quads per row pair (seven contour pairs minus the channel),
        // three stitched row pairs.
        assert_eq!(geometry.bank.indices.len(), 108);

        // No bank quad may straddle the river channel (contour pair 3).
        for quad in geometry.bank.indices.chunks(6) {
            let contour = quad[0] as usize % config.num_contours();
            assert_ne!(contour, 3, "bank quad generated inside the river channel");
        }
    }

    #[test]
    fn test_loop_closure_is_watertight() {
        let track = rectangle_track(3);
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 21);

        let num_contours = config.num_contours();
        let last_row = (track.len() - 1) * num_contours;
        for j in 0..num_contours {
            assert_eq!(
                geometry.bank.positions[last_row + j],
                geometry.bank.positions[j],
                "contour {j} does not close the loop"
            );
        }
    }

    #[test]
    fn test_no_vertex_backtracks_along_the_track() {
        // Small radius and generous jitter so raw rows would backtrack on the
        // inside of corners without the correction.
        let track: Vec<Vec3> = (0..16)
            .map(|k| {
                let angle = k as f32 / 16.0 * std::f32::consts::TAU;
                Vec3::new(8.0 * angle.cos(), 0.0, 8.0 * angle.sin())
            })
            .collect();
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 3);

        let num_contours = config.num_contours();
        // The final row is pinned to row 0 by loop closure, so the forward
        // progress guarantee covers the interior rows.
        for i in 1..track.len() - 1 {
            let delta = track[i] - track[i - 1];
            for j in 0..num_contours {
                let step = geometry.bank.positions[i * num_contours + j]
                    - geometry.bank.positions[(i - 1) * num_contours + j];
                assert!(
                    step.dot(delta) > 0.0,
                    "row {i} contour {j} backtracks along the track"
                );
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_geometry() {
        let track = rectangle_track(4);
        let config = test_config();
        let first = generate_river_geometry(&track, &config, 777);
        let second = generate_river_geometry(&track, &config, 777);

        assert_eq!(first.river, second.river);
        assert_eq!(first.bank, second.bank);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let track = rectangle_track(4);
        let config = test_config();
        let first = generate_river_geometry(&track, &config, 1);
        let second = generate_river_geometry(&track, &config, 2);

        assert_ne!(first.bank.positions, second.bank.positions);
    }

    #[test]
    fn test_river_shares_channel_edge_vertices_with_bank() {
        let track = rectangle_track(3);
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 13);

        let num_contours = config.num_contours();
        for i in 0..track.len() {
            let row = i * num_contours;
            assert_eq!(
                geometry.river.positions[2 * i],
                geometry.bank.positions[row + config.river_index]
            );
            assert_eq!(
                geometry.river.positions[2 * i + 1],
                geometry.bank.positions[row + config.river_index + 1]
            );
            assert_eq!(geometry.river.uvs[2 * i].x, 0.0);
            assert_eq!(geometry.river.uvs[2 * i + 1].x, 1.0);
        }
    }

    #[test]
    fn test_bank_texture_u_stays_normalized() {
        let track = rectangle_track(4);
        // Contour side ranges are disjoint and monotonically ordered, so every
        // drawn row is monotonic across each bank.
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 17);

        for uv in &geometry.bank.uvs {
            assert!(
                (-1.0e-6..=1.0 + 1.0e-6).contains(&uv.x),
                "bank U {} left the unit range",
                uv.x
            );
        }
    }

    #[test]
    fn test_texture_v_is_monotonic_over_the_loop() {
        let track = rectangle_track(3);
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 29);

        let mut last_v = -1.0;
        for i in 0..track.len() {
            let v = geometry.river.uvs[2 * i].y;
            assert!(v > last_v);
            last_v = v;
        }
        assert!(last_v < config.texture_tile_count);
    }

    #[test]
    #[should_panic(expected = "bank contours")]
    fn test_too_few_contours_is_fatal() {
        let mut config = test_config();
        config.banks.truncate(1);
        config.river_index = 0;
        generate_river_geometry(&square_track(), &config, 0);
    }

    #[test]
    #[should_panic(expected = "bank contours")]
    fn test_river_index_out_of_range_is_fatal() {
        let mut config = test_config();
        config.river_index = config.num_contours() - 1;
        generate_river_geometry(&square_track(), &config, 0);
    }

    #[test]
    #[should_panic(expected = "at least two samples")]
    fn test_single_sample_track_is_fatal() {
        let config = test_config();
        generate_river_geometry(&[Vec3::ZERO], &config, 0);
    }

    #[test]
    #[should_panic(expected = "degenerate bank width")]
    fn test_zero_bank_width_is_fatal() {
        let mut config = test_config();
        // Collapse the left bank onto a single lateral offset.
        for contour in &mut config.banks[..=config.river_index] {
            contour.side_min = 4.0;
            contour.side_max = 4.0;
        }
        generate_river_geometry(&square_track(), &config, 0);
    }

    #[test]
    fn test_river_mesh_carries_flat_normals_and_tangents() {
        let track = square_track();
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 41);

        let mesh = geometry.river.into_river_mesh();
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_TANGENT).is_some());
    }

    #[test]
    fn test_bank_mesh_computes_smooth_normals() {
        let track = rectangle_track(3);
        let config = test_config();
        let geometry = generate_river_geometry(&track, &config, 41);

        let mesh = geometry.bank.into_bank_mesh();
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }
}
