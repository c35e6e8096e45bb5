use bevy::prelude::*;

use crate::rail::components::RailNode;

/// An assembled rail: the ordered control points of a closed loop.
pub struct RailPath {
    pub control_points: Vec<Vec3>,
}

/// Collect the control points of the rail called `name` from the live node
/// entities. Returns `None` when fewer than two nodes carry that name.
pub fn rail_from_nodes<'a>(
    name: &str,
    nodes: impl Iterator<Item = (&'a RailNode, &'a Transform)>,
) -> Option<RailPath> {
    let mut points: Vec<(u32, Vec3)> = nodes
        .filter(|(node, _)| node.rail_name == name)
        .map(|(node, transform)| (node.ordering, transform.translation))
        .collect();

    if points.len() < 2 {
        return None;
    }

    points.sort_by_key(|(ordering, _)| *ordering);
    Some(RailPath {
        control_points: points.into_iter().map(|(_, position)| position).collect(),
    })
}

impl RailPath {
    /// Sample the closed loop at roughly `step_size` spacing.
    ///
    /// Each control-point segment is subdivided by its chord length, so the
    /// returned sequence is circular: the first sample logically follows the
    /// last one and no sample is duplicated at the seam.
    pub fn positions(&self, step_size: f32) -> Vec<Vec3> {
        assert!(step_size > 0.0, "rail step size must be positive");

        let n = self.control_points.len();
        let mut samples = Vec::new();
        for s in 0..n {
            let p0 = self.control_points[(s + n - 1) % n];
            let p1 = self.control_points[s];
            let p2 = self.control_points[(s + 1) % n];
            let p3 = self.control_points[(s + 2) % n];

            let chord = p1.distance(p2);
            let subdivisions = (chord / step_size).ceil().max(1.0) as usize;
            for k in 0..subdivisions {
                let t = k as f32 / subdivisions as f32;
                samples.push(catmull_rom(p0, p1, p2, p3, t));
            }
        }
        samples
    }
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
