//! Perimeter extraction around a set of cells

use std::collections::{BTreeSet, HashSet};

use glam::IVec2;

use super::Cell;
use crate::geometry::{EdgeKey, Rect, Segment};

/// Segments forming the perimeter between `inside` and `outside` cells
///
/// Every edge of an inside cell starts as a candidate. An edge survives
/// only if it is also an edge of some outside cell (and both of its
/// vertices are outside-cell vertices), or if both endpoints sit within
/// one unit of the same side of `bounds`. Edges shared by two inside cells
/// are therefore deleted.
///
/// Each perimeter edge is returned once, in canonical endpoint order,
/// sorted. Callers must not rely on the order forming a walk. A cell
/// listed in both sets gives an unspecified result.
pub fn circuit(bounds: Rect, inside: &[&Cell], outside: &[&Cell]) -> Vec<Segment> {
    let mut outside_edges = HashSet::new();
    let mut outside_vertices = HashSet::new();
    for cell in outside {
        for edge in cell.edges() {
            outside_edges.insert(EdgeKey::from(edge));
            outside_vertices.insert((edge[0].x, edge[0].y));
            outside_vertices.insert((edge[1].x, edge[1].y));
        }
    }

    let is_outside_vertex = |p: IVec2| outside_vertices.contains(&(p.x, p.y));

    let candidates: BTreeSet<EdgeKey> = inside
        .iter()
        .flat_map(|cell| cell.edges().iter().map(EdgeKey::from))
        .collect();

    candidates
        .into_iter()
        .filter(|key| {
            let [a, b] = key.endpoints();
            let borders_outside =
                outside_edges.contains(key) && is_outside_vertex(a) && is_outside_vertex(b);
            borders_outside || on_same_frame_side(bounds, a, b)
        })
        .map(|key| key.endpoints())
        .collect()
}

/// Both points lie within one unit of the same side of `bounds`
///
/// The one unit of slack absorbs rounding of vertices computed on the frame.
fn on_same_frame_side(bounds: Rect, a: IVec2, b: IVec2) -> bool {
    let near = |v: i32, side: i32| (v - side).abs() <= 1;
    (near(a.x, bounds.min.x) && near(b.x, bounds.min.x))
        || (near(a.x, bounds.max.x) && near(b.x, bounds.max.x))
        || (near(a.y, bounds.min.y) && near(b.y, bounds.min.y))
        || (near(a.y, bounds.max.y) && near(b.y, bounds.max.y))
}
