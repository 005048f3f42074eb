//! Half-plane Voronoi construction and vertex repair
//!
//! Each cell is the bounding rectangle clipped by the bisector half-plane
//! of every other site. Neighbouring cells compute their shared vertices
//! independently, so floating point drift leaves them a hair apart; the
//! repair pass snaps every cluster of near-coincident vertices to a single
//! representative so shared edges compare exactly.

use std::collections::{HashMap, HashSet};

use glam::{DVec2, IVec2};

use crate::geometry::{Rect, Segment};
use crate::spatial::CoordIndex;

/// Edges of one cell as a closed walk, in floating point
pub(super) type RawCell = Vec<[DVec2; 2]>;

/// Vertices closer than this are the same vertex
pub(super) const REPAIR_EPSILON: f64 = 1e-8;

/// Bit pattern of a coordinate, usable as a map key
///
/// Adding zero folds `-0.0` into `0.0` so both hash alike.
fn key(c: DVec2) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Clip a convex polygon to the half-plane `normal · p <= max`
fn clip(polygon: &[DVec2], normal: DVec2, max: f64) -> Vec<DVec2> {
    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 1);

    for i in 0..n {
        let cur = polygon[i];
        let prev = polygon[(i + n - 1) % n];
        let cur_in = normal.dot(cur) <= max;
        let prev_in = normal.dot(prev) <= max;

        if cur_in != prev_in {
            let d = cur - prev;
            let t = (max - normal.dot(prev)) / normal.dot(d);
            out.push(prev + d * t);
        }
        if cur_in {
            out.push(cur);
        }
    }

    out
}

/// Compute one raw cell per site
///
/// Sites are expected to be unique; a site never constrains itself.
pub(super) fn raw_cells(bounds: Rect, sites: &[DVec2]) -> Vec<RawCell> {
    let frame = [
        bounds.min.as_dvec2(),
        DVec2::new(bounds.max.x as f64, bounds.min.y as f64),
        bounds.max.as_dvec2(),
        DVec2::new(bounds.min.x as f64, bounds.max.y as f64),
    ];

    sites
        .iter()
        .enumerate()
        .map(|(i, &site)| {
            let mut polygon = frame.to_vec();
            for (j, &other) in sites.iter().enumerate() {
                if i == j || polygon.is_empty() {
                    continue;
                }
                let normal = (other - site).normalize();
                let mid = (site + other) * 0.5;
                polygon = clip(&polygon, normal, normal.dot(mid));
            }

            let n = polygon.len();
            (0..n).map(|k| [polygon[k], polygon[(k + 1) % n]]).collect()
        })
        .collect()
}

/// Merge coordinates within `epsilon` of each other across all cells, drop
/// edges that collapse and re-thread each cell into a single closed walk
pub(super) fn repair(cells: &mut [RawCell], epsilon: f64) {
    let mut seen = HashSet::new();
    let mut coords = Vec::new();
    for edge in cells.iter().flatten() {
        for &c in edge {
            if seen.insert(key(c)) {
                coords.push(c);
            }
        }
    }

    let index = CoordIndex::new(&coords);
    let mut representative: Vec<Option<usize>> = vec![None; coords.len()];
    for i in 0..coords.len() {
        if representative[i].is_some() {
            continue;
        }
        representative[i] = Some(i);
        for j in index.within(coords[i], epsilon) {
            if representative[j].is_none() {
                representative[j] = Some(i);
            }
        }
    }

    let mapping: HashMap<(u64, u64), DVec2> = coords
        .iter()
        .zip(&representative)
        .map(|(&c, r)| (key(c), coords[r.unwrap_or_default()]))
        .collect();
    let snap = |c: DVec2| mapping.get(&key(c)).copied().unwrap_or(c);

    for cell in cells.iter_mut() {
        let edges: Vec<[DVec2; 2]> = cell
            .iter()
            .map(|e| [snap(e[0]), snap(e[1])])
            .filter(|e| key(e[0]) != key(e[1]))
            .collect();
        *cell = rethread(edges);
    }
}

/// Order edges so each one starts where the previous one ended
///
/// If the walk breaks (which a convex cell never should) the remaining
/// edges are appended in their original order.
fn rethread(edges: Vec<[DVec2; 2]>) -> Vec<[DVec2; 2]> {
    if edges.len() < 2 {
        return edges;
    }

    let starts: HashMap<(u64, u64), usize> = edges
        .iter()
        .enumerate()
        .map(|(i, e)| (key(e[0]), i))
        .collect();

    let mut used = vec![false; edges.len()];
    let mut order = Vec::with_capacity(edges.len());
    let mut current = 0;
    loop {
        used[current] = true;
        order.push(edges[current]);
        match starts.get(&key(edges[current][1])) {
            Some(&next) if !used[next] => current = next,
            _ => break,
        }
    }

    if order.len() < edges.len() {
        order.extend(
            edges
                .iter()
                .zip(&used)
                .filter(|(_, &u)| !u)
                .map(|(e, _)| *e),
        );
    }
    order
}

/// Snap a repaired cell to the grid, dropping edges that round away
pub(super) fn to_grid(cell: &RawCell) -> Vec<Segment> {
    let round = |c: DVec2| IVec2::new(c.x.round() as i32, c.y.round() as i32);
    cell.iter()
        .map(|e| [round(e[0]), round(e[1])])
        .filter(|e| e[0] != e[1])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(IVec2::ZERO, IVec2::new(100, 100))
    }

    #[test]
    fn test_single_site_is_whole_frame() {
        let cells = raw_cells(bounds(), &[DVec2::new(30.0, 40.0)]);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].len(), 4);
    }

    #[test]
    fn test_two_sites_split_on_bisector() {
        let sites = [DVec2::new(25.0, 50.0), DVec2::new(75.0, 50.0)];
        let cells = raw_cells(bounds(), &sites);
        for e in &cells[0] {
            assert!(e[0].x <= 50.0 + 1e-9 && e[1].x <= 50.0 + 1e-9);
        }
        for e in &cells[1] {
            assert!(e[0].x >= 50.0 - 1e-9 && e[1].x >= 50.0 - 1e-9);
        }
    }

    #[test]
    fn test_repair_merges_drift() {
        let a = DVec2::new(10.0, 10.0);
        let drift = DVec2::new(10.0 + 1e-12, 10.0);
        let b = DVec2::new(20.0, 10.0);
        let c = DVec2::new(10.0, 20.0);
        let mut cells = vec![vec![[a, b], [b, c], [c, a]], vec![[b, drift], [drift, c], [c, b]]];

        repair(&mut cells, REPAIR_EPSILON);

        let first: HashSet<_> = cells[0].iter().flatten().map(|&c| key(c)).collect();
        let second: HashSet<_> = cells[1].iter().flatten().map(|&c| key(c)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_repair_drops_collapsed_edges_and_keeps_walk() {
        let a = DVec2::new(0.0, 0.0);
        let a2 = DVec2::new(1e-11, 0.0);
        let b = DVec2::new(10.0, 0.0);
        let c = DVec2::new(10.0, 10.0);
        let mut cells = vec![vec![[a, a2], [a2, b], [b, c], [c, a]]];

        repair(&mut cells, REPAIR_EPSILON);

        let cell = &cells[0];
        assert_eq!(cell.len(), 3);
        for w in 0..cell.len() {
            let next = cell[(w + 1) % cell.len()];
            assert_eq!(key(cell[w][1]), key(next[0]));
        }
    }

    #[test]
    fn test_to_grid_drops_zero_length() {
        let cell = vec![
            [DVec2::new(0.0, 0.0), DVec2::new(0.3, 0.2)],
            [DVec2::new(0.3, 0.2), DVec2::new(10.0, 0.0)],
            [DVec2::new(10.0, 0.0), DVec2::new(0.0, 0.0)],
        ];
        let grid = to_grid(&cell);
        assert_eq!(grid.len(), 2);
    }
}
