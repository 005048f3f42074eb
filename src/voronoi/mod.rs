//! Voronoi spatial index over an integer grid
//!
//! This module carves a rectangle into convex cells, one per site:
//! 1. Half-plane clipping of the frame against every bisector
//! 2. Vertex repair so neighbouring cells share exact coordinates
//! 3. Rounding to the grid
//!
//! Sites are usually collected with a [`SiteBuilder`], which applies
//! placement filters before handing the sites to [`VoronoiIndex::build`].

mod builder;
mod cell;
mod circuit;
mod repair;

pub use builder::{CandidateFilter, SiteBuilder, SiteFilter};
pub use cell::{Cell, CellPoints};
pub use circuit::circuit;

use std::collections::HashMap;

use glam::{DVec2, IVec2};

use crate::error::{CityError, Result};
use crate::geometry::{EdgeKey, Rect, Segment};

/// A cell sharing at least one edge with another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbour {
    /// Id of the neighbouring cell
    pub id: usize,
    /// Shared edges, as stored on the queried cell
    pub edges: Vec<Segment>,
}

/// Voronoi cells covering a rectangle
///
/// Cell ids are the indices of the sites the index was built from.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::{Rect, VoronoiIndex};
/// use glam::IVec2;
///
/// let bounds = Rect::new(IVec2::ZERO, IVec2::new(100, 100));
/// let index = VoronoiIndex::build(bounds, &[IVec2::new(25, 50), IVec2::new(75, 50)]).unwrap();
///
/// assert_eq!(index.site_for(IVec2::new(10, 10)), 0);
/// assert_eq!(index.site_for(IVec2::new(90, 10)), 1);
/// assert_eq!(index.neighbours(0)[0].id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct VoronoiIndex {
    bounds: Rect,
    cells: Vec<Cell>,
    /// Cells owning each edge, for neighbour lookups
    edge_owners: HashMap<EdgeKey, Vec<usize>>,
}

impl VoronoiIndex {
    /// Compute the cells of `sites` within `bounds`
    ///
    /// Sites must be unique and inside `bounds`.
    ///
    /// # Errors
    ///
    /// Returns `NoSites` if `sites` is empty
    pub fn build(bounds: Rect, sites: &[IVec2]) -> Result<Self> {
        if sites.is_empty() {
            return Err(CityError::NoSites);
        }

        let points: Vec<DVec2> = sites.iter().map(|s| s.as_dvec2()).collect();
        let mut raw = repair::raw_cells(bounds, &points);
        repair::repair(&mut raw, repair::REPAIR_EPSILON);

        let cells: Vec<Cell> = raw
            .iter()
            .zip(sites)
            .enumerate()
            .map(|(id, (cell, &site))| Cell::new(id, site, repair::to_grid(cell)))
            .collect();

        let mut edge_owners: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for cell in &cells {
            for edge in cell.edges() {
                let owners = edge_owners.entry(EdgeKey::from(edge)).or_default();
                if !owners.contains(&cell.id()) {
                    owners.push(cell.id());
                }
            }
        }

        tracing::debug!(
            cells = cells.len(),
            edges = edge_owners.len(),
            "built voronoi index"
        );

        Ok(Self {
            bounds,
            cells,
            edge_owners,
        })
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Cell that must exist
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` for an unknown id
    pub fn require(&self, id: usize) -> Result<&Cell> {
        self.cell(id).ok_or(CityError::CellNotFound(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Id of the site nearest to `p`
    ///
    /// A site at exactly `p` wins immediately; otherwise ties go to the
    /// lowest id.
    pub fn site_for(&self, p: IVec2) -> usize {
        let mut best = 0;
        let mut best_dist = i64::MAX;
        for cell in &self.cells {
            let d = (cell.site() - p).as_i64vec2().length_squared();
            if d == 0 {
                return cell.id();
            }
            if d < best_dist {
                best = cell.id();
                best_dist = d;
            }
        }
        best
    }

    /// Cells sharing an edge with `id`, in id order
    ///
    /// Unknown ids have no neighbours.
    pub fn neighbours(&self, id: usize) -> Vec<Neighbour> {
        let Some(cell) = self.cell(id) else {
            return Vec::new();
        };

        let mut found: Vec<Neighbour> = Vec::new();
        for edge in cell.edges() {
            let Some(owners) = self.edge_owners.get(&EdgeKey::from(edge)) else {
                continue;
            };
            for &other in owners.iter().filter(|&&o| o != id) {
                match found.iter_mut().find(|n| n.id == other) {
                    Some(n) => n.edges.push(*edge),
                    None => found.push(Neighbour {
                        id: other,
                        edges: vec![*edge],
                    }),
                }
            }
        }

        found.sort_by_key(|n| n.id);
        found
    }
}
