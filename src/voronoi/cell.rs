//! Voronoi cell structure

use glam::IVec2;

use crate::geometry::{Polygon, Rect, Segment};

/// A single convex Voronoi cell on the grid
///
/// Each cell owns:
/// - the site it was grown from, whose index is also its id
/// - boundary edges as a closed walk; an edge shared with a neighbour has
///   exactly the same endpoints in both cells
/// - the polygon through the edge start points, used for containment
///
/// Cells tile the bounds of their index: every grid point of the bounds
/// belongs to exactly one cell.
#[derive(Debug, Clone)]
pub struct Cell {
    id: usize,
    site: IVec2,
    edges: Vec<Segment>,
    polygon: Polygon,
    bounds: Rect,
}

impl Cell {
    pub(super) fn new(id: usize, site: IVec2, edges: Vec<Segment>) -> Self {
        let polygon = Polygon::new(edges.iter().map(|e| e[0]).collect());
        let bounds = polygon.bounds();
        Self {
            id,
            site,
            edges,
            polygon,
            bounds,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn site(&self) -> IVec2 {
        self.site
    }

    /// Boundary edges in walk order
    #[inline]
    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    /// Corners of the cell in walk order
    #[inline]
    pub fn vertices(&self) -> &[IVec2] {
        self.polygon.points()
    }

    /// Rectangle holding every point of the cell
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether `p` belongs to this cell
    #[inline]
    pub fn contains(&self, p: IVec2) -> bool {
        self.bounds.contains(p) && self.polygon.contains(p)
    }

    /// Every grid point in the cell, row by row
    ///
    /// Points are produced on demand so large cells never need a
    /// materialised point list.
    pub fn points(&self) -> CellPoints<'_> {
        CellPoints {
            cell: self,
            next: self.bounds.min,
        }
    }
}

/// Iterator over the points of a [`Cell`], see [`Cell::points`]
#[derive(Debug, Clone)]
pub struct CellPoints<'a> {
    cell: &'a Cell,
    next: IVec2,
}

impl Iterator for CellPoints<'_> {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        let Rect { min, max } = self.cell.bounds;
        while self.next.y < max.y {
            while self.next.x < max.x {
                let p = self.next;
                self.next.x += 1;
                if self.cell.polygon.contains(p) {
                    return Some(p);
                }
            }
            self.next.x = min.x;
            self.next.y += 1;
        }
        None
    }
}
