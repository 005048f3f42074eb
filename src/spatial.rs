//! Spatial indexing for merging near-coincident coordinates

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over a fixed set of 2D coordinates
///
/// Built once per Voronoi construction so the repair pass can find every
/// vertex within a small epsilon of another in O(log n) rather than comparing
/// all pairs.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Radius query: O(log n + k) for k results
pub struct CoordIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
}

impl CoordIndex {
    /// Build an index over `coords`
    ///
    /// Items returned by queries are positions in `coords`. Callers are
    /// expected to pass unique coordinates; an empty slice yields an index
    /// that never matches.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_city::CoordIndex;
    /// use glam::DVec2;
    ///
    /// let coords = vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
    /// let index = CoordIndex::new(&coords);
    /// assert_eq!(index.within(DVec2::new(0.0, 1e-9), 1e-6), vec![0]);
    /// ```
    pub fn new(coords: &[DVec2]) -> Self {
        if coords.is_empty() {
            return Self { tree: None };
        }

        let points: Vec<[f64; 2]> = coords.iter().map(|c| [c.x, c.y]).collect();
        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&points)),
        }
    }

    /// Indices of every coordinate within `radius` of `position`
    ///
    /// The result includes `position` itself if it was indexed and is sorted
    /// by index so merge decisions do not depend on tree layout.
    pub fn within(&self, position: DVec2, radius: f64) -> Vec<usize> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };

        let query = [position.x, position.y];
        let mut found: Vec<usize> = tree
            .within::<SquaredEuclidean>(&query, radius * radius)
            .into_iter()
            .map(|n| n.item)
            .collect();
        found.sort_unstable();
        found
    }
}
