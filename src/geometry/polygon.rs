//! Closed integer polygons and point containment

use glam::IVec2;

use super::Rect;

/// A closed polygon over grid points
///
/// The last point implicitly joins the first. Containment uses a crossing
/// test evaluated in exact integer arithmetic, with half-open rules on both
/// axes: a point on a shared edge belongs to exactly one of two polygons
/// that share that edge, so a set of polygons tiling a rectangle assigns
/// every grid point of `[min, max)` to exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<IVec2>,
}

impl Polygon {
    pub fn new(points: Vec<IVec2>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[IVec2] {
        &self.points
    }

    /// Polygons with fewer than three points enclose nothing
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 3
    }

    /// Smallest rectangle holding every point the polygon can contain
    ///
    /// Containment is half-open, so the right-most column and bottom-most
    /// row of vertices are never inside and the vertex extent doubles as
    /// an exclusive upper bound.
    pub fn bounds(&self) -> Rect {
        let Some(&first) = self.points.first() else {
            return Rect::default();
        };
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Rect { min, max }
    }

    /// Whether `p` lies inside the polygon
    pub fn contains(&self, p: IVec2) -> bool {
        if !self.is_closed() {
            return false;
        }

        let px = p.x as i64;
        let py = p.y as i64;
        let mut inside = false;
        let mut j = self.points.len() - 1;

        for i in 0..self.points.len() {
            let (xi, yi) = (self.points[i].x as i64, self.points[i].y as i64);
            let (xj, yj) = (self.points[j].x as i64, self.points[j].y as i64);

            if (yi > py) != (yj > py) {
                // px < xi + (py - yi) * (xj - xi) / (yj - yi), without dividing
                let dy = yj - yi;
                let lhs = (px - xi) * dy;
                let rhs = (py - yi) * (xj - xi);
                let crosses = if dy > 0 { lhs < rhs } else { lhs > rhs };
                if crosses {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: i32, max: i32) -> Polygon {
        Polygon::new(vec![
            IVec2::new(min, min),
            IVec2::new(max, min),
            IVec2::new(max, max),
            IVec2::new(min, max),
        ])
    }

    #[test]
    fn test_square_is_half_open() {
        let sq = square(0, 10);
        assert!(sq.contains(IVec2::new(0, 0)));
        assert!(sq.contains(IVec2::new(9, 9)));
        assert!(sq.contains(IVec2::new(5, 0)));
        assert!(!sq.contains(IVec2::new(10, 5)));
        assert!(!sq.contains(IVec2::new(5, 10)));
        assert!(!sq.contains(IVec2::new(-1, 5)));

        let count = sq.bounds().points().filter(|&p| sq.contains(p)).count();
        assert_eq!(count, 100);
    }

    #[test]
    fn test_open_polygon_contains_nothing() {
        let line = Polygon::new(vec![IVec2::ZERO, IVec2::new(10, 10)]);
        assert!(!line.is_closed());
        assert!(!line.contains(IVec2::new(5, 5)));
    }

    #[test]
    fn test_shared_diagonal_splits_points_exactly() {
        // two triangles sharing the diagonal of a 20x20 square
        let upper = Polygon::new(vec![
            IVec2::new(0, 0),
            IVec2::new(20, 0),
            IVec2::new(20, 20),
        ]);
        let lower = Polygon::new(vec![
            IVec2::new(0, 0),
            IVec2::new(20, 20),
            IVec2::new(0, 20),
        ]);

        for p in Rect::new(IVec2::ZERO, IVec2::new(20, 20)).points() {
            let a = upper.contains(p);
            let b = lower.contains(p);
            assert!(a != b, "{:?} claimed by {} triangles", p, a as u8 + b as u8);
        }
    }

    #[test]
    fn test_bounds() {
        let poly = Polygon::new(vec![
            IVec2::new(3, 8),
            IVec2::new(12, 1),
            IVec2::new(7, 15),
        ]);
        let b = poly.bounds();
        assert_eq!(b.min, IVec2::new(3, 1));
        assert_eq!(b.max, IVec2::new(12, 15));
        assert_eq!(Polygon::default().bounds(), Rect::default());
    }
}
