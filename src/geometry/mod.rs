//! Integer geometry primitives shared by every stage of the build

mod line;
mod polygon;

pub use line::points_between;
pub use polygon::Polygon;

use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A straight segment between two grid points
pub type Segment = [IVec2; 2];

/// Axis-aligned integer rectangle, `min` inclusive and `max` exclusive
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left corner (inclusive)
    pub min: IVec2,
    /// Bottom-right corner (exclusive)
    pub max: IVec2,
}

impl Rect {
    /// Create a rectangle from two corners, normalising their order
    pub fn new(a: IVec2, b: IVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Rectangle of `size` with its top-left corner at `origin`
    pub fn from_origin(origin: IVec2, size: IVec2) -> Self {
        Self::new(origin, origin + size)
    }

    /// Rectangle of `size` centred (rounding towards the top-left) on `centre`
    pub fn centred(centre: IVec2, size: IVec2) -> Self {
        Self::from_origin(centre - size / 2, size)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        self.max - self.min
    }

    /// True if the rectangle covers no grid points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Middle of the rectangle (integer division)
    #[inline]
    pub fn centre(&self) -> IVec2 {
        (self.min + self.max) / 2
    }

    #[inline]
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// All grid points in the rectangle, row-major
    pub fn points(&self) -> impl Iterator<Item = IVec2> {
        let Rect { min, max } = *self;
        (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| IVec2::new(x, y)))
    }
}

/// Euclidean distance between two grid points
#[inline]
pub fn distance(a: IVec2, b: IVec2) -> f64 {
    a.as_dvec2().distance(b.as_dvec2())
}

/// Length of a segment truncated to whole units
#[inline]
pub fn segment_length(s: &Segment) -> i32 {
    distance(s[0], s[1]) as i32
}

/// Sort segments so the shortest comes first
pub fn sort_by_length(segments: &mut [Segment]) {
    segments.sort_by(|a, b| {
        distance(a[0], a[1])
            .partial_cmp(&distance(b[0], b[1]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Order-independent identity of an edge
///
/// Two edges with the same endpoints compare equal regardless of direction,
/// which is what neighbour discovery and circuit extraction key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    a: (i32, i32),
    b: (i32, i32),
}

impl EdgeKey {
    pub fn new(a: IVec2, b: IVec2) -> Self {
        let a = (a.x, a.y);
        let b = (b.x, b.y);
        if b < a {
            Self { a: b, b: a }
        } else {
            Self { a, b }
        }
    }

    /// Endpoints in canonical order
    pub fn endpoints(&self) -> Segment {
        [IVec2::new(self.a.0, self.a.1), IVec2::new(self.b.0, self.b.1)]
    }
}

impl From<&Segment> for EdgeKey {
    fn from(s: &Segment) -> Self {
        EdgeKey::new(s[0], s[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_centred_keeps_full_size() {
        let r = Rect::centred(IVec2::new(10, 10), IVec2::new(5, 5));
        assert_eq!(r.width(), 5);
        assert_eq!(r.height(), 5);
        assert!(r.contains(IVec2::new(10, 10)));
        assert_eq!(r.min, IVec2::new(8, 8));
    }

    #[test]
    fn test_rect_points_row_major() {
        let r = Rect::new(IVec2::new(1, 1), IVec2::new(3, 3));
        let pts: Vec<IVec2> = r.points().collect();
        assert_eq!(
            pts,
            vec![
                IVec2::new(1, 1),
                IVec2::new(2, 1),
                IVec2::new(1, 2),
                IVec2::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_edge_key_is_order_independent() {
        let a = IVec2::new(5, 9);
        let b = IVec2::new(2, 14);
        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        assert_eq!(EdgeKey::new(a, b).endpoints(), [b, a]);

        // vertical edges order on y
        let c = IVec2::new(3, 10);
        let d = IVec2::new(3, 2);
        assert_eq!(EdgeKey::new(c, d).endpoints(), [d, c]);
    }

    #[test]
    fn test_sort_by_length() {
        let mut segs = vec![
            [IVec2::ZERO, IVec2::new(10, 0)],
            [IVec2::ZERO, IVec2::new(2, 0)],
            [IVec2::ZERO, IVec2::new(0, 5)],
        ];
        sort_by_length(&mut segs);
        let lengths: Vec<i32> = segs.iter().map(segment_length).collect();
        assert_eq!(lengths, vec![2, 5, 10]);
    }
}
