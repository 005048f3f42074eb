//! Terrain classification consumed by the city builder
//!
//! The builder never decides what the land is; it asks an [`Outline`]
//! supplied by the caller three questions per grid point.

use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What sits at a given location
///
/// The questions are independent: a point may answer true to several of
/// them, or false to all three (unusable terrain).
/// Answers must be a pure function of the coordinates.
pub trait Outline {
    /// Buildings, roads, towers and gatehouses may be placed here
    fn can_build_on(&self, p: IVec2) -> bool;

    /// Bridges and walls may span this point
    fn can_bridge_over(&self, p: IVec2) -> bool;

    /// This point makes a district eligible to be docks, typically land
    /// alongside the sea or a large river
    fn suitable_dock(&self, p: IVec2) -> bool;
}

impl<T: Outline + ?Sized> Outline for &T {
    fn can_build_on(&self, p: IVec2) -> bool {
        (**self).can_build_on(p)
    }

    fn can_bridge_over(&self, p: IVec2) -> bool {
        (**self).can_bridge_over(p)
    }

    fn suitable_dock(&self, p: IVec2) -> bool {
        (**self).suitable_dock(p)
    }
}

/// A straight coastline with an optional straight river running inland
///
/// Everything with `y > coast` is land, the row `y == coast` is the
/// waterfront suitable for docks and the columns of `river` (inclusive)
/// are bridgeable water rather than land.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::{BandOutline, Outline};
/// use glam::IVec2;
///
/// let outline = BandOutline::new(50).with_river(495, 505);
/// assert!(outline.can_build_on(IVec2::new(10, 60)));
/// assert!(outline.can_bridge_over(IVec2::new(500, 60)));
/// assert!(outline.suitable_dock(IVec2::new(10, 50)));
/// assert!(!outline.can_build_on(IVec2::new(10, 20)));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandOutline {
    /// Last row of sea
    pub coast: i32,
    /// First and last column of the river
    pub river: Option<(i32, i32)>,
}

impl BandOutline {
    pub fn new(coast: i32) -> Self {
        Self { coast, river: None }
    }

    pub fn with_river(mut self, from_x: i32, to_x: i32) -> Self {
        self.river = Some((from_x.min(to_x), from_x.max(to_x)));
        self
    }
}

impl Outline for BandOutline {
    fn can_build_on(&self, p: IVec2) -> bool {
        p.y > self.coast && !self.can_bridge_over(p)
    }

    fn can_bridge_over(&self, p: IVec2) -> bool {
        match self.river {
            Some((lo, hi)) => p.y > self.coast && p.x >= lo && p.x <= hi,
            None => false,
        }
    }

    fn suitable_dock(&self, p: IVec2) -> bool {
        p.y == self.coast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coast_only() {
        let o = BandOutline::new(50);
        assert!(!o.can_build_on(IVec2::new(0, 50)));
        assert!(o.can_build_on(IVec2::new(0, 51)));
        assert!(!o.can_bridge_over(IVec2::new(500, 500)));
        assert!(o.suitable_dock(IVec2::new(700, 50)));
        assert!(!o.suitable_dock(IVec2::new(700, 51)));
    }

    #[test]
    fn test_river_is_exclusive_with_land() {
        let o = BandOutline::new(50).with_river(505, 495);
        assert_eq!(o.river, Some((495, 505)));
        for x in 490..510 {
            let p = IVec2::new(x, 300);
            assert!(!(o.can_build_on(p) && o.can_bridge_over(p)));
            assert_eq!(o.can_bridge_over(p), (495..=505).contains(&x));
        }
        // river does not run into the sea
        assert!(!o.can_bridge_over(IVec2::new(500, 10)));
    }

    #[test]
    fn test_reference_is_outline() {
        fn takes<O: Outline>(o: O) -> bool {
            o.can_build_on(IVec2::new(1, 100))
        }
        let o = BandOutline::new(50);
        assert!(takes(&o));
    }
}
