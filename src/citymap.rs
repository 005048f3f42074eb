//! Dense grid recording what occupies every unit of land
//!
//! The [`SpatialMap`] keeps one small record per grid point: the owning
//! district, the building standing there and a set of structure flags.
//!
//! Roads, bridges and fortifications are not written straight into the
//! flags. They are first drawn onto a sketch layer with thick-line and
//! rectangle primitives, then committed in one sweep by
//! [`SpatialMap::end_draw`]. Towers and gatehouses lock the sketch pixels
//! they cover so later lines cannot paint over them.

use glam::{DVec2, IVec2};

use crate::district::DistrictType;
use crate::geometry::{Rect, Segment};
use crate::outline::Outline;

/// Structure flags stored per grid point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Structures(u8);

impl Structures {
    pub const NONE: Structures = Structures(0);
    pub const ROAD: Structures = Structures(1 << 0);
    pub const BRIDGE: Structures = Structures(1 << 1);
    pub const WALL: Structures = Structures(1 << 2);
    pub const TOWER: Structures = Structures(1 << 3);
    pub const GATEHOUSE: Structures = Structures(1 << 4);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: Structures) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline]
    pub fn intersects(self, other: Structures) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: Structures) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Structures {
    type Output = Structures;

    fn bitor(self, rhs: Structures) -> Structures {
        Structures(self.0 | rhs.0)
    }
}

/// Feature drawn on the sketch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stroke {
    #[default]
    Empty,
    Road,
    Bridge,
    Wall,
    Tower,
    Gatehouse,
}

impl Stroke {
    /// Flag committed for this stroke by `end_draw`
    pub fn structure(self) -> Structures {
        match self {
            Stroke::Empty => Structures::NONE,
            Stroke::Road => Structures::ROAD,
            Stroke::Bridge => Structures::BRIDGE,
            Stroke::Wall => Structures::WALL,
            Stroke::Tower => Structures::TOWER,
            Stroke::Gatehouse => Structures::GATEHOUSE,
        }
    }

    #[inline]
    pub fn is_fortification(self) -> bool {
        matches!(self, Stroke::Wall | Stroke::Tower | Stroke::Gatehouse)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MapCell {
    district: Option<(DistrictType, u32)>,
    building: u32,
    flags: Structures,
}

#[derive(Debug, Clone, Copy, Default)]
struct SketchCell {
    stroke: Stroke,
    locked: bool,
}

/// Flat grid of land records indexed by `y * width + x`
///
/// Every read is bounds-checked; points outside the map report no district,
/// building 0 and no structures.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::{Rect, SpatialMap, Stroke, BandOutline};
/// use glam::IVec2;
///
/// let mut map = SpatialMap::new(Rect::new(IVec2::ZERO, IVec2::new(50, 50)));
/// map.draw_line([IVec2::new(5, 20), IVec2::new(40, 20)], 3, Stroke::Road);
/// map.end_draw(&BandOutline::new(-1), 0);
///
/// assert!(map.is_road(IVec2::new(10, 20)));
/// assert!(!map.is_road(IVec2::new(10, 30)));
/// assert!(!map.is_road(IVec2::new(-5, 20)));
/// ```
#[derive(Debug, Clone)]
pub struct SpatialMap {
    bounds: Rect,
    cells: Vec<MapCell>,
    sketch: Vec<SketchCell>,
}

impl SpatialMap {
    pub fn new(bounds: Rect) -> Self {
        let len = if bounds.is_empty() {
            0
        } else {
            bounds.width() as usize * bounds.height() as usize
        };
        Self {
            bounds,
            cells: vec![MapCell::default(); len],
            sketch: vec![SketchCell::default(); len],
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    fn index(&self, p: IVec2) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let local = p - self.bounds.min;
        Some(local.y as usize * self.bounds.width() as usize + local.x as usize)
    }

    /// Type and id of the district owning `p`
    pub fn district(&self, p: IVec2) -> Option<(DistrictType, usize)> {
        let i = self.index(p)?;
        self.cells[i].district.map(|(t, id)| (t, id as usize))
    }

    pub fn set_district(&mut self, p: IVec2, district_type: DistrictType, id: usize) {
        if let Some(i) = self.index(p) {
            self.cells[i].district = Some((district_type, id as u32));
        }
    }

    /// Footprint id of the building at `p`, 0 if there is none
    pub fn building(&self, p: IVec2) -> u32 {
        self.index(p).map(|i| self.cells[i].building).unwrap_or(0)
    }

    /// Mark every point of `area` as covered by building `id`
    pub fn set_building(&mut self, area: Rect, id: u32) {
        for p in area.points() {
            if let Some(i) = self.index(p) {
                self.cells[i].building = id;
            }
        }
    }

    /// Committed structure flags at `p`
    pub fn structures(&self, p: IVec2) -> Structures {
        self.index(p)
            .map(|i| self.cells[i].flags)
            .unwrap_or(Structures::NONE)
    }

    /// Add structure flags at `p` directly, bypassing the sketch
    pub fn set_structures(&mut self, p: IVec2, flags: Structures) {
        if let Some(i) = self.index(p) {
            self.cells[i].flags.insert(flags);
        }
    }

    pub fn is_road(&self, p: IVec2) -> bool {
        self.structures(p).contains(Structures::ROAD)
    }

    pub fn is_bridge(&self, p: IVec2) -> bool {
        self.structures(p).contains(Structures::BRIDGE)
    }

    pub fn is_wall(&self, p: IVec2) -> bool {
        self.structures(p).contains(Structures::WALL)
    }

    pub fn is_tower(&self, p: IVec2) -> bool {
        self.structures(p).contains(Structures::TOWER)
    }

    pub fn is_gatehouse(&self, p: IVec2) -> bool {
        self.structures(p).contains(Structures::GATEHOUSE)
    }

    /// Stroke currently sketched at `p`
    pub fn stroke(&self, p: IVec2) -> Stroke {
        self.index(p)
            .map(|i| self.sketch[i].stroke)
            .unwrap_or_default()
    }

    /// Wall, tower or gatehouse at `p`, sketched or committed
    pub fn is_fortification(&self, p: IVec2) -> bool {
        let Some(i) = self.index(p) else {
            return false;
        };
        self.sketch[i].stroke.is_fortification()
            || self.cells[i]
                .flags
                .intersects(Structures::WALL | Structures::TOWER | Structures::GATEHOUSE)
    }

    /// Anything at all stands at `p`: a building, a committed structure or
    /// a sketched stroke
    pub fn is_occupied(&self, p: IVec2) -> bool {
        let Some(i) = self.index(p) else {
            return false;
        };
        let cell = &self.cells[i];
        cell.building != 0 || !cell.flags.is_empty() || self.sketch[i].stroke != Stroke::Empty
    }

    fn paint(&mut self, p: IVec2, stroke: Stroke, lock: bool) {
        if let Some(i) = self.index(p) {
            let px = &mut self.sketch[i];
            if px.locked {
                return;
            }
            px.stroke = stroke;
            px.locked = lock;
        }
    }

    /// Sketch a thick straight line with square caps
    ///
    /// A pixel is painted if its centre lies within `width / 2` of the line
    /// across it and within `width / 2` beyond either end along it. A line
    /// whose ends coincide paints a square. Locked pixels are left alone.
    pub fn draw_line(&mut self, segment: Segment, width: i32, stroke: Stroke) {
        if width <= 0 {
            return;
        }
        let [a, b] = segment;
        let half = width as f64 / 2.0;
        let reach = half.ceil() as i32 + 1;

        let area = Rect::new(a.min(b) - IVec2::splat(reach), a.max(b) + IVec2::splat(reach + 1));
        let origin = a.as_dvec2();
        let dir = (b - a).as_dvec2();
        let len = dir.length();

        let (along, across) = if len > 0.0 {
            let u = dir / len;
            (u, DVec2::new(-u.y, u.x))
        } else {
            (DVec2::X, DVec2::Y)
        };

        for p in area.points() {
            if !self.bounds.contains(p) {
                continue;
            }
            let rel = p.as_dvec2() - origin;
            let t = rel.dot(along);
            let s = rel.dot(across);
            if t >= -half && t < len + half && s >= -half && s < half {
                self.paint(p, stroke, false);
            }
        }
    }

    /// Sketch a filled rectangle
    ///
    /// Tower and gatehouse fills lock their pixels against later drawing.
    pub fn fill_rect(&mut self, area: Rect, stroke: Stroke) {
        let lock = matches!(stroke, Stroke::Tower | Stroke::Gatehouse);
        for p in area.points() {
            self.paint(p, stroke, lock);
        }
    }

    /// Commit the sketch into the structure flags
    ///
    /// Each sketched pixel sets its stroke's flag. An unsketched pixel that
    /// the outline calls buildable or bridgeable becomes road (or bridge)
    /// when a fortification stroke lies within `border` of it on both axes,
    /// so walls always have a way round them.
    pub fn end_draw<O: Outline>(&mut self, outline: &O, border: i32) {
        if self.cells.is_empty() {
            return;
        }
        let w = self.bounds.width() as usize;
        let h = self.bounds.height() as usize;

        // inclusive prefix sums of fortification strokes, offset by one
        let stride = w + 1;
        let mut sums = vec![0u32; stride * (h + 1)];
        for y in 0..h {
            for x in 0..w {
                let fort = self.sketch[y * w + x].stroke.is_fortification() as u32;
                sums[(y + 1) * stride + x + 1] =
                    fort + sums[y * stride + x + 1] + sums[(y + 1) * stride + x] - sums[y * stride + x];
            }
        }
        let window = |x: usize, y: usize, r: usize| -> u32 {
            let x0 = x.saturating_sub(r);
            let y0 = y.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let y1 = (y + r + 1).min(h);
            sums[y1 * stride + x1] + sums[y0 * stride + x0] - sums[y0 * stride + x1] - sums[y1 * stride + x0]
        };

        let mut promoted = 0usize;
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                let stroke = self.sketch[i].stroke;
                if stroke != Stroke::Empty {
                    self.cells[i].flags.insert(stroke.structure());
                    continue;
                }
                if border <= 0 {
                    continue;
                }

                let p = self.bounds.min + IVec2::new(x as i32, y as i32);
                let water = outline.can_bridge_over(p);
                if !(water || outline.can_build_on(p)) {
                    continue;
                }
                if window(x, y, border as usize) > 0 {
                    let flag = if water { Structures::BRIDGE } else { Structures::ROAD };
                    self.cells[i].flags.insert(flag);
                    promoted += 1;
                }
            }
        }

        tracing::debug!(promoted, border, "committed sketch to spatial map");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::BandOutline;

    fn map() -> SpatialMap {
        SpatialMap::new(Rect::new(IVec2::ZERO, IVec2::new(60, 40)))
    }

    fn all_land() -> BandOutline {
        BandOutline::new(-1)
    }

    #[test]
    fn test_out_of_bounds_reads_are_absent() {
        let mut m = map();
        m.set_district(IVec2::new(100, 100), DistrictType::Park, 3);
        m.set_building(Rect::new(IVec2::new(-5, -5), IVec2::new(2, 2)), 4);

        assert_eq!(m.district(IVec2::new(-1, 0)), None);
        assert_eq!(m.building(IVec2::new(60, 0)), 0);
        assert_eq!(m.building(IVec2::new(1, 1)), 4);
        assert!(!m.is_occupied(IVec2::new(0, 40)));
        assert!(!m.is_fortification(IVec2::new(-3, -3)));
        assert_eq!(m.structures(IVec2::new(0, -1)), Structures::NONE);
    }

    #[test]
    fn test_district_and_building_records() {
        let mut m = map();
        m.set_district(IVec2::new(3, 4), DistrictType::Market, 17);
        assert_eq!(m.district(IVec2::new(3, 4)), Some((DistrictType::Market, 17)));
        assert_eq!(m.district(IVec2::new(4, 4)), None);

        let area = Rect::from_origin(IVec2::new(10, 10), IVec2::new(3, 2));
        m.set_building(area, 9);
        assert_eq!(m.building(IVec2::new(12, 11)), 9);
        assert_eq!(m.building(IVec2::new(13, 11)), 0);
        assert!(m.is_occupied(IVec2::new(10, 10)));
    }

    #[test]
    fn test_thick_horizontal_line() {
        let mut m = map();
        m.draw_line([IVec2::new(10, 20), IVec2::new(30, 20)], 4, Stroke::Wall);
        // across: [-2, 2) around y = 20, beyond the ends by 2
        assert_eq!(m.stroke(IVec2::new(20, 18)), Stroke::Wall);
        assert_eq!(m.stroke(IVec2::new(20, 21)), Stroke::Wall);
        assert_eq!(m.stroke(IVec2::new(20, 22)), Stroke::Empty);
        assert_eq!(m.stroke(IVec2::new(8, 20)), Stroke::Wall);
        assert_eq!(m.stroke(IVec2::new(7, 20)), Stroke::Empty);
        assert_eq!(m.stroke(IVec2::new(31, 20)), Stroke::Wall);
        assert_eq!(m.stroke(IVec2::new(32, 20)), Stroke::Empty);
        assert!(m.is_fortification(IVec2::new(15, 19)));
    }

    #[test]
    fn test_single_width_line_is_connected() {
        let mut m = map();
        let (a, b) = (IVec2::new(5, 5), IVec2::new(50, 30));
        m.draw_line([a, b], 1, Stroke::Road);
        for p in crate::geometry::points_between(a, b) {
            let hit = [IVec2::ZERO, IVec2::X, IVec2::Y, IVec2::NEG_X, IVec2::NEG_Y]
                .iter()
                .any(|&d| m.stroke(p + d) == Stroke::Road);
            assert!(hit, "{:?} has no road nearby", p);
        }
    }

    #[test]
    fn test_degenerate_line_paints_square() {
        let mut m = map();
        m.draw_line([IVec2::new(20, 20), IVec2::new(20, 20)], 2, Stroke::Road);
        let painted = m.bounds().points().filter(|&p| m.stroke(p) == Stroke::Road).count();
        assert_eq!(painted, 4);
    }

    #[test]
    fn test_towers_lock_their_pixels() {
        let mut m = map();
        let tower = Rect::from_origin(IVec2::new(18, 18), IVec2::new(5, 5));
        m.fill_rect(tower, Stroke::Tower);
        m.draw_line([IVec2::new(0, 20), IVec2::new(59, 20)], 3, Stroke::Road);

        assert_eq!(m.stroke(IVec2::new(20, 20)), Stroke::Tower);
        assert_eq!(m.stroke(IVec2::new(10, 20)), Stroke::Road);

        m.fill_rect(tower, Stroke::Gatehouse);
        assert_eq!(m.stroke(IVec2::new(20, 20)), Stroke::Tower);
    }

    #[test]
    fn test_later_lines_overwrite_unlocked() {
        let mut m = map();
        m.draw_line([IVec2::new(0, 10), IVec2::new(59, 10)], 2, Stroke::Road);
        m.draw_line([IVec2::new(30, 0), IVec2::new(30, 39)], 2, Stroke::Bridge);
        assert_eq!(m.stroke(IVec2::new(30, 10)), Stroke::Bridge);
    }

    #[test]
    fn test_end_draw_commits_strokes() {
        let mut m = map();
        m.draw_line([IVec2::new(0, 5), IVec2::new(59, 5)], 2, Stroke::Road);
        m.fill_rect(Rect::from_origin(IVec2::new(40, 30), IVec2::new(3, 3)), Stroke::Gatehouse);
        m.end_draw(&all_land(), 0);

        assert!(m.is_road(IVec2::new(20, 5)));
        assert!(!m.is_bridge(IVec2::new(20, 5)));
        assert!(m.is_gatehouse(IVec2::new(41, 31)));
        assert!(m.is_fortification(IVec2::new(41, 31)));
        assert!(!m.is_road(IVec2::new(20, 20)));
    }

    #[test]
    fn test_end_draw_borders_fortifications_with_road() {
        let mut m = map();
        m.draw_line([IVec2::new(30, 5), IVec2::new(30, 35)], 1, Stroke::Wall);
        let outline = BandOutline::new(-1).with_river(33, 40);
        m.end_draw(&outline, 3);

        assert!(m.is_wall(IVec2::new(30, 20)));
        assert!(m.is_road(IVec2::new(27, 20)));
        assert!(!m.is_road(IVec2::new(26, 20)));
        // bridgeable land becomes bridge rather than road
        assert!(m.is_bridge(IVec2::new(33, 20)));
        assert!(!m.is_road(IVec2::new(33, 20)));
        assert!(!m.is_bridge(IVec2::new(34, 20)));
        // beyond the end of the wall
        assert!(m.is_road(IVec2::new(30, 38)));
        assert!(!m.is_road(IVec2::new(30, 39)));
    }

    #[test]
    fn test_unusable_land_is_not_promoted() {
        let mut m = map();
        m.draw_line([IVec2::new(30, 5), IVec2::new(30, 35)], 1, Stroke::Wall);
        // everything above row 25 is sea
        m.end_draw(&BandOutline::new(25), 3);
        assert!(!m.is_road(IVec2::new(28, 10)));
        assert!(m.is_road(IVec2::new(28, 30)));
    }

    #[test]
    fn test_structures_flags() {
        let mut s = Structures::NONE;
        assert!(s.is_empty());
        s.insert(Structures::ROAD);
        s.insert(Structures::TOWER);
        assert!(s.contains(Structures::ROAD));
        assert!(!s.contains(Structures::WALL));
        assert!(s.intersects(Structures::WALL | Structures::TOWER));
        assert!(!s.contains(Structures::NONE));
        assert_eq!(s.bits(), 0b1001);
    }
}
