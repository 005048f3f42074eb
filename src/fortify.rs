//! Gatehouse and tower placement geometry
//!
//! A gate is cut into the middle of a wall edge. The gatehouse itself is
//! pushed back into the inside district, leaving a small courtyard in front
//! of it, with four towers: two where the wall is cut and two flanking the
//! gatehouse. Short wall stubs join the cut to the indent.
//!
//! ```text
//!   wall ====T         T==== wall
//!            |         |
//!            T--[GATE]-T
//! ```

use glam::IVec2;

use crate::citymap::{SpatialMap, Stroke, Structures};
use crate::geometry::{distance, points_between, segment_length, Rect, Segment};
use crate::outline::Outline;
use crate::voronoi::VoronoiIndex;

/// Where a gate's structures would sit on one candidate edge
///
/// Computing a placement does not check the ground; see
/// [`fortifications_fit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePlacement {
    /// District the gate belongs to
    pub inside: usize,
    /// District the gate opens onto
    pub outside: usize,
    pub edge: Segment,
    /// Two towers where the wall is cut, then two flanking the gatehouse
    pub towers: [Rect; 4],
    pub gatehouse: Rect,
    /// Cut to indent on either side, then across the indent
    pub walls: [Segment; 3],
    /// Points where the edge is cut, ordered by x
    pub left: IVec2,
    pub right: IVec2,
}

impl GatePlacement {
    /// Whether `p` lies in the courtyard spanned by the two cut points
    pub fn within_courtyard(&self, p: IVec2) -> bool {
        let (a, b) = (self.left, self.right);
        if p.x < a.x || p.x > b.x {
            return false;
        }
        p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    }

    /// The gatehouse followed by its towers
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        std::iter::once(self.gatehouse).chain(self.towers.iter().copied())
    }
}

/// Length of edge a gate needs along each axis: two towers and a gatehouse
pub fn gate_span(tower_size: IVec2, gatehouse_size: IVec2) -> IVec2 {
    tower_size * 2 + gatehouse_size
}

/// Whether `edge` is long enough to take a gate in either orientation
pub fn edge_admits_gate(edge: &Segment, tower_size: IVec2, gatehouse_size: IVec2) -> bool {
    let span = gate_span(tower_size, gatehouse_size);
    let len = segment_length(edge);
    len >= span.x && len >= span.y
}

/// Compute where a gate on `edge` would go
///
/// The edge runs between the `inside` and `outside` districts. Edges that
/// are more vertical than horizontal get a gate cut along y, the rest along
/// x. The indent is tried on one side of the cut and then the other; the
/// first whose centre is still nearest the inside site wins. Returns `None`
/// when neither is, which usually means the inside district is too narrow.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::{place_gate, Rect, VoronoiIndex};
/// use glam::IVec2;
///
/// let bounds = Rect::new(IVec2::ZERO, IVec2::new(100, 100));
/// let index = VoronoiIndex::build(bounds, &[IVec2::new(25, 50), IVec2::new(75, 50)]).unwrap();
/// let edge = [IVec2::new(50, 0), IVec2::new(50, 100)];
///
/// let gate = place_gate(&index, edge, 0, 1, IVec2::splat(5), IVec2::splat(8)).unwrap();
/// assert_eq!(gate.gatehouse.centre(), IVec2::new(40, 50));
/// ```
pub fn place_gate(
    index: &VoronoiIndex,
    edge: Segment,
    inside: usize,
    outside: usize,
    tower_size: IVec2,
    gatehouse_size: IVec2,
) -> Option<GatePlacement> {
    let (tw, th) = (tower_size.x, tower_size.y);
    let (gw, gh) = (gatehouse_size.x, gatehouse_size.y);

    let [mut a, mut b] = edge;
    if b.x < a.x {
        std::mem::swap(&mut a, &mut b);
    }
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let middle = (a + b) / 2;
    let vertical = dy.abs() > dx.abs();
    let mult = if dx != 0.0 && dy / dx < 0.0 { -1 } else { 1 };
    let point = |p: (f64, f64)| IVec2::new(p.0 as i32, p.1 as i32);
    let inside_at = |p: IVec2| index.site_for(p) == inside;

    let placement = if vertical {
        let total = (th * 2 + gh) as f64;
        let x_at = |y: f64| a.x as f64 + (y - a.y as f64) * dx / dy;
        let ly = middle.y as f64 - total / 2.0;
        let ry = middle.y as f64 + total / 2.0;
        let mut left = point((x_at(ly), ly));
        let mut right = point((x_at(ry), ry));
        if right.x < left.x {
            std::mem::swap(&mut left, &mut right);
        }

        let mut imid = IVec2::new(left.x - mult * 2 * tw, middle.y);
        if !inside_at(imid) {
            imid = IVec2::new(right.x + mult * 2 * tw, middle.y);
            if !inside_at(imid) {
                return None;
            }
        }

        let half = (total / 2.0) as i32;
        let near = IVec2::new(imid.x, imid.y - half);
        let far = IVec2::new(imid.x, imid.y + half);
        GatePlacement {
            inside,
            outside,
            edge,
            towers: [
                Rect::centred(left, tower_size),
                Rect::centred(right, tower_size),
                Rect::centred(near, tower_size),
                Rect::centred(far, tower_size),
            ],
            gatehouse: Rect::centred(imid, gatehouse_size),
            walls: [
                [left, IVec2::new(imid.x, imid.y - half * mult)],
                [right, IVec2::new(imid.x, imid.y + half * mult)],
                [near, far],
            ],
            left,
            right,
        }
    } else {
        let total = (tw * 2 + gw) as f64;
        let y_at = |x: f64| a.y as f64 + (x - a.x as f64) * dy / dx;
        let lx = middle.x as f64 - total / 2.0;
        let rx = middle.x as f64 + total / 2.0;
        let mut left = point((lx, y_at(lx)));
        let mut right = point((rx, y_at(rx)));
        if right.x < left.x {
            std::mem::swap(&mut left, &mut right);
        }

        let mut imid = IVec2::new(middle.x, left.y + mult * 2 * th);
        if !inside_at(imid) {
            imid = IVec2::new(middle.x, right.y - mult * 2 * th);
            if !inside_at(imid) {
                return None;
            }
        }

        let half = (total / 2.0) as i32;
        GatePlacement {
            inside,
            outside,
            edge,
            towers: [
                Rect::centred(left, tower_size),
                Rect::centred(right, tower_size),
                Rect::centred(IVec2::new(imid.x - half, imid.y), tower_size),
                Rect::centred(IVec2::new(imid.x + half, imid.y), tower_size),
            ],
            gatehouse: Rect::centred(imid, gatehouse_size),
            walls: [
                [left, IVec2::new(imid.x - half, imid.y)],
                [right, IVec2::new(imid.x + half, imid.y)],
                [
                    IVec2::new(imid.x - mult * half, imid.y),
                    IVec2::new(imid.x + mult * half, imid.y),
                ],
            ],
            left,
            right,
        }
    };

    Some(placement)
}

/// Whether every gate structure stands on free, buildable land belonging
/// to one of the gate's two districts
pub fn fortifications_fit<O: Outline>(
    gate: &GatePlacement,
    map: &SpatialMap,
    outline: &O,
    index: &VoronoiIndex,
) -> bool {
    let (Some(inside), Some(outside)) = (index.cell(gate.inside), index.cell(gate.outside)) else {
        return false;
    };

    gate.rects().all(|area| {
        area.points().all(|p| {
            !map.is_fortification(p)
                && outline.can_build_on(p)
                && (inside.contains(p) || outside.contains(p))
        })
    })
}

/// Towers placed along walls, with minimum spacing
///
/// Unlike every other structure a tower may stand in bridgeable water or on
/// top of a wall, but never on another tower or a gatehouse.
#[derive(Debug, Clone)]
pub struct Towers {
    size: IVec2,
    spacing: i32,
    placed: Vec<Rect>,
}

impl Towers {
    pub fn new(size: IVec2, spacing: i32) -> Self {
        Self {
            size,
            spacing,
            placed: Vec::new(),
        }
    }

    /// Towers placed so far, including registered ones
    #[inline]
    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }

    /// Count an existing tower for spacing checks
    pub fn register(&mut self, tower: Rect) {
        self.placed.push(tower);
    }

    /// Area a tower centred on `centre` would cover, if the ground allows it
    pub fn fits<O: Outline>(&self, map: &SpatialMap, outline: &O, centre: IVec2) -> Option<Rect> {
        let area = Rect::centred(centre, self.size);
        let blocked = Structures::TOWER | Structures::GATEHOUSE;
        let ok = area.points().all(|p| {
            let stroke = map.stroke(p);
            stroke != Stroke::Tower
                && stroke != Stroke::Gatehouse
                && !map.structures(p).intersects(blocked)
                && (outline.can_build_on(p) || outline.can_bridge_over(p))
        });
        ok.then_some(area)
    }

    /// Place a tower at `centre` unless it collides or stands closer than
    /// `min_dist` to an existing tower
    pub fn try_place<O: Outline>(
        &mut self,
        map: &mut SpatialMap,
        outline: &O,
        centre: IVec2,
        min_dist: i32,
    ) -> Option<Rect> {
        let area = self.fits(map, outline, centre)?;
        if min_dist > 0
            && self
                .placed
                .iter()
                .any(|t| (distance(t.centre(), centre) as i32) < min_dist)
        {
            return None;
        }

        map.fill_rect(area, Stroke::Tower);
        self.placed.push(area);
        Some(area)
    }

    /// Walk a wall run placing towers
    ///
    /// Both ends are tried first with half the spacing, then every
    /// `spacing`-th point of the rasterised run with the full spacing.
    /// Returns the towers placed.
    pub fn fill<O: Outline>(&mut self, map: &mut SpatialMap, outline: &O, run: Segment) -> Vec<Rect> {
        let mut added = Vec::new();
        let [a, b] = run;
        added.extend(self.try_place(map, outline, a, self.spacing / 2));
        added.extend(self.try_place(map, outline, b, self.spacing / 2));

        if self.spacing > 0 {
            let spacing = self.spacing as usize;
            let path = points_between(a, b);
            for &p in path.iter().skip(spacing).step_by(spacing) {
                added.extend(self.try_place(map, outline, p, self.spacing));
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::BandOutline;

    fn bounds() -> Rect {
        Rect::new(IVec2::ZERO, IVec2::new(100, 100))
    }

    fn pair(a: IVec2, b: IVec2) -> VoronoiIndex {
        VoronoiIndex::build(bounds(), &[a, b]).unwrap()
    }

    const TOWER: IVec2 = IVec2::splat(5);
    const GATE: IVec2 = IVec2::splat(8);

    #[test]
    fn test_vertical_gate_indents_into_inside() {
        let index = pair(IVec2::new(25, 50), IVec2::new(75, 50));
        let edge = [IVec2::new(50, 0), IVec2::new(50, 100)];

        let left = place_gate(&index, edge, 0, 1, TOWER, GATE).unwrap();
        assert_eq!(left.left, IVec2::new(50, 41));
        assert_eq!(left.right, IVec2::new(50, 59));
        assert_eq!(left.gatehouse, Rect::centred(IVec2::new(40, 50), GATE));
        assert_eq!(left.towers[2].centre(), IVec2::new(40, 41));
        assert_eq!(left.towers[3].centre(), IVec2::new(40, 59));
        assert_eq!(left.walls[2], [IVec2::new(40, 41), IVec2::new(40, 59)]);

        let right = place_gate(&index, edge, 1, 0, TOWER, GATE).unwrap();
        assert_eq!(right.gatehouse.centre(), IVec2::new(60, 50));
    }

    #[test]
    fn test_horizontal_gate() {
        let index = pair(IVec2::new(50, 25), IVec2::new(50, 75));
        let edge = [IVec2::new(100, 50), IVec2::new(0, 50)];

        let below = place_gate(&index, edge, 1, 0, TOWER, GATE).unwrap();
        assert_eq!(below.left, IVec2::new(41, 50));
        assert_eq!(below.right, IVec2::new(59, 50));
        assert_eq!(below.gatehouse.centre(), IVec2::new(50, 60));
        assert_eq!(below.walls[0], [IVec2::new(41, 50), IVec2::new(41, 60)]);

        let above = place_gate(&index, edge, 0, 1, TOWER, GATE).unwrap();
        assert_eq!(above.gatehouse.centre(), IVec2::new(50, 40));
    }

    #[test]
    fn test_diagonal_gate() {
        let index = pair(IVec2::new(30, 30), IVec2::new(70, 70));
        let edge = [IVec2::new(0, 100), IVec2::new(100, 0)];
        let gate = place_gate(&index, edge, 0, 1, TOWER, GATE).unwrap();
        assert_eq!(index.site_for(gate.gatehouse.centre()), 0);
    }

    #[test]
    fn test_narrow_district_has_no_gate() {
        let sites = [IVec2::new(48, 50), IVec2::new(52, 50), IVec2::new(56, 50)];
        let index = VoronoiIndex::build(bounds(), &sites).unwrap();
        let edge = [IVec2::new(50, 0), IVec2::new(50, 100)];
        assert!(place_gate(&index, edge, 1, 0, TOWER, GATE).is_none());
    }

    #[test]
    fn test_gate_fit_checks_ground() {
        let index = pair(IVec2::new(25, 50), IVec2::new(75, 50));
        let edge = [IVec2::new(50, 0), IVec2::new(50, 100)];
        let gate = place_gate(&index, edge, 0, 1, TOWER, GATE).unwrap();
        let map = SpatialMap::new(bounds());

        assert!(fortifications_fit(&gate, &map, &BandOutline::new(-1), &index));
        assert!(!fortifications_fit(&gate, &map, &BandOutline::new(55), &index));
        assert!(!fortifications_fit(&gate, &map, &BandOutline::new(-1).with_river(38, 39), &index));

        let mut walled = SpatialMap::new(bounds());
        walled.draw_line([IVec2::new(30, 50), IVec2::new(45, 50)], 1, Stroke::Wall);
        assert!(!fortifications_fit(&gate, &walled, &BandOutline::new(-1), &index));
    }

    #[test]
    fn test_courtyard() {
        let index = pair(IVec2::new(25, 50), IVec2::new(75, 50));
        let gate = place_gate(&index, [IVec2::new(50, 0), IVec2::new(50, 100)], 0, 1, TOWER, GATE).unwrap();
        assert!(gate.within_courtyard(IVec2::new(50, 50)));
        assert!(gate.within_courtyard(IVec2::new(50, 41)));
        assert!(!gate.within_courtyard(IVec2::new(50, 60)));
        assert!(!gate.within_courtyard(IVec2::new(49, 50)));
    }

    #[test]
    fn test_edge_admits_gate() {
        assert_eq!(gate_span(TOWER, GATE), IVec2::splat(18));
        assert!(edge_admits_gate(&[IVec2::ZERO, IVec2::new(18, 0)], TOWER, GATE));
        assert!(!edge_admits_gate(&[IVec2::ZERO, IVec2::new(17, 0)], TOWER, GATE));
    }

    #[test]
    fn test_fill_respects_spacing() {
        let mut map = SpatialMap::new(bounds());
        let outline = BandOutline::new(-1);
        let mut towers = Towers::new(IVec2::splat(3), 10);

        let placed = towers.fill(&mut map, &outline, [IVec2::new(10, 50), IVec2::new(90, 50)]);
        assert_eq!(placed.len(), 9);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(distance(a.centre(), b.centre()) as i32 >= 10);
            }
        }
        assert!(placed.iter().all(|t| map.stroke(t.centre()) == Stroke::Tower));
    }

    #[test]
    fn test_fill_skips_near_registered_towers() {
        let mut map = SpatialMap::new(bounds());
        let outline = BandOutline::new(-1);
        let mut towers = Towers::new(IVec2::splat(3), 10);
        towers.register(Rect::centred(IVec2::new(12, 50), IVec2::splat(3)));

        let placed = towers.fill(&mut map, &outline, [IVec2::new(10, 50), IVec2::new(30, 50)]);
        // start is within half spacing of the registered tower
        assert!(placed.iter().all(|t| t.centre() != IVec2::new(10, 50)));
        assert_eq!(towers.placed().len(), placed.len() + 1);
    }

    #[test]
    fn test_tower_ground_rules() {
        let mut map = SpatialMap::new(bounds());
        let towers = Towers::new(IVec2::splat(3), 10);

        // water is fine, sea is not
        let river = BandOutline::new(-1).with_river(40, 60);
        assert!(towers.fits(&map, &river, IVec2::new(50, 50)).is_some());
        assert!(towers.fits(&map, &BandOutline::new(60), IVec2::new(50, 50)).is_none());

        // on a wall is fine, on a gatehouse is not
        map.draw_line([IVec2::new(0, 20), IVec2::new(99, 20)], 3, Stroke::Wall);
        assert!(towers.fits(&map, &river, IVec2::new(20, 20)).is_some());
        map.fill_rect(Rect::from_origin(IVec2::new(70, 70), IVec2::splat(4)), Stroke::Gatehouse);
        assert!(towers.fits(&map, &river, IVec2::new(71, 71)).is_none());
    }
}
