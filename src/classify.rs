//! Line classification against the spatial map and terrain
//!
//! A proposed straight line (a road along a cell edge, a stretch of wall)
//! is rasterised and split into maximal runs that share one kind of
//! ground. Callers then draw only the runs they want.

use glam::IVec2;

use crate::citymap::SpatialMap;
use crate::geometry::{points_between, Segment};
use crate::outline::Outline;
use crate::voronoi::Cell;

/// What a run of points along a line can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// Outside the allowed cell, under a building, or unusable terrain
    Nothing,
    Road,
    Bridge,
    /// Already a wall, tower or gatehouse
    Wall,
}

/// Maximal stretch of a rasterised line sharing one [`RunKind`]
///
/// `start` and `end` are inclusive indices into [`Classified::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub start: usize,
    pub end: usize,
}

/// A rasterised line and its runs
///
/// The runs cover the path exactly once, in order, with no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub path: Vec<IVec2>,
    pub runs: Vec<Run>,
}

impl Classified {
    fn segments(&self, kind: RunKind) -> Vec<Segment> {
        self.runs
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| [self.path[r.start], self.path[r.end]])
            .collect()
    }

    /// First and last point of every road run
    pub fn roads(&self) -> Vec<Segment> {
        self.segments(RunKind::Road)
    }

    /// First and last point of every bridge run
    pub fn bridges(&self) -> Vec<Segment> {
        self.segments(RunKind::Bridge)
    }

    /// First and last point of every run over existing fortification
    pub fn walls(&self) -> Vec<Segment> {
        self.segments(RunKind::Wall)
    }
}

/// Kind of ground at a single point
fn point_kind<O: Outline>(map: &SpatialMap, outline: &O, p: IVec2, within: Option<&Cell>) -> RunKind {
    if within.is_some_and(|cell| !cell.contains(p)) {
        RunKind::Nothing
    } else if map.building(p) != 0 {
        RunKind::Nothing
    } else if map.is_fortification(p) {
        RunKind::Wall
    } else if outline.can_build_on(p) {
        RunKind::Road
    } else if outline.can_bridge_over(p) {
        RunKind::Bridge
    } else {
        RunKind::Nothing
    }
}

/// Split the line from `start` to `end` into runs
///
/// Each point is judged in priority order: outside `within` (when given),
/// under a building, on a fortification, buildable, bridgeable. Equal
/// neighbours merge into one run.
///
/// A bridge run only counts as a bridge once a road run has appeared
/// earlier on the same line; before that it is reported as `Nothing`, so
/// no bridge ever opens straight onto unusable ground.
///
/// The result depends only on the map, the outline and the endpoints.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::{classify, BandOutline, Rect, SpatialMap};
/// use glam::IVec2;
///
/// let map = SpatialMap::new(Rect::new(IVec2::ZERO, IVec2::new(100, 100)));
/// let outline = BandOutline::new(-1).with_river(40, 49);
///
/// let line = classify(&map, &outline, IVec2::new(10, 50), IVec2::new(90, 50), None);
/// assert_eq!(line.roads().len(), 2);
/// assert_eq!(line.bridges(), vec![[IVec2::new(40, 50), IVec2::new(49, 50)]]);
/// ```
pub fn classify<O: Outline>(
    map: &SpatialMap,
    outline: &O,
    start: IVec2,
    end: IVec2,
    within: Option<&Cell>,
) -> Classified {
    let path = points_between(start, end);
    let mut runs: Vec<Run> = Vec::new();
    let mut seen_road = false;

    let mut push = |runs: &mut Vec<Run>, kind: RunKind, start: usize, end: usize| {
        let kind = match kind {
            RunKind::Bridge if !seen_road => RunKind::Nothing,
            RunKind::Road => {
                seen_road = true;
                kind
            }
            other => other,
        };
        // an unanchored bridge may merge with the nothing run before it
        match runs.last_mut() {
            Some(last) if last.kind == kind => last.end = end,
            _ => runs.push(Run { kind, start, end }),
        }
    };

    let mut current: Option<(RunKind, usize)> = None;
    for (i, &p) in path.iter().enumerate() {
        let kind = point_kind(map, outline, p, within);
        match current {
            Some((k, _)) if k == kind => {}
            Some((k, s)) => {
                push(&mut runs, k, s, i - 1);
                current = Some((kind, i));
            }
            None => current = Some((kind, i)),
        }
    }
    if let Some((k, s)) = current {
        push(&mut runs, k, s, path.len() - 1);
    }

    Classified { path, runs }
}
