//! Main roads between districts and minor roads within them

use std::collections::HashSet;

use glam::IVec2;

use super::Layout;
use crate::citymap::Stroke;
use crate::classify::classify;
use crate::config::CityConfig;
use crate::district::Edge;
use crate::error::Result;
use crate::geometry::{segment_length, sort_by_length, EdgeKey, Rect, Segment};
use crate::outline::Outline;
use crate::voronoi::{SiteBuilder, VoronoiIndex};

impl<'a, O: Outline> Layout<'a, O> {
    /// Lay roads along the edges between districts
    ///
    /// Each shared edge is considered once. An edge carries its road only
    /// if every bridge on it is admissible; otherwise none of it is built.
    pub(super) fn add_main_roads(&mut self, index: &VoronoiIndex) -> Result<()> {
        let width = self.config.main_road_width / 2;
        let bounds = index.bounds();
        let mut laid: HashSet<EdgeKey> = HashSet::new();

        for id in 0..self.districts.len() {
            let config = self.catalog.require(self.districts[id].district_type)?;
            if !config.needs_roads() {
                continue;
            }

            for edge in index.require(id)?.edges() {
                if on_frame(bounds, edge) || !laid.insert(EdgeKey::from(edge)) {
                    continue;
                }

                let line = classify(&self.map, self.outline, edge[0], edge[1], None);
                let roads = line.roads();
                let mut bridges = line.bridges();
                if roads.is_empty() && bridges.is_empty() {
                    continue;
                }
                sort_by_length(&mut bridges);

                let budget = match usize::try_from(self.config.max_bridges) {
                    Ok(max) => max.saturating_sub(self.stats.bridges),
                    Err(_) => usize::MAX,
                };
                if bridges.len() > budget || !bridges.iter().all(|b| bridge_fits(self.config, b)) {
                    tracing::debug!(edge = ?edge, bridges = bridges.len(), "dropped main road");
                    continue;
                }

                let mut road = Edge::new(*edge);
                for run in roads {
                    self.map.draw_line(run, width, Stroke::Road);
                    road.push(run, false);
                }
                for run in bridges {
                    self.map.draw_line(run, width, Stroke::Bridge);
                    road.push(run, true);
                    self.stats.bridges += 1;
                }
                self.roads.push(road);
            }
        }

        Ok(())
    }

    /// Lay roads within each district
    ///
    /// A district's cell is split into blocks by a Voronoi diagram of its
    /// own, whose edges become roads where they fall inside the district.
    pub(super) fn add_minor_roads(&mut self, index: &VoronoiIndex) -> Result<()> {
        let catalog = self.catalog;
        let outline = self.outline;

        for id in 0..self.districts.len() {
            let config = catalog.require(self.districts[id].district_type)?;
            if !config.needs_roads() {
                continue;
            }

            let cell = index.require(id)?;
            let bounds = cell.bounds();
            let block = config.block_size(self.config.min_block_size);

            let seed = (self.config.seed / 2).wrapping_add(id as u64);
            let mut sites = SiteBuilder::new(bounds, seed);
            sites.add_candidate_filter(move |p| outline.can_build_on(p) && cell.contains(p));
            sites.add_site_filter(SiteBuilder::min_distance(f64::from(block / 2)));

            let attempts = (f64::from(bounds.width()) * 0.25 * config.road_density) as usize;
            for _ in 0..attempts {
                sites.add_random_site();
            }
            if sites.site_count() == 0 {
                continue;
            }
            let blocks = sites.build()?;

            let width = config.road_width.max(2) / 2;
            let mut laid: HashSet<EdgeKey> = HashSet::new();

            for edge in blocks.cells().iter().flat_map(|c| c.edges()) {
                if !laid.insert(EdgeKey::from(edge)) {
                    continue;
                }

                let line = classify(&self.map, outline, edge[0], edge[1], Some(cell));
                let roads = line.roads();
                let mut bridges = line.bridges();
                if roads.is_empty() && bridges.is_empty() {
                    continue;
                }

                let mut road = Edge::new(*edge);
                for run in roads {
                    // the frame of the sub-diagram follows the cell bounds
                    if axis_aligned(run) {
                        continue;
                    }
                    self.map.draw_line(run, width, Stroke::Road);
                    road.push(run, false);
                }

                sort_by_length(&mut bridges);
                let district = &mut self.districts[id];
                for run in bridges {
                    if let Ok(max) = usize::try_from(config.max_bridges) {
                        if district.stats.bridges >= max {
                            break;
                        }
                    }
                    if !bridge_fits(self.config, &run) {
                        continue;
                    }
                    self.map.draw_line(run, width, Stroke::Bridge);
                    road.push(run, true);
                    district.stats.bridges += 1;
                }

                if !road.sections.is_empty() {
                    district.roads.push(road);
                }
            }
        }

        Ok(())
    }
}

/// Whether a bridge's length lies within the configured limits
fn bridge_fits(config: &CityConfig, bridge: &Segment) -> bool {
    let len = segment_length(bridge);
    len >= config.min_bridge_length && (config.max_bridge_length <= 0 || len <= config.max_bridge_length)
}

/// Both ends of `edge` lie on the same side of `bounds`
fn on_frame(bounds: Rect, edge: &Segment) -> bool {
    let [a, b] = *edge;
    (a.x == bounds.min.x && b.x == bounds.min.x)
        || (a.y == bounds.min.y && b.y == bounds.min.y)
        || (a.x == bounds.max.x && b.x == bounds.max.x)
        || (a.y == bounds.max.y && b.y == bounds.max.y)
}

fn axis_aligned(run: Segment) -> bool {
    let [a, b]: [IVec2; 2] = run;
    a.x == b.x || a.y == b.y
}
