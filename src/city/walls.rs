//! City and curtain walls

use std::collections::{BTreeMap, HashMap};

use glam::IVec2;

use super::Layout;
use crate::citymap::Stroke;
use crate::classify::classify;
use crate::config::FortificationSettings;
use crate::district::{District, Edge};
use crate::error::Result;
use crate::fortify::{edge_admits_gate, fortifications_fit, place_gate, GatePlacement, Towers};
use crate::geometry::{segment_length, EdgeKey, Rect, Segment};
use crate::outline::Outline;
use crate::voronoi::{circuit, Cell, VoronoiIndex};

/// An edge a gate could be cut into
#[derive(Debug, Clone, Copy)]
struct GateCandidate {
    inside: usize,
    outside: usize,
    edge: Segment,
}

/// Candidates keyed by the curtain-walled district they serve (`None` for
/// the city wall)
type GateCandidates = BTreeMap<Option<usize>, Vec<GateCandidate>>;

/// Everything built along one wall circuit
#[derive(Debug, Default)]
struct Ring {
    walls: Vec<Edge>,
    towers: Vec<Rect>,
    gates: Vec<Rect>,
}

impl<'a, O: Outline> Layout<'a, O> {
    /// Build the city wall and any curtain walls
    pub(super) fn add_walls(
        &mut self,
        index: &VoronoiIndex,
        settings: &FortificationSettings,
        added: &[usize],
    ) -> Result<()> {
        for &id in added {
            let config = self.catalog.require(self.districts[id].district_type)?;
            let district = &mut self.districts[id];
            district.has_fortifications = config.has_fortifications;
            district.has_curtain_fortifications = config.has_curtain_fortifications;
        }

        let mut curtain = Vec::new();
        let mut inside = Vec::new();
        let mut outside = Vec::new();
        for d in &self.districts {
            if d.has_curtain_fortifications {
                curtain.push(d.id);
            } else if d.has_fortifications {
                inside.push(d.id);
            } else {
                outside.push(d.id);
            }
        }

        promote_fortified(
            &mut self.districts,
            &mut inside,
            &mut outside,
            self.config.centre,
            settings.min_fortified_sites,
        );

        let (ideal, other) = self.gate_candidates(index, settings, inside.iter().chain(&curtain));
        let mut towers = Towers::new(settings.tower_size, settings.min_dist_between_towers);

        if !inside.is_empty() {
            let gates = ideal.get(&None).map(Vec::as_slice).unwrap_or_default();
            let ring = self.wall_districts(
                index,
                settings,
                &inside,
                &outside,
                gates,
                settings.wall_width,
                settings.max_city_gates,
                &mut towers,
            )?;
            self.walls = ring.walls;
            self.towers = ring.towers;
            self.gates = ring.gates;
        }

        for &id in &curtain {
            let others: Vec<usize> = (0..self.districts.len()).filter(|&o| o != id).collect();
            let gates = match ideal.get(&Some(id)) {
                Some(found) if !found.is_empty() => found.as_slice(),
                _ => other.get(&Some(id)).map(Vec::as_slice).unwrap_or_default(),
            };
            let ring = self.wall_districts(
                index,
                settings,
                &[id],
                &others,
                gates,
                settings.curtain_wall_width,
                1,
                &mut towers,
            )?;
            let district = &mut self.districts[id];
            district.walls = ring.walls;
            district.towers = ring.towers;
            district.gates = ring.gates;
        }

        Ok(())
    }

    /// Edges where gates could go, split into preferred and fallback
    ///
    /// City wall gates open from a fortified district to an unfortified
    /// one. Curtain wall gates prefer opening into the fortified city. Edges
    /// too short for a gate and edges against other curtain walls are left
    /// out.
    fn gate_candidates<'i>(
        &self,
        index: &VoronoiIndex,
        settings: &FortificationSettings,
        walled: impl Iterator<Item = &'i usize>,
    ) -> (GateCandidates, GateCandidates) {
        let mut ideal = GateCandidates::new();
        let mut other = GateCandidates::new();

        for &id in walled {
            let district = &self.districts[id];
            let city_wall = !district.has_curtain_fortifications;
            let key = (!city_wall).then_some(id);

            for neighbour in index.neighbours(id) {
                let Some(next) = self.districts.get(neighbour.id) else {
                    continue;
                };
                if next.has_curtain_fortifications || (city_wall && next.has_fortifications) {
                    continue;
                }
                let preferred = city_wall || next.has_fortifications;
                let bucket = if preferred { &mut ideal } else { &mut other };

                for edge in neighbour.edges {
                    if !edge_admits_gate(&edge, settings.tower_size, settings.gatehouse_size) {
                        continue;
                    }
                    bucket.entry(key).or_default().push(GateCandidate {
                        inside: id,
                        outside: neighbour.id,
                        edge,
                    });
                }
            }
        }

        (ideal, other)
    }

    /// Wall off `inside` from `outside`, cutting up to `max_gates` gates
    ///
    /// Gates are tried in candidate order and kept only where every part of
    /// them fits. Then each edge of the circuit is classified and walled
    /// wherever it crosses road or bridge ground, except in front of a gate
    /// where the gate's own stubs stand in for the wall.
    #[allow(clippy::too_many_arguments)]
    fn wall_districts(
        &mut self,
        index: &VoronoiIndex,
        settings: &FortificationSettings,
        inside: &[usize],
        outside: &[usize],
        candidates: &[GateCandidate],
        width: i32,
        max_gates: usize,
        towers: &mut Towers,
    ) -> Result<Ring> {
        let mut ring = Ring::default();
        let mut cut: HashMap<EdgeKey, GatePlacement> = HashMap::new();

        for candidate in candidates {
            if cut.len() >= max_gates {
                break;
            }
            let key = EdgeKey::from(&candidate.edge);
            if cut.contains_key(&key) {
                continue;
            }
            let Some(gate) = place_gate(
                index,
                candidate.edge,
                candidate.inside,
                candidate.outside,
                settings.tower_size,
                settings.gatehouse_size,
            ) else {
                tracing::debug!(edge = ?candidate.edge, "no room to indent a gate");
                continue;
            };
            if !fortifications_fit(&gate, &self.map, self.outline, index) {
                tracing::debug!(edge = ?candidate.edge, "gate does not fit");
                continue;
            }

            for wall in gate.walls {
                self.map.draw_line(wall, width, Stroke::Wall);
            }
            for tower in gate.towers {
                self.map.fill_rect(tower, Stroke::Tower);
                towers.register(tower);
                ring.towers.push(tower);
            }
            self.map.fill_rect(gate.gatehouse, Stroke::Gatehouse);
            ring.gates.push(gate.gatehouse);
            cut.insert(key, gate);
        }

        let inside_cells = cells(index, inside)?;
        let outside_cells = cells(index, outside)?;
        let max_over_water = settings.max_bridge_wall_length;

        for segment in circuit(index.bounds(), &inside_cells, &outside_cells) {
            let line = classify(&self.map, self.outline, segment[0], segment[1], None);
            let roads = line.roads();
            let bridges = line.bridges();
            if roads.is_empty() && bridges.is_empty() {
                continue;
            }

            let gate = cut.get(&EdgeKey::from(&segment));
            let mut edge = Edge::new(segment);
            let mut stubs_added = false;

            for run in roads.iter().chain(line.walls().iter()) {
                if let Some(gate) = gate {
                    if gate.within_courtyard(run[0]) || gate.within_courtyard(run[1]) {
                        if !stubs_added {
                            for stub in gate.walls {
                                edge.push(stub, false);
                            }
                            stubs_added = true;
                        }
                        continue;
                    }
                }
                self.map.draw_line(*run, width, Stroke::Wall);
                edge.push(*run, false);
                ring.towers.extend(towers.fill(&mut self.map, self.outline, *run));
            }

            for run in &bridges {
                if max_over_water > 0 && segment_length(run) > max_over_water {
                    tracing::debug!(run = ?run, "wall over water too long");
                    continue;
                }
                self.map.draw_line(*run, width, Stroke::Wall);
                edge.push(*run, true);
                ring.towers.extend(towers.fill(&mut self.map, self.outline, *run));
            }

            ring.walls.push(edge);
        }

        Ok(ring)
    }
}

fn cells<'i>(index: &'i VoronoiIndex, ids: &[usize]) -> Result<Vec<&'i Cell>> {
    ids.iter().map(|&id| index.require(id)).collect()
}

/// Make sure at least `min` districts sit inside the city wall
///
/// When too few are fortified, the unfortified districts nearest `centre`
/// are promoted and moved from `outside` to `inside`; if there are not
/// enough of them, all are. Returns the promoted ids.
pub(super) fn promote_fortified(
    districts: &mut [District],
    inside: &mut Vec<usize>,
    outside: &mut Vec<usize>,
    centre: IVec2,
    min: usize,
) -> Vec<usize> {
    let needed = min.saturating_sub(inside.len());
    if needed == 0 {
        return Vec::new();
    }

    let promoted: Vec<usize> = if needed >= outside.len() {
        std::mem::take(outside)
    } else {
        outside.sort_by_key(|&id| (districts[id].site - centre).as_i64vec2().length_squared());
        outside.drain(..needed).collect()
    };

    for &id in &promoted {
        districts[id].has_fortifications = true;
    }
    inside.extend(&promoted);
    tracing::debug!(promoted = promoted.len(), "promoted districts inside the city wall");
    promoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn districts(sites: &[(i32, i32, bool)]) -> Vec<District> {
        sites
            .iter()
            .enumerate()
            .map(|(id, &(x, y, fortified))| {
                let mut d = District::new(id, IVec2::new(x, y));
                d.has_fortifications = fortified;
                d
            })
            .collect()
    }

    fn split(districts: &[District]) -> (Vec<usize>, Vec<usize>) {
        districts.iter().map(|d| d.id).partition(|&id| districts[id].has_fortifications)
    }

    #[test]
    fn test_promotes_nearest_to_centre() {
        let mut ds = districts(&[
            (500, 500, true),
            (520, 500, true),
            (480, 520, true),
            (500, 470, true),
            (900, 900, false),
            (560, 500, false),
            (100, 100, false),
            (500, 430, false),
            (0, 999, false),
            (700, 700, false),
        ]);
        let (mut inside, mut outside) = split(&ds);

        let promoted = promote_fortified(&mut ds, &mut inside, &mut outside, IVec2::new(500, 500), 6);

        assert_eq!(promoted, vec![5, 7]);
        assert_eq!(inside.len(), 6);
        assert_eq!(outside.len(), 4);
        assert_eq!(ds.iter().filter(|d| d.has_fortifications).count(), 6);
        assert!(ds[5].has_fortifications && ds[7].has_fortifications);
        assert!(!ds[9].has_fortifications);
    }

    #[test]
    fn test_promotes_everyone_when_short() {
        let mut ds = districts(&[(10, 10, true), (20, 20, false), (30, 30, false)]);
        let (mut inside, mut outside) = split(&ds);

        let promoted = promote_fortified(&mut ds, &mut inside, &mut outside, IVec2::ZERO, 6);

        assert_eq!(promoted.len(), 2);
        assert!(outside.is_empty());
        assert!(ds.iter().all(|d| d.has_fortifications));
    }

    #[test]
    fn test_no_promotion_when_enough() {
        let mut ds = districts(&[(10, 10, true), (20, 20, true), (30, 30, false)]);
        let (mut inside, mut outside) = split(&ds);

        assert!(promote_fortified(&mut ds, &mut inside, &mut outside, IVec2::ZERO, 2).is_empty());
        assert_eq!(outside, vec![2]);
        assert!(!ds[2].has_fortifications);
    }
}
