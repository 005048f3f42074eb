//! Building footprint selection and fit testing

use std::collections::BTreeMap;

use glam::IVec2;
use rand::Rng;

use crate::citymap::SpatialMap;
use crate::config::FootprintConfig;
use crate::geometry::Rect;
use crate::outline::Outline;
use crate::voronoi::Cell;

/// Land a footprint of `size` would cover with its top-left corner at `origin`
#[inline]
pub fn footprint_area(origin: IVec2, size: IVec2) -> Rect {
    Rect::from_origin(origin, size)
}

/// Whether a footprint fits with its top-left corner at `origin`
///
/// The footprint plus one row above and below must be free of buildings
/// and structures, buildable, and inside `cell`. Buildings may touch side
/// by side but never top to bottom.
pub fn footprint_fits<O: Outline>(
    map: &SpatialMap,
    outline: &O,
    cell: &Cell,
    origin: IVec2,
    size: IVec2,
) -> bool {
    let padded = Rect::new(
        IVec2::new(origin.x, origin.y - 1),
        IVec2::new(origin.x + size.x, origin.y + size.y + 1),
    );
    padded
        .points()
        .all(|p| !map.is_occupied(p) && outline.can_build_on(p) && cell.contains(p))
}

/// Picks footprints for one district
///
/// Selection runs in two phases. While any footprint still owes placements
/// towards its `min_in_district`, the first owed footprint that fits is
/// returned. Otherwise a weighted draw is made over every footprint with a
/// positive probability, skipping those at their district or city maximum
/// and those that do not fit; if the draw lands on a skipped footprint the
/// next eligible one after it is taken, and nothing is chosen if there is
/// none.
#[derive(Debug, Clone)]
pub struct FootprintChooser<'a> {
    footprints: &'a [FootprintConfig],
    /// Indices into `footprints` with the placements each still owes
    pending: Vec<(usize, usize)>,
    total: f64,
    counts: BTreeMap<u32, usize>,
}

impl<'a> FootprintChooser<'a> {
    pub fn new(footprints: &'a [FootprintConfig]) -> Self {
        let pending = footprints
            .iter()
            .enumerate()
            .filter(|(_, f)| f.min_in_district > 0)
            .map(|(i, f)| (i, f.min_in_district))
            .collect();
        let total = footprints
            .iter()
            .filter(|f| f.probability > 0.0)
            .map(|f| f.probability)
            .sum();

        Self {
            footprints,
            pending,
            total,
            counts: BTreeMap::new(),
        }
    }

    /// Placements made so far in this district, by footprint id
    pub fn count(&self, id: u32) -> usize {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// First footprint still owed placements, with how many remain
    pub fn unmet(&self) -> Option<(u32, usize)> {
        let &(i, remaining) = self.pending.first()?;
        Some((self.footprints[i].id, remaining))
    }

    /// Choose a footprint for one anchor
    ///
    /// `city_counts` holds placements across the whole city so far, and
    /// `fits` tests a footprint at the anchor.
    pub fn choose<R: Rng>(
        &mut self,
        rng: &mut R,
        city_counts: &BTreeMap<u32, usize>,
        mut fits: impl FnMut(&FootprintConfig) -> bool,
    ) -> Option<FootprintConfig> {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|&(i, _)| fits(&self.footprints[i]))
        {
            let (i, remaining) = self.pending[pos];
            if remaining > 1 {
                self.pending[pos].1 -= 1;
            } else {
                self.pending.remove(pos);
            }
            let chosen = self.footprints[i];
            *self.counts.entry(chosen.id).or_insert(0) += 1;
            return Some(chosen);
        }

        if self.total <= 0.0 {
            return None;
        }

        let roll: f64 = rng.gen();
        let mut so_far = 0.0;
        for fp in self.footprints.iter().filter(|f| f.probability > 0.0) {
            so_far += fp.probability / self.total;

            if fp.max_in_district > 0 && self.count(fp.id) >= fp.max_in_district {
                continue;
            }
            let in_city = city_counts.get(&fp.id).copied().unwrap_or(0);
            if fp.max_in_city > 0 && in_city >= fp.max_in_city {
                continue;
            }
            if !fits(fp) {
                continue;
            }
            if so_far > roll {
                *self.counts.entry(fp.id).or_insert(0) += 1;
                return Some(*fp);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citymap::Stroke;
    use crate::outline::BandOutline;
    use crate::voronoi::VoronoiIndex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cell_index() -> VoronoiIndex {
        let bounds = Rect::new(IVec2::ZERO, IVec2::new(100, 100));
        VoronoiIndex::build(bounds, &[IVec2::new(25, 50), IVec2::new(75, 50)]).unwrap()
    }

    #[test]
    fn test_fits_on_open_land() {
        let index = cell_index();
        let map = SpatialMap::new(index.bounds());
        let cell = index.cell(0).unwrap();
        let land = BandOutline::new(-1);

        assert!(footprint_fits(&map, &land, cell, IVec2::new(10, 10), IVec2::new(5, 5)));
        // crosses into the neighbouring cell
        assert!(!footprint_fits(&map, &land, cell, IVec2::new(46, 10), IVec2::new(5, 5)));
        // padding row above falls off the map
        assert!(!footprint_fits(&map, &land, cell, IVec2::new(10, 0), IVec2::new(5, 5)));
        // partly in the sea
        assert!(!footprint_fits(&map, &BandOutline::new(12), cell, IVec2::new(10, 10), IVec2::new(5, 5)));
    }

    #[test]
    fn test_fit_padding() {
        let index = cell_index();
        let cell = index.cell(0).unwrap();
        let land = BandOutline::new(-1);
        let mut map = SpatialMap::new(index.bounds());
        map.set_building(footprint_area(IVec2::new(10, 10), IVec2::new(5, 5)), 1);

        // side by side is allowed
        assert!(footprint_fits(&map, &land, cell, IVec2::new(15, 10), IVec2::new(5, 5)));
        // directly below needs a gap row
        assert!(!footprint_fits(&map, &land, cell, IVec2::new(10, 15), IVec2::new(5, 5)));
        assert!(footprint_fits(&map, &land, cell, IVec2::new(10, 16), IVec2::new(5, 5)));

        map.draw_line([IVec2::new(0, 40), IVec2::new(49, 40)], 1, Stroke::Road);
        assert!(!footprint_fits(&map, &land, cell, IVec2::new(10, 35), IVec2::new(5, 5)));
    }

    #[test]
    fn test_obligations_come_first() {
        let mut must = FootprintConfig::new(7, 4, 4, 0.0);
        must.min_in_district = 2;
        let footprints = [FootprintConfig::new(1, 2, 2, 1.0), must];
        let mut chooser = FootprintChooser::new(&footprints);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let none = BTreeMap::new();

        assert_eq!(chooser.unmet(), Some((7, 2)));
        assert_eq!(chooser.choose(&mut rng, &none, |_| true).map(|f| f.id), Some(7));
        // the owed footprint does not fit here, so a random one is drawn
        assert_eq!(chooser.choose(&mut rng, &none, |f| f.id != 7).map(|f| f.id), Some(1));
        assert_eq!(chooser.unmet(), Some((7, 1)));
        assert_eq!(chooser.choose(&mut rng, &none, |_| true).map(|f| f.id), Some(7));
        assert_eq!(chooser.unmet(), None);
        assert_eq!(chooser.count(7), 2);
    }

    #[test]
    fn test_district_and_city_maximums() {
        let mut capped = FootprintConfig::new(1, 2, 2, 1.0);
        capped.max_in_district = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let footprints = [capped];
        let mut chooser = FootprintChooser::new(&footprints);
        let none = BTreeMap::new();

        let placed = (0..10)
            .filter_map(|_| chooser.choose(&mut rng, &none, |_| true))
            .count();
        assert_eq!(placed, 3);

        let mut city_capped = FootprintConfig::new(2, 2, 2, 1.0);
        city_capped.max_in_city = 5;
        let footprints = [city_capped];
        let mut chooser = FootprintChooser::new(&footprints);
        let city = BTreeMap::from([(2, 5)]);
        assert!(chooser.choose(&mut rng, &city, |_| true).is_none());
    }

    #[test]
    fn test_weighted_choice_follows_probability() {
        let footprints = [
            FootprintConfig::new(1, 2, 2, 0.8),
            FootprintConfig::new(2, 2, 2, 0.2),
            FootprintConfig::new(3, 2, 2, 0.0),
        ];
        let mut chooser = FootprintChooser::new(&footprints);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let none = BTreeMap::new();

        let mut counts = BTreeMap::new();
        for _ in 0..2000 {
            if let Some(f) = chooser.choose(&mut rng, &none, |_| true) {
                *counts.entry(f.id).or_insert(0) += 1;
            }
        }
        let ones = counts.get(&1).copied().unwrap_or(0);
        let twos = counts.get(&2).copied().unwrap_or(0);
        assert!(ones > twos * 2);
        assert!(twos > 0);
        assert!(!counts.contains_key(&3));
    }

    #[test]
    fn test_no_probability_means_no_choice() {
        let footprints = [FootprintConfig::new(1, 2, 2, 0.0)];
        let mut chooser = FootprintChooser::new(&footprints);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(chooser.choose(&mut rng, &BTreeMap::new(), |_| true).is_none());
    }
}
