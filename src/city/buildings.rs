//! Building placement

use std::collections::BTreeMap;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::Layout;
use crate::citymap::SpatialMap;
use crate::district::{Building, District};
use crate::error::{CityError, Result};
use crate::footprint::{footprint_area, footprint_fits, FootprintChooser};
use crate::geometry::distance;
use crate::outline::Outline;
use crate::voronoi::{Cell, VoronoiIndex};

impl<'a, O: Outline> Layout<'a, O> {
    /// Mark every district on the map and fill it with buildings
    pub(super) fn add_buildings(&mut self, index: &VoronoiIndex) -> Result<()> {
        let mut city_counts: BTreeMap<u32, usize> = BTreeMap::new();
        for id in 0..self.districts.len() {
            self.add_district_buildings(index.require(id)?, &mut city_counts)?;
        }
        Ok(())
    }

    /// Buildings for the district owning `cell`
    ///
    /// The central building goes at the fitting point nearest the site.
    /// The rest are placed by walking rings inward from the edge of the
    /// cell's bounds: along the top and bottom rows, then down the left and
    /// right columns, each footprint aligned to the ring's outer edge.
    fn add_district_buildings(
        &mut self,
        cell: &Cell,
        city_counts: &mut BTreeMap<u32, usize>,
    ) -> Result<()> {
        let id = cell.id();
        let district_type = self.districts[id].district_type;
        let config = self.catalog.require(district_type)?;
        let bounds = cell.bounds();
        let site = cell.site();

        let mut central: Option<IVec2> = None;
        let mut nearest = bounds.max.x + bounds.max.y;
        for p in cell.points() {
            self.map.set_district(p, district_type, id);

            let Some(fp) = config.central else {
                continue;
            };
            let dist = distance(site, p) as i32;
            if dist > nearest {
                continue;
            }
            if footprint_fits(&self.map, self.outline, cell, p, fp.size) {
                central = Some(p);
                nearest = dist;
            }
        }

        if let (Some(fp), Some(origin)) = (config.central, central) {
            let area = footprint_area(origin, fp.size);
            self.map.set_building(area, fp.id);
            self.districts[id].set_central(Building { id: fp.id, area });
            *city_counts.entry(fp.id).or_insert(0) += 1;
        }

        if config.footprints.is_empty() {
            return Ok(());
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(id as u64));
        let mut placer = Placer {
            map: &mut self.map,
            outline: self.outline,
            cell,
            district: &mut self.districts[id],
            chooser: FootprintChooser::new(&config.footprints),
            city_counts,
            density: config.building_density,
        };

        let (min, max) = (bounds.min, bounds.max);
        for i in 0..bounds.width().min(bounds.height()) / 2 {
            for x in min.x + i..max.x - i {
                placer.try_at(&mut rng, |_| IVec2::new(x, min.y + i));
                placer.try_at(&mut rng, |size| IVec2::new(x, max.y - i - size.y));
            }
            for y in min.y + i..max.y - i {
                placer.try_at(&mut rng, |_| IVec2::new(min.x + i, y));
                placer.try_at(&mut rng, |size| IVec2::new(max.x - i - size.x, y));
            }
        }

        match placer.chooser.unmet() {
            Some((footprint, remaining)) => Err(CityError::BuildingMinimumUnmet {
                district: id,
                footprint,
                remaining,
            }),
            None => Ok(()),
        }
    }
}

/// Places buildings within one district
struct Placer<'p, O> {
    map: &'p mut SpatialMap,
    outline: &'p O,
    cell: &'p Cell,
    district: &'p mut District,
    chooser: FootprintChooser<'p>,
    city_counts: &'p mut BTreeMap<u32, usize>,
    density: f64,
}

impl<O: Outline> Placer<'_, O> {
    /// Maybe place a building, with its top-left corner given by `origin`
    /// for each footprint size
    fn try_at<R: Rng>(&mut self, rng: &mut R, origin: impl Fn(IVec2) -> IVec2) {
        if rng.gen::<f64>() >= self.density {
            return;
        }

        let (map, outline, cell) = (&*self.map, self.outline, self.cell);
        let chosen = self.chooser.choose(rng, self.city_counts, |fp| {
            footprint_fits(map, outline, cell, origin(fp.size), fp.size)
        });
        let Some(fp) = chosen else {
            return;
        };

        let area = footprint_area(origin(fp.size), fp.size);
        self.map.set_building(area, fp.id);
        self.district.add_building(Building { id: fp.id, area });
        *self.city_counts.entry(fp.id).or_insert(0) += 1;
    }
}
