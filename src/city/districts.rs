//! District placement, typing and dock repair

use std::collections::BTreeMap;

use glam::IVec2;
use rand::Rng;

use super::Layout;
use crate::config::{DistrictCatalog, DistrictConfig};
use crate::district::{sort_by_desirability, CityStats, District, DistrictType};
use crate::error::{CityError, Result};
use crate::outline::Outline;
use crate::voronoi::{SiteBuilder, VoronoiIndex};

impl<'a, O: Outline> Layout<'a, O> {
    /// Place the caller's districts exactly where asked
    pub(super) fn add_user_districts(&mut self, sites: &mut SiteBuilder<'a>) {
        for wanted in &self.config.district_sites {
            let Some(id) = sites.add_site(wanted.site) else {
                tracing::debug!(site = ?wanted.site, "rejected district site");
                continue;
            };

            let mut district = District::new(id, wanted.site);
            district.district_type = wanted.district_type;
            district.has_fortifications = wanted.has_fortifications;
            district.has_curtain_fortifications = wanted.has_curtain_fortifications;
            self.stats.increment(wanted.district_type);
            self.districts.push(district);
        }
    }

    /// Scatter random districts until the desired count is reached
    ///
    /// Types owed by per-type minimums are assigned first, the rest are
    /// drawn by weight. The most desirable types go to the sites nearest the
    /// centre. Returns the ids of the new districts.
    pub(super) fn add_random_districts(&mut self, sites: &mut SiteBuilder<'a>) -> Result<Vec<usize>> {
        let desired = self.config.desired_districts;
        if self.districts.len() >= desired {
            return Ok(Vec::new());
        }

        let mut types: Vec<DistrictType> = Vec::new();
        for (t, district) in self.catalog.iter() {
            let owed = district.min_in_city.saturating_sub(self.stats.count(t));
            types.extend(std::iter::repeat(t).take(owed));
        }

        let size = self.config.min_district_size;
        let outline = self.outline;
        sites.add_candidate_filter(move |p| outline.can_build_on(p) && has_room(outline, p, size));
        sites.add_site_filter(SiteBuilder::min_distance(f64::from(size / 2)));

        let mut added: Vec<usize> = Vec::new();
        for _ in 0..desired * 5 {
            if self.districts.len() >= desired {
                break;
            }
            if let Some((id, site)) = sites.add_random_site() {
                self.districts.push(District::new(id, site));
                added.push(id);
            }
        }
        sites.clear_filters();

        if added.len() < types.len() {
            return Err(CityError::CannotMeetDesiredDistricts {
                placed: added.len(),
                required: types.len(),
            });
        }

        let mut chosen: BTreeMap<DistrictType, usize> = BTreeMap::new();
        for t in &types {
            *chosen.entry(*t).or_insert(0) += 1;
        }
        while types.len() < added.len() {
            let stats = &self.stats;
            let t = choose_district_type(&mut self.rng, self.catalog, |t, district| {
                let count = stats.count(t) + chosen.get(&t).copied().unwrap_or(0);
                district.max_in_city == 0 || count < district.max_in_city
            })
            .ok_or(CityError::NoEligibleDistrictType)?;
            *chosen.entry(t).or_insert(0) += 1;
            types.push(t);
        }

        let centre = self.config.centre;
        added.sort_by_key(|&id| distance_squared(self.districts[id].site, centre));
        sort_by_desirability(&mut types);

        for (&id, &t) in added.iter().zip(&types) {
            self.districts[id].district_type = t;
            self.stats.increment(t);
        }

        Ok(added)
    }

    /// Tally terrain for every district and make sure docks reach water
    pub(super) fn verify_districts(&mut self, index: &VoronoiIndex, added: &[usize]) -> Result<()> {
        for district in &mut self.districts {
            let cell = index.require(district.id)?;
            for p in cell.points() {
                if self.outline.can_build_on(p) {
                    district.stats.buildable += 1;
                }
                if self.outline.can_bridge_over(p) {
                    district.stats.bridgeable += 1;
                }
                if self.outline.suitable_dock(p) {
                    district.stats.dock_suitable += 1;
                }
            }
        }

        resolve_docks(
            &mut self.districts,
            added,
            self.config.min_dock_size,
            self.catalog,
            &mut self.stats,
            &mut self.rng,
        )
    }
}

/// Whether the square of side `size` around `p` holds at least `size`
/// buildable points
fn has_room<O: Outline>(outline: &O, p: IVec2, size: i32) -> bool {
    let half = size / 2;
    let needed = usize::try_from(size).unwrap_or(0);
    let mut found = 0;
    for dx in -half..size - half {
        for dy in -half..size - half {
            if outline.can_build_on(p + IVec2::new(dx, dy)) {
                found += 1;
                if found >= needed {
                    return true;
                }
            }
        }
    }
    found >= needed
}

fn distance_squared(a: IVec2, b: IVec2) -> i64 {
    (a - b).as_i64vec2().length_squared()
}

/// Weighted random choice over the configured types `eligible` accepts
///
/// Types with no probability are never chosen. Weights are normalised over
/// the eligible types only, so a draw always lands on one of them.
pub(super) fn choose_district_type<R: Rng>(
    rng: &mut R,
    catalog: &DistrictCatalog,
    mut eligible: impl FnMut(DistrictType, &DistrictConfig) -> bool,
) -> Option<DistrictType> {
    let candidates: Vec<(DistrictType, f64)> = catalog
        .iter()
        .filter(|(t, district)| district.probability > 0.0 && eligible(*t, district))
        .map(|(t, district)| (t, district.probability))
        .collect();

    let total: f64 = candidates.iter().map(|(_, p)| p).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.gen::<f64>() * total;
    let mut so_far = 0.0;
    for &(t, p) in &candidates {
        so_far += p;
        if roll < so_far {
            return Some(t);
        }
    }
    candidates.last().map(|&(t, _)| t)
}

/// Move docks districts onto the waterfront
///
/// Among `added`, each docks district without `min_dock_size` dock-suitable
/// points swaps types with a non-docks district that has them. With no one
/// left to swap with, it is retyped at random if the city can spare a docks
/// district; otherwise the build fails.
pub(super) fn resolve_docks<R: Rng>(
    districts: &mut [District],
    added: &[usize],
    min_dock_size: usize,
    catalog: &DistrictCatalog,
    stats: &mut CityStats,
    rng: &mut R,
) -> Result<()> {
    let mut stranded: Vec<usize> = Vec::new();
    let mut waterfront: Vec<usize> = Vec::new();
    for &id in added {
        let d = &districts[id];
        let enough = d.stats.dock_suitable >= min_dock_size;
        if d.district_type == DistrictType::Docks {
            if !enough {
                stranded.push(id);
            }
        } else if enough {
            waterfront.push(id);
        }
    }

    let min_docks = catalog
        .get(DistrictType::Docks)
        .map(|d| d.min_in_city)
        .unwrap_or(0);

    while let Some(id) = stranded.pop() {
        if let Some(other) = waterfront.pop() {
            districts[id].district_type = districts[other].district_type;
            districts[other].district_type = DistrictType::Docks;
            tracing::debug!(from = id, to = other, "moved docks district to the waterfront");
            continue;
        }

        if stats.count(DistrictType::Docks) <= min_docks {
            return Err(CityError::UnresolvableDocks(id));
        }

        let counts = &*stats;
        let t = choose_district_type(rng, catalog, |t, district| {
            t != DistrictType::Docks
                && (district.max_in_city == 0 || counts.count(t) < district.max_in_city)
        })
        .ok_or(CityError::UnresolvableDocks(id))?;

        stats.decrement(DistrictType::Docks);
        stats.increment(t);
        districts[id].district_type = t;
        tracing::debug!(district = id, retyped = %t, "retyped docks district away from the waterfront");
    }

    Ok(())
}
