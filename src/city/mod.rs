//! City generation
//!
//! A build runs in fixed phases, each drawing onto one [`SpatialMap`]:
//! 1. District sites (caller supplied, then random) and their Voronoi cells
//! 2. Dock repair, so docks districts actually touch the waterfront
//! 3. City and curtain walls with gates and towers
//! 4. Main roads between districts, then roads within each district
//! 5. Road borders around fortifications, then buildings
//!
//! Walls come before roads so that roads never cut through a wall except at
//! a gate.

mod buildings;
mod districts;
mod roads;
mod walls;

use glam::IVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::citymap::SpatialMap;
use crate::config::{CityConfig, DistrictCatalog};
use crate::district::{CityStats, District, Edge};
use crate::error::Result;
use crate::geometry::Rect;
use crate::outline::Outline;
use crate::voronoi::{SiteBuilder, VoronoiIndex};

/// A generated city
///
/// Districts are indexed by id, which is also the id of their Voronoi cell.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::*;
/// use glam::IVec2;
///
/// let config = CityConfigBuilder::new()
///     .seed(3)
///     .area(Rect::new(IVec2::ZERO, IVec2::new(200, 200)))
///     .desired_districts(6)
///     .min_district_size(40)
///     .unwrap()
///     .build()
///     .unwrap();
/// let catalog = DistrictCatalog::uniform(DistrictConfig::default());
///
/// let city = City::generate(&catalog, config, &BandOutline::new(-1)).unwrap();
/// assert!(!city.districts().is_empty());
///
/// let district = city.district_at(IVec2::new(100, 100)).unwrap();
/// assert_eq!(city.map().district(IVec2::new(100, 100)), Some((district.district_type, district.id)));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone)]
pub struct City {
    config: CityConfig,
    districts: Vec<District>,
    /// Roads along the edges between districts
    roads: Vec<Edge>,
    /// The wall around the fortified districts
    walls: Vec<Edge>,
    towers: Vec<Rect>,
    gates: Vec<Rect>,
    stats: CityStats,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: VoronoiIndex,
    #[cfg_attr(feature = "serde", serde(skip))]
    map: SpatialMap,
}

impl City {
    /// Generate a city on the land described by `outline`
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for a catalog with unusable footprints
    /// - `CannotMeetDesiredDistricts` if too few sites fit to honour every
    ///   per-type minimum
    /// - `NoEligibleDistrictType` if every type is at its maximum
    /// - `MissingDistrictConfig` if a district's type is not in the catalog
    /// - `UnresolvableDocks` if a docks district cannot reach the waterfront
    /// - `BuildingMinimumUnmet` if a district cannot hold its required
    ///   buildings
    pub fn generate<O: Outline>(
        catalog: &DistrictCatalog,
        config: CityConfig,
        outline: &O,
    ) -> Result<Self> {
        catalog.validate()?;

        let mut layout = Layout::new(catalog, &config, outline);
        let mut sites = SiteBuilder::new(config.area, config.seed);

        layout.add_user_districts(&mut sites);
        let added = layout.add_random_districts(&mut sites)?;
        let index = sites.build()?;
        drop(sites);
        tracing::info!(
            districts = layout.districts.len(),
            random = added.len(),
            "placed district sites"
        );

        layout.verify_districts(&index, &added)?;

        if let Some(settings) = config.fortifications {
            layout.add_walls(&index, &settings, &added)?;
            tracing::info!(
                wall_edges = layout.walls.len(),
                towers = layout.towers.len(),
                gates = layout.gates.len(),
                "built fortifications"
            );
        }

        layout.add_main_roads(&index)?;
        layout.add_minor_roads(&index)?;
        tracing::info!(
            main_roads = layout.roads.len(),
            bridges = layout.stats.bridges,
            "laid roads"
        );

        layout.map.end_draw(outline, config.wall_border_road_width());

        layout.add_buildings(&index)?;
        tracing::info!(
            buildings = layout
                .districts
                .iter()
                .map(|d| d.buildings.len() + usize::from(d.central.is_some()))
                .sum::<usize>(),
            "placed buildings"
        );

        let Layout {
            districts,
            roads,
            walls,
            towers,
            gates,
            stats,
            map,
            ..
        } = layout;

        Ok(Self {
            config,
            districts,
            roads,
            walls,
            towers,
            gates,
            stats,
            index,
            map,
        })
    }

    #[inline]
    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    #[inline]
    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    #[inline]
    pub fn district(&self, id: usize) -> Option<&District> {
        self.districts.get(id)
    }

    /// District owning the point `p`, if it lies in the city
    pub fn district_at(&self, p: IVec2) -> Option<&District> {
        let (_, id) = self.map.district(p)?;
        self.district(id)
    }

    /// Roads along the edges shared by districts
    ///
    /// Roads inside a district are stored on the district itself.
    #[inline]
    pub fn roads(&self) -> &[Edge] {
        &self.roads
    }

    /// Sections of the city wall
    #[inline]
    pub fn walls(&self) -> &[Edge] {
        &self.walls
    }

    /// Towers along the city wall, gate towers included
    #[inline]
    pub fn towers(&self) -> &[Rect] {
        &self.towers
    }

    /// Gatehouses in the city wall
    #[inline]
    pub fn gates(&self) -> &[Rect] {
        &self.gates
    }

    #[inline]
    pub fn stats(&self) -> &CityStats {
        &self.stats
    }

    /// Voronoi cells of the districts
    #[inline]
    pub fn index(&self) -> &VoronoiIndex {
        &self.index
    }

    /// Per-point districts, buildings and structures
    #[inline]
    pub fn map(&self) -> &SpatialMap {
        &self.map
    }
}

/// Working state shared by the build phases
struct Layout<'a, O> {
    catalog: &'a DistrictCatalog,
    config: &'a CityConfig,
    outline: &'a O,
    /// Type choices and dock repair
    rng: ChaCha8Rng,
    districts: Vec<District>,
    roads: Vec<Edge>,
    walls: Vec<Edge>,
    towers: Vec<Rect>,
    gates: Vec<Rect>,
    stats: CityStats,
    map: SpatialMap,
}

impl<'a, O: Outline> Layout<'a, O> {
    fn new(catalog: &'a DistrictCatalog, config: &'a CityConfig, outline: &'a O) -> Self {
        Self {
            catalog,
            config,
            outline,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            districts: Vec::new(),
            roads: Vec::new(),
            walls: Vec::new(),
            towers: Vec::new(),
            gates: Vec::new(),
            stats: CityStats::default(),
            map: SpatialMap::new(config.area),
        }
    }
}
