//! City configuration and builder
//!
//! Two layers of configuration drive a build: a [`DistrictCatalog`] describing
//! each district type (how often it appears, what footprints it holds, whether
//! it is walled), usually shared between many cities, and a [`CityConfig`]
//! describing one particular city.

use std::collections::BTreeMap;

use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::district::DistrictType;
use crate::error::{CityError, Result};
use crate::geometry::Rect;

/// A rectangular building template
///
/// Only the land area matters here; what stands on it (a house, a garden, a
/// walled yard) is up to the consumer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintConfig {
    /// Non-zero id, reported by the spatial map for every covered point
    pub id: u32,
    /// Width and height
    pub size: IVec2,
    /// Maximum across the whole city (0 = no limit)
    pub max_in_city: usize,
    /// Maximum per district (0 = no limit)
    pub max_in_district: usize,
    /// Placements every district of this type must receive
    pub min_in_district: usize,
    /// Relative weight when choosing at random
    pub probability: f64,
}

impl FootprintConfig {
    pub fn new(id: u32, width: i32, height: i32, probability: f64) -> Self {
        Self {
            id,
            size: IVec2::new(width, height),
            max_in_city: 0,
            max_in_district: 0,
            min_in_district: 0,
            probability,
        }
    }
}

/// General settings for every district of one type
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictConfig {
    /// 0 = no limit
    pub max_in_city: usize,
    pub min_in_city: usize,
    /// Relative weight when choosing a type at random
    pub probability: f64,
    pub footprints: Vec<FootprintConfig>,
    /// Building placed as close as possible to the district's site
    pub central: Option<FootprintConfig>,
    /// Width of roads within the district
    pub road_width: i32,
    /// Higher values create more internal roads
    pub road_density: f64,
    /// Bridges allowed on internal roads (negative = no limit)
    pub max_bridges: i32,
    /// Chance of attempting a building at each visited point, 0..=1
    pub building_density: f64,
    /// Enclosed by the city wall
    pub has_fortifications: bool,
    /// Has a wall of its own
    pub has_curtain_fortifications: bool,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            max_in_city: 0,
            min_in_city: 0,
            probability: 0.05,
            footprints: Vec::new(),
            central: None,
            road_width: 2,
            road_density: 1.0,
            max_bridges: -1,
            building_density: 1.0,
            has_fortifications: false,
            has_curtain_fortifications: false,
        }
    }
}

impl DistrictConfig {
    /// Whether the district gets roads at all
    #[inline]
    pub fn needs_roads(&self) -> bool {
        self.road_width > 0 && self.road_density > 0.0
    }

    /// Largest width or height among the footprints, at least `floor`
    pub fn block_size(&self, floor: i32) -> i32 {
        self.footprints
            .iter()
            .fold(floor, |acc, f| acc.max(f.size.x).max(f.size.y))
    }
}

/// Per-type district configuration, iterated in desirability order
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictCatalog {
    districts: BTreeMap<DistrictType, DistrictConfig>,
}

impl DistrictCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the same configuration for every district type
    pub fn uniform(config: DistrictConfig) -> Self {
        let districts = DistrictType::ALL
            .iter()
            .map(|&t| (t, config.clone()))
            .collect();
        Self { districts }
    }

    pub fn insert(&mut self, district_type: DistrictType, config: DistrictConfig) {
        self.districts.insert(district_type, config);
    }

    pub fn get(&self, district_type: DistrictType) -> Option<&DistrictConfig> {
        self.districts.get(&district_type)
    }

    pub fn get_mut(&mut self, district_type: DistrictType) -> Option<&mut DistrictConfig> {
        self.districts.get_mut(&district_type)
    }

    /// Configuration for a type that must be present
    pub fn require(&self, district_type: DistrictType) -> Result<&DistrictConfig> {
        self.get(district_type)
            .ok_or(CityError::MissingDistrictConfig(district_type))
    }

    /// Configured types, most desirable first
    pub fn iter(&self) -> impl Iterator<Item = (DistrictType, &DistrictConfig)> {
        self.districts.iter().map(|(&t, c)| (t, c))
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// Reject footprints that could never be told apart from empty land
    pub fn validate(&self) -> Result<()> {
        for (t, config) in self.iter() {
            for fp in config.footprints.iter().chain(config.central.iter()) {
                if fp.id == 0 {
                    return Err(CityError::InvalidConfig(format!(
                        "footprint ids must be non-zero ({} district)",
                        t
                    )));
                }
                if fp.size.x <= 0 || fp.size.y <= 0 {
                    return Err(CityError::InvalidConfig(format!(
                        "footprint {} must have a positive size (got {}x{})",
                        fp.id, fp.size.x, fp.size.y
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A district the caller wants at an exact location
///
/// Useful for a port at the mouth of a river, a castle on a hill or a
/// temple on a holy site. These are placed as given and count towards the
/// per-type minimum and maximum.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictSite {
    pub district_type: DistrictType,
    /// Voronoi site (approximate centre of the district)
    pub site: IVec2,
    pub has_fortifications: bool,
    pub has_curtain_fortifications: bool,
}

impl DistrictSite {
    pub fn new(district_type: DistrictType, site: IVec2) -> Self {
        Self {
            district_type,
            site,
            has_fortifications: false,
            has_curtain_fortifications: false,
        }
    }
}

/// Walls, towers and gatehouses
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FortificationSettings {
    pub max_city_gates: usize,
    /// Longest stretch of wall over bridgeable land (0 or less = no limit)
    pub max_bridge_wall_length: i32,
    /// Thickness of walls around single districts
    pub curtain_wall_width: i32,
    /// Thickness of the city wall
    pub wall_width: i32,
    /// Approximate spacing of towers along walls
    pub min_dist_between_towers: i32,
    pub tower_size: IVec2,
    /// Gatehouse size, excluding its flanking towers
    pub gatehouse_size: IVec2,
    /// Districts inside the city wall; the nearest to the centre are
    /// promoted when too few are fortified by configuration
    pub min_fortified_sites: usize,
    /// Radius around fortifications turned into road
    pub wall_border_road_width: i32,
}

impl Default for FortificationSettings {
    fn default() -> Self {
        Self {
            max_city_gates: 2,
            max_bridge_wall_length: 0,
            curtain_wall_width: 4,
            wall_width: 5,
            min_dist_between_towers: 10,
            tower_size: IVec2::new(5, 5),
            gatehouse_size: IVec2::new(8, 8),
            min_fortified_sites: 6,
            wall_border_road_width: 3,
        }
    }
}

/// Configuration for a single city
///
/// # Example
///
/// ```rust
/// use rust_voronoi_city::*;
/// use glam::IVec2;
///
/// let config = CityConfigBuilder::new()
///     .seed(42)
///     .area(Rect::new(IVec2::ZERO, IVec2::new(500, 500)))
///     .desired_districts(20)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.centre, IVec2::new(250, 250));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CityConfig {
    /// Bounds of the city
    pub area: Rect,
    /// Wealthier districts are placed closer to this point
    pub centre: IVec2,
    /// Width of the roads between districts
    pub main_road_width: i32,
    /// Bridges on main roads (negative = no limit)
    pub max_bridges: i32,
    /// Longest bridge (0 or less = no limit)
    pub max_bridge_length: i32,
    /// Shortest bridge, ideally the narrowest river width
    pub min_bridge_length: i32,
    /// Districts placed at exact coordinates before any random ones
    pub district_sites: Vec<DistrictSite>,
    /// Best-effort number of districts, user sites included
    pub desired_districts: usize,
    /// Buildable points a district should hold (approximately)
    pub min_district_size: i32,
    /// Smallest internal road block
    pub min_block_size: i32,
    /// Dock-suitable points a docks district must hold
    pub min_dock_size: usize,
    pub seed: u64,
    /// City and curtain walls; none are built if absent
    pub fortifications: Option<FortificationSettings>,
}

impl CityConfig {
    /// Road-border radius around fortifications (0 when unfortified)
    pub fn wall_border_road_width(&self) -> i32 {
        self.fortifications
            .map(|f| f.wall_border_road_width)
            .unwrap_or(0)
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            area: Rect::new(IVec2::ZERO, IVec2::new(1000, 1000)),
            centre: IVec2::new(500, 500),
            main_road_width: 4,
            max_bridges: -1,
            max_bridge_length: 15,
            min_bridge_length: 10,
            district_sites: Vec::new(),
            desired_districts: 100,
            min_district_size: 150,
            min_block_size: 0,
            min_dock_size: 10,
            seed: 0,
            fortifications: None,
        }
    }
}

/// Builder for creating a [`CityConfig`] with validation
///
/// # Example
///
/// ```rust
/// use rust_voronoi_city::*;
///
/// let config = CityConfigBuilder::new()
///     .seed(12345)
///     .main_road_width(6)
///     .bridge_length(8, 20)
///     .unwrap()
///     .fortifications(FortificationSettings::default())
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.min_bridge_length, 8);
/// ```
#[derive(Debug, Clone)]
pub struct CityConfigBuilder {
    seed: Option<u64>,
    centre: Option<IVec2>,
    config: CityConfig,
}

impl CityConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - area: 1000x1000 from the origin
    /// - centre: middle of the area
    /// - seed: random
    /// - 100 desired districts of at least 150 buildable points
    /// - main roads 4 wide, bridges 10 to 15 long, any number of them
    /// - no fortifications
    pub fn new() -> Self {
        Self {
            seed: None,
            centre: None,
            config: CityConfig::default(),
        }
    }

    /// Set the random seed
    ///
    /// The same seed with the same configuration and outline reproduces the
    /// same city.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn area(mut self, area: Rect) -> Self {
        self.config.area = area;
        self
    }

    pub fn centre(mut self, centre: IVec2) -> Self {
        self.centre = Some(centre);
        self
    }

    /// Width of the main roads (clamped to at least 2)
    pub fn main_road_width(mut self, width: i32) -> Self {
        self.config.main_road_width = width;
        self
    }

    /// Bridges allowed on main roads (negative = no limit)
    pub fn max_bridges(mut self, max: i32) -> Self {
        self.config.max_bridges = max;
        self
    }

    /// Set the shortest and longest bridge
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a positive `max` is below `min`
    pub fn bridge_length(mut self, min: i32, max: i32) -> Result<Self> {
        if max > 0 && min > max {
            return Err(CityError::InvalidConfig(format!(
                "min bridge length {} exceeds max bridge length {}",
                min, max
            )));
        }
        self.config.min_bridge_length = min;
        self.config.max_bridge_length = max;
        Ok(self)
    }

    pub fn district_site(mut self, site: DistrictSite) -> Self {
        self.config.district_sites.push(site);
        self
    }

    pub fn desired_districts(mut self, count: usize) -> Self {
        self.config.desired_districts = count;
        self
    }

    /// Buildable points each district should hold
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if size is negative
    pub fn min_district_size(mut self, size: i32) -> Result<Self> {
        if size < 0 {
            return Err(CityError::InvalidConfig(format!(
                "min district size must be >= 0 (got {})",
                size
            )));
        }
        self.config.min_district_size = size;
        Ok(self)
    }

    pub fn min_block_size(mut self, size: i32) -> Self {
        self.config.min_block_size = size;
        self
    }

    pub fn min_dock_size(mut self, size: usize) -> Self {
        self.config.min_dock_size = size;
        self
    }

    /// Enable city and curtain walls
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the tower or gatehouse size is not positive
    pub fn fortifications(mut self, settings: FortificationSettings) -> Result<Self> {
        let sizes = [
            ("tower", settings.tower_size),
            ("gatehouse", settings.gatehouse_size),
        ];
        for (name, size) in sizes {
            if size.x <= 0 || size.y <= 0 {
                return Err(CityError::InvalidConfig(format!(
                    "{} size must be positive (got {}x{})",
                    name, size.x, size.y
                )));
            }
        }
        self.config.fortifications = Some(settings);
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is chosen. If no centre was
    /// provided, the middle of the area is used.
    pub fn build(self) -> Result<CityConfig> {
        let mut config = self.config;

        if config.area.is_empty() {
            return Err(CityError::InvalidConfig(format!(
                "city area must not be empty (got {:?})",
                config.area
            )));
        }

        config.seed = self.seed.unwrap_or_else(rand::random);
        config.centre = self
            .centre
            .unwrap_or_else(|| config.area.min + config.area.size() / 2);
        config.main_road_width = config.main_road_width.max(2);

        Ok(config)
    }
}

impl Default for CityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = CityConfigBuilder::new().build().unwrap();
        assert_eq!(config.area.size(), IVec2::new(1000, 1000));
        assert_eq!(config.centre, IVec2::new(500, 500));
        assert_eq!(config.desired_districts, 100);
        assert!(config.fortifications.is_none());
    }

    #[test]
    fn test_centre_defaults_to_middle_of_offset_area() {
        let config = CityConfigBuilder::new()
            .seed(1)
            .area(Rect::new(IVec2::new(100, 200), IVec2::new(300, 600)))
            .build()
            .unwrap();
        assert_eq!(config.centre, IVec2::new(200, 400));
    }

    #[test]
    fn test_builder_custom() {
        let config = CityConfigBuilder::new()
            .seed(42)
            .centre(IVec2::new(10, 20))
            .main_road_width(0)
            .max_bridges(3)
            .desired_districts(12)
            .min_dock_size(4)
            .district_site(DistrictSite::new(DistrictType::Docks, IVec2::new(5, 5)))
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.centre, IVec2::new(10, 20));
        assert_eq!(config.main_road_width, 2);
        assert_eq!(config.max_bridges, 3);
        assert_eq!(config.desired_districts, 12);
        assert_eq!(config.district_sites.len(), 1);
    }

    #[test]
    fn test_road_width_clamp() {
        let narrow = CityConfigBuilder::new().main_road_width(1).build().unwrap();
        assert_eq!(narrow.main_road_width, 2);

        let odd = CityConfigBuilder::new().main_road_width(5).build().unwrap();
        assert_eq!(odd.main_road_width, 5);
    }

    #[test]
    fn test_district_default_allows_bridges() {
        let district = DistrictConfig::default();
        assert!(district.max_bridges < 0);
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(CityConfigBuilder::new().bridge_length(20, 10).is_err());
        assert!(CityConfigBuilder::new().bridge_length(20, 0).is_ok());
        assert!(CityConfigBuilder::new().min_district_size(-1).is_err());

        let bad = FortificationSettings {
            tower_size: IVec2::new(0, 5),
            ..Default::default()
        };
        assert!(CityConfigBuilder::new().fortifications(bad).is_err());

        let empty = CityConfigBuilder::new()
            .area(Rect::new(IVec2::ZERO, IVec2::new(0, 100)))
            .build();
        assert!(matches!(empty, Err(CityError::InvalidConfig(_))));
    }

    #[test]
    fn test_catalog_order_and_validation() {
        let mut catalog = DistrictCatalog::new();
        catalog.insert(DistrictType::Fields, DistrictConfig::default());
        catalog.insert(DistrictType::Fortress, DistrictConfig::default());
        let order: Vec<DistrictType> = catalog.iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec![DistrictType::Fortress, DistrictType::Fields]);
        assert!(catalog.validate().is_ok());

        assert_eq!(
            catalog.require(DistrictType::Docks),
            Err(CityError::MissingDistrictConfig(DistrictType::Docks))
        );

        if let Some(c) = catalog.get_mut(DistrictType::Fields) {
            c.footprints.push(FootprintConfig::new(0, 4, 4, 1.0));
        }
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_district_config_helpers() {
        let mut c = DistrictConfig::default();
        assert!(c.needs_roads());
        c.road_density = 0.0;
        assert!(!c.needs_roads());

        c.footprints = vec![
            FootprintConfig::new(1, 8, 8, 0.2),
            FootprintConfig::new(2, 12, 30, 0.1),
        ];
        assert_eq!(c.block_size(0), 30);
        assert_eq!(c.block_size(40), 40);
    }

    #[test]
    fn test_uniform_catalog_covers_all_types() {
        let catalog = DistrictCatalog::uniform(DistrictConfig::default());
        assert_eq!(catalog.iter().count(), DistrictType::ALL.len());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = CityConfigBuilder::new()
            .seed(12345)
            .fortifications(FortificationSettings::default())
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: CityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);

        let catalog = DistrictCatalog::uniform(DistrictConfig::default());
        let json = serde_json::to_string(&catalog).unwrap();
        let restored: DistrictCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(catalog, restored);
    }
}
