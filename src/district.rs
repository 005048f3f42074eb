//! District types and the per-district results of a city build

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CityError;
use crate::geometry::{Rect, Segment};

/// Rough purpose of a district
///
/// Variants are declared in order of desirability: types earlier in the list
/// are placed closer to the city centre. `Empty` always sorts last.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DistrictType {
    /// Castle, fort, possibly fighting arenas
    Fortress,
    /// City hall(s), courts
    Civic,
    /// Large mansions, stately homes, fancy shops
    #[cfg_attr(feature = "serde", serde(rename = "residential-upperclass"))]
    ResidentialUpper,
    /// Major temples, shrines, festival squares
    Temple,
    /// Fountains, statues, somewhere to gather
    Square,
    /// Popup stalls, livestock, produce
    Market,
    /// Shops of all sorts
    Commercial,
    /// Greenery, trees, grass
    Park,
    /// Comfortable homes, taverns, shops
    #[cfg_attr(feature = "serde", serde(rename = "residential-middleclass"))]
    ResidentialMiddle,
    /// Universities, schools
    Research,
    Graveyard,
    /// Smaller homes, inns of dubious repute
    #[cfg_attr(feature = "serde", serde(rename = "residential-lowerclass"))]
    ResidentialLower,
    /// Where boats make port
    Docks,
    /// Homes, lean-tos, tents
    #[cfg_attr(feature = "serde", serde(rename = "residential-slum"))]
    ResidentialSlum,
    /// Smelters, tanneries, workshops
    Industrial,
    Warehouse,
    /// Barracks, training yards, target ranges
    Barracks,
    Prison,
    /// Farmland, crops, homesteads
    Fields,
    /// Mostly destroyed or deserted
    Abandoned,
    /// Nothing at all
    #[default]
    Empty,
}

impl DistrictType {
    /// Every district type, most desirable first
    pub const ALL: [DistrictType; 21] = [
        DistrictType::Fortress,
        DistrictType::Civic,
        DistrictType::ResidentialUpper,
        DistrictType::Temple,
        DistrictType::Square,
        DistrictType::Market,
        DistrictType::Commercial,
        DistrictType::Park,
        DistrictType::ResidentialMiddle,
        DistrictType::Research,
        DistrictType::Graveyard,
        DistrictType::ResidentialLower,
        DistrictType::Docks,
        DistrictType::ResidentialSlum,
        DistrictType::Industrial,
        DistrictType::Warehouse,
        DistrictType::Barracks,
        DistrictType::Prison,
        DistrictType::Fields,
        DistrictType::Abandoned,
        DistrictType::Empty,
    ];

    /// Compact numeric id (`Empty` is 0, `Fortress` 1 ... `Abandoned` 20)
    pub fn id(self) -> u8 {
        match self {
            DistrictType::Empty => 0,
            other => other as u8 + 1,
        }
    }

    /// Inverse of [`DistrictType::id`]; unknown ids map to `Empty`
    pub fn from_id(id: u8) -> Self {
        match id {
            1..=20 => Self::ALL[id as usize - 1],
            _ => DistrictType::Empty,
        }
    }

    /// Sort key placing wealthier districts first
    #[inline]
    pub fn desirability(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DistrictType::Fortress => "fortress",
            DistrictType::Civic => "civic",
            DistrictType::ResidentialUpper => "residential-upperclass",
            DistrictType::Temple => "temple",
            DistrictType::Square => "square",
            DistrictType::Market => "market",
            DistrictType::Commercial => "commercial",
            DistrictType::Park => "park",
            DistrictType::ResidentialMiddle => "residential-middleclass",
            DistrictType::Research => "research",
            DistrictType::Graveyard => "graveyard",
            DistrictType::ResidentialLower => "residential-lowerclass",
            DistrictType::Docks => "docks",
            DistrictType::ResidentialSlum => "residential-slum",
            DistrictType::Industrial => "industrial",
            DistrictType::Warehouse => "warehouse",
            DistrictType::Barracks => "barracks",
            DistrictType::Prison => "prison",
            DistrictType::Fields => "fields",
            DistrictType::Abandoned => "abandoned",
            DistrictType::Empty => "empty",
        }
    }
}

impl fmt::Display for DistrictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistrictType {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| CityError::InvalidConfig(format!("unknown district type '{}'", s)))
    }
}

/// A placed building footprint
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building {
    /// Footprint id from the district configuration
    pub id: u32,
    /// Land covered by the building
    pub area: Rect,
}

/// Part of an [`Edge`] sharing one classification
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub path: Segment,
    /// True if this stretch crosses bridgeable terrain
    pub bridge: bool,
}

/// A complete straight line (road or wall) broken into sections
///
/// An edge from a to z may hold a stretch of road, then a bridge, then more
/// road. Stretches that could not be built are absent, so sections need not
/// be contiguous.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub path: Segment,
    pub sections: Vec<Section>,
}

impl Edge {
    pub fn new(path: Segment) -> Self {
        Self {
            path,
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, path: Segment, bridge: bool) {
        self.sections.push(Section { path, bridge });
    }

    /// Sections that are bridges
    pub fn bridges(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.bridge)
    }
}

/// Terrain tallies and feature counts for a district
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistrictStats {
    pub dock_suitable: usize,
    pub buildable: usize,
    pub bridgeable: usize,
    /// Placed buildings counted by footprint id (the central building included)
    pub buildings_by_id: BTreeMap<u32, usize>,
    /// Bridges on roads internal to the district
    pub bridges: usize,
}

/// One region of the city, owning exactly one Voronoi cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    /// Same as the id of the Voronoi site
    pub id: usize,
    pub district_type: DistrictType,
    /// Voronoi site at the heart of the district
    pub site: IVec2,

    pub buildings: Vec<Building>,
    /// Building placed as close as possible to the site, if configured
    pub central: Option<Building>,

    pub stats: DistrictStats,

    /// Enclosed by the city wall
    pub has_fortifications: bool,
    /// Has a dedicated wall of its own
    pub has_curtain_fortifications: bool,

    pub roads: Vec<Edge>,
    pub walls: Vec<Edge>,
    pub towers: Vec<Rect>,
    pub gates: Vec<Rect>,
}

impl District {
    pub fn new(id: usize, site: IVec2) -> Self {
        Self {
            id,
            district_type: DistrictType::Empty,
            site,
            buildings: Vec::new(),
            central: None,
            stats: DistrictStats::default(),
            has_fortifications: false,
            has_curtain_fortifications: false,
            roads: Vec::new(),
            walls: Vec::new(),
            towers: Vec::new(),
            gates: Vec::new(),
        }
    }

    /// Record a building and count it against its footprint id
    pub(crate) fn add_building(&mut self, building: Building) {
        *self.stats.buildings_by_id.entry(building.id).or_insert(0) += 1;
        self.buildings.push(building);
    }

    pub(crate) fn set_central(&mut self, building: Building) {
        *self.stats.buildings_by_id.entry(building.id).or_insert(0) += 1;
        self.central = Some(building);
    }
}

/// City-wide statistics
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityStats {
    /// Number of districts of each type
    pub districts_by_type: BTreeMap<DistrictType, usize>,
    /// Bridges carrying main roads between districts
    pub bridges: usize,
}

impl CityStats {
    pub fn count(&self, t: DistrictType) -> usize {
        self.districts_by_type.get(&t).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, t: DistrictType) {
        *self.districts_by_type.entry(t).or_insert(0) += 1;
    }

    pub(crate) fn decrement(&mut self, t: DistrictType) {
        if let Some(n) = self.districts_by_type.get_mut(&t) {
            *n = n.saturating_sub(1);
        }
    }
}

/// Sort district types so the most desirable come first
pub fn sort_by_desirability(types: &mut [DistrictType]) {
    types.sort_by_key(|t| t.desirability());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        assert_eq!(DistrictType::Empty.id(), 0);
        assert_eq!(DistrictType::Fortress.id(), 1);
        assert_eq!(DistrictType::Abandoned.id(), 20);
        for t in DistrictType::ALL {
            assert_eq!(DistrictType::from_id(t.id()), t);
        }
        assert_eq!(DistrictType::from_id(200), DistrictType::Empty);
    }

    #[test]
    fn test_desirability_order() {
        let mut types = vec![
            DistrictType::Empty,
            DistrictType::Fields,
            DistrictType::Temple,
            DistrictType::Fortress,
            DistrictType::Docks,
        ];
        sort_by_desirability(&mut types);
        assert_eq!(
            types,
            vec![
                DistrictType::Fortress,
                DistrictType::Temple,
                DistrictType::Docks,
                DistrictType::Fields,
                DistrictType::Empty,
            ]
        );
        assert!(DistrictType::Fortress < DistrictType::Empty);
    }

    #[test]
    fn test_empty_is_least_desirable() {
        let mut types = DistrictType::ALL.to_vec();
        types.reverse();
        sort_by_desirability(&mut types);

        assert_eq!(types.last(), Some(&DistrictType::Empty));
        for t in DistrictType::ALL.iter().filter(|&&t| t != DistrictType::Empty) {
            assert!(t.desirability() < DistrictType::Empty.desirability(), "{} after empty", t);
        }
    }

    #[test]
    fn test_names_parse() {
        for t in DistrictType::ALL {
            assert_eq!(t.to_string().parse::<DistrictType>().unwrap(), t);
        }
        assert_eq!(
            "residential-slum".parse::<DistrictType>().unwrap(),
            DistrictType::ResidentialSlum
        );
        assert!("castle".parse::<DistrictType>().is_err());
    }

    #[test]
    fn test_city_stats_counts() {
        let mut stats = CityStats::default();
        stats.increment(DistrictType::Docks);
        stats.increment(DistrictType::Docks);
        stats.decrement(DistrictType::Docks);
        stats.decrement(DistrictType::Park);
        assert_eq!(stats.count(DistrictType::Docks), 1);
        assert_eq!(stats.count(DistrictType::Park), 0);
    }

    #[test]
    fn test_district_building_stats() {
        let mut d = District::new(3, IVec2::new(10, 10));
        let area = Rect::from_origin(IVec2::new(1, 1), IVec2::new(4, 4));
        d.add_building(Building { id: 2, area });
        d.add_building(Building { id: 2, area });
        d.set_central(Building { id: 5, area });
        assert_eq!(d.stats.buildings_by_id[&2], 2);
        assert_eq!(d.stats.buildings_by_id[&5], 1);
        assert_eq!(d.buildings.len(), 2);
        assert!(d.central.is_some());
    }
}
