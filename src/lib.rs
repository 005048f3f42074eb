//! Voronoi-based city layout generation
//!
//! A standalone library for laying out orthogonal (top-down) city maps:
//! districts, main and minor roads, bridges, city and curtain walls with
//! towers and gatehouses, and rectangular building footprints. The terrain
//! is supplied by the caller through the [`Outline`] trait.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_voronoi_city::*;
//!
//! // A coastline along the top of the map with a river running inland
//! let outline = BandOutline::new(50).with_river(495, 505);
//!
//! let config = CityConfigBuilder::new()
//!     .seed(42)
//!     .desired_districts(100)
//!     .fortifications(FortificationSettings::default()).unwrap()
//!     .build().unwrap();
//! let catalog = DistrictCatalog::uniform(DistrictConfig::default());
//!
//! let city = City::generate(&catalog, config, &outline).unwrap();
//! println!("{} districts, {} bridges", city.districts().len(), city.stats().bridges);
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization for configuration and generated cities

// Modules
pub mod error;
pub mod config;
pub mod district;
pub mod outline;
pub mod geometry;
pub mod spatial;
pub mod voronoi;
pub mod citymap;
pub mod classify;
pub mod fortify;
pub mod footprint;
pub mod city;

// Re-export core types for convenience
pub use error::{CityError, Result};
pub use config::{
    CityConfig, CityConfigBuilder, DistrictCatalog, DistrictConfig, DistrictSite,
    FootprintConfig, FortificationSettings,
};
pub use district::{Building, CityStats, District, DistrictStats, DistrictType, Edge, Section};
pub use outline::{BandOutline, Outline};
pub use geometry::{EdgeKey, Polygon, Rect, Segment};
pub use spatial::CoordIndex;
pub use voronoi::{circuit, Cell, Neighbour, SiteBuilder, VoronoiIndex};
pub use citymap::{SpatialMap, Stroke, Structures};
pub use classify::{classify, Classified, Run, RunKind};
pub use fortify::{place_gate, GatePlacement, Towers};
pub use footprint::FootprintChooser;
pub use city::City;

// Re-export glam::IVec2 for convenience
pub use glam::IVec2;
