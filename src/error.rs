//! Error types for city generation

use thiserror::Error;

use crate::district::DistrictType;

/// Errors that abort a city build
///
/// Every variant is terminal: no partial city is returned. Local geometric
/// failures (a gate that does not fit, a footprint that collides) are not
/// errors and are absorbed by trying the next candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CityError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A Voronoi index was requested with no sites
    #[error("voronoi index requires at least one site")]
    NoSites,

    /// Fewer district sites could be placed than the per-type minimums require
    #[error("failed to place full number of desired districts: placed {placed} of {required}")]
    CannotMeetDesiredDistricts {
        /// Sites that were accepted
        placed: usize,
        /// Sites required to satisfy every minimum
        required: usize,
    },

    /// A district has a type with no entry in the catalog
    #[error("no district configuration for type {0}")]
    MissingDistrictConfig(DistrictType),

    /// Every district type has reached its maximum (or has zero probability)
    #[error("no district type is eligible for assignment")]
    NoEligibleDistrictType,

    /// A docks district lacks dock-suitable land and cannot be swapped or retyped
    #[error("unable to find place for docks district {0}")]
    UnresolvableDocks(usize),

    /// A footprint with a per-district minimum could not be placed enough times
    #[error("district {district} could not fit {remaining} required building(s) with footprint {footprint}")]
    BuildingMinimumUnmet {
        /// District id
        district: usize,
        /// Footprint id
        footprint: u32,
        /// Placements still owed
        remaining: usize,
    },

    /// Requested cell ID does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
}

/// Result type alias for city operations
pub type Result<T> = std::result::Result<T, CityError>;
