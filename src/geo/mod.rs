//! Geo-aware facility matching.
//!
//! Given where the user is and which kind of care they need, produce a
//! ranked list of nearby facilities: live open-geodata results when the
//! network cooperates, deterministic synthetic stand-ins when it does not.
//!
//! ## Design
//! - Trait-driven data source (`FacilityDataSource`) over the Overpass
//!   interpreter, so tests and offline builds swap the transport out
//! - Haversine distances, recomputed per search origin and never cached
//! - Best-effort specialty narrowing through synonym sets; narrowing can
//!   refine a result set but never empty one
//! - A search never fails: every failure path lands on flagged synthetic
//!   candidates

pub mod distance;
pub mod maplink;
pub mod matcher;
pub mod overpass;
pub mod specialty;

use serde::{Deserialize, Serialize};

// ── Core value types ─────────────────────────────────────────────

/// A WGS-84 coordinate pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One discovered (or synthesized) care location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityCandidate {
    /// Display name; falls back to a generic label when the source data
    /// has none.
    pub name: String,
    /// Best-effort postal address assembled from whatever fragments the
    /// source provides.
    pub address: String,
    /// Facility coordinate.
    pub location: GeoPoint,
    /// Great-circle distance from the search origin, in kilometers.
    pub distance_km: f64,
    /// Pre-rendered distance for display ("950 m", "2.4 km").
    pub distance_label: String,
    /// Free-text specialty tag from the source data, or the assigned one
    /// for synthetic candidates.
    pub specialty_tag: String,
    /// Source-provided rating, when available.
    pub rating: Option<f32>,
    /// Whether the facility is currently open, when the source knows.
    pub is_open: Option<bool>,
    /// True when this candidate was synthesized rather than discovered.
    pub is_synthetic: bool,
}

pub use matcher::{FacilitySearch, GeoFacilityMatcher};
pub use overpass::{FacilityDataSource, OverpassClient};
pub use specialty::SpecialtyQuery;
