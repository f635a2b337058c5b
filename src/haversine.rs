//! Haversine distance oracle (fallback when no routing service is available).
//!
//! Uses great-circle distance and straight-line transit geometry.
//! Less accurate than a routing engine (ignores roads) but always available.

use crate::segment::Coordinate;
use crate::traits::{DistanceOracle, LegDistance, OracleError, TravelMode};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine-based distance oracle.
///
/// `detour_factor` scales the great-circle distance to approximate the
/// extra length of real roads; 1.0 reports the straight-line distance.
#[derive(Debug, Clone)]
pub struct HaversineOracle {
    pub detour_factor: f64,
}

impl Default for HaversineOracle {
    fn default() -> Self {
        Self { detour_factor: 1.0 }
    }
}

impl HaversineOracle {
    pub fn new(detour_factor: f64) -> Self {
        Self { detour_factor }
    }

    /// Great-circle distance between two points in meters.
    pub fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }
}

impl DistanceOracle for HaversineOracle {
    fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        _mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError> {
        Ok(destinations
            .iter()
            .map(|to| LegDistance::Meters(Self::haversine_m(origin, *to) * self.detour_factor))
            .collect())
    }

    fn path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        _mode: TravelMode,
    ) -> Result<Vec<Coordinate>, OracleError> {
        Ok(vec![origin, destination])
    }
}
