//! Collaborator interfaces for the tour planner.
//!
//! The ordering engine only talks to the outside world through these traits:
//! a distance oracle for travel costs and transit geometry, a segment source
//! for segment geometry and length, and a track sink for the final output.

use thiserror::Error;

use crate::polyline::PolylineError;
use crate::segment::{Coordinate, Segment, SegmentError};

/// How the route will be travelled; selects the oracle's routing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    Driving,
    Walking,
    #[default]
    Cycling,
}

impl TravelMode {
    /// OSRM profile name.
    pub fn osrm_profile(self) -> &'static str {
        match self {
            TravelMode::Driving => "car",
            TravelMode::Walking => "foot",
            TravelMode::Cycling => "bike",
        }
    }

    /// Google Maps `mode` parameter.
    pub fn google_mode(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "bicycling",
        }
    }
}

/// Outcome of a single origin-destination lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LegDistance {
    /// Travel distance in meters.
    Meters(f64),
    /// The provider could not route this pair.
    Failed { status: String },
}

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle request failed")]
    Http(#[from] reqwest::Error),
    #[error("oracle responded with status {status}: {message}")]
    Provider { status: String, message: String },
    #[error("oracle returned {actual} distances for {expected} destinations")]
    Misaligned { expected: usize, actual: usize },
    #[error("oracle could not route to destination {destination}: {status}")]
    LegFailed { destination: usize, status: String },
    #[error("oracle returned invalid distance {distance} for destination {destination}")]
    InvalidDistance { destination: usize, distance: f64 },
    #[error("oracle returned no path")]
    NoPath,
    #[error("oracle returned malformed path geometry")]
    Geometry(#[from] PolylineError),
}

/// Travel distance and transit geometry between coordinates.
///
/// `batch_distance` answers one origin against many destinations and must
/// return exactly one entry per destination, in input order. Provider pair
/// limits are the implementation's concern: callers issue a single call per
/// origin.
pub trait DistanceOracle {
    fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError>;

    /// Transit geometry from `origin` to `destination`, both included when
    /// the provider snaps to them.
    fn path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Vec<Coordinate>, OracleError>;
}

/// Queries `oracle` and insists on one finite, non-negative distance per
/// destination.
///
/// A short response, a failed leg, or a nonsensical distance is an error; it
/// is never turned into a zero or infinite cost.
pub fn resolved_distances<O>(
    oracle: &O,
    origin: Coordinate,
    destinations: &[Coordinate],
    mode: TravelMode,
) -> Result<Vec<f64>, OracleError>
where
    O: DistanceOracle + ?Sized,
{
    let legs = oracle.batch_distance(origin, destinations, mode)?;
    if legs.len() != destinations.len() {
        return Err(OracleError::Misaligned {
            expected: destinations.len(),
            actual: legs.len(),
        });
    }

    legs.into_iter()
        .enumerate()
        .map(|(destination, leg)| match leg {
            LegDistance::Meters(distance) if distance.is_finite() && distance >= 0.0 => {
                Ok(distance)
            }
            LegDistance::Meters(distance) => Err(OracleError::InvalidDistance {
                destination,
                distance,
            }),
            LegDistance::Failed { status } => Err(OracleError::LegFailed {
                destination,
                status,
            }),
        })
        .collect()
}

/// Provides validated segments by identifier.
pub trait SegmentSource {
    fn load(&self, id: u64) -> Result<Segment, SegmentError>;
}

/// Persists an assembled track.
pub trait TrackSink {
    fn write_track(&mut self, name: &str, points: &[Coordinate]) -> std::io::Result<()>;
}
