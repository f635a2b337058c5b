//! Polyline representation for route and segment geometries.
//!
//! Geometry crosses the boundary in the compact encoded polyline format
//! (Strava segment maps, OSRM `geometries=polyline`, Google overview
//! polylines). It is decoded here once and handled as plain coordinates
//! everywhere else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::segment::Coordinate;

/// Coordinate scale of the standard (precision 5) encoding.
const PRECISION: f64 = 1e5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    #[error("invalid polyline character {found:?} at byte {position}")]
    InvalidCharacter { found: char, position: usize },
    #[error("polyline ends in the middle of a value")]
    Truncated,
}

/// A polyline representing a geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes a precision 5 encoded polyline.
    ///
    /// An empty string decodes to an empty polyline.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        let bytes = encoded.as_bytes();
        let mut position = 0;
        let mut lat = 0i64;
        let mut lng = 0i64;
        let mut points = Vec::new();

        while position < bytes.len() {
            lat += next_value(bytes, &mut position)?;
            lng += next_value(bytes, &mut position)?;
            points.push(Coordinate::new(
                lat as f64 / PRECISION,
                lng as f64 / PRECISION,
            ));
        }

        Ok(Self { points })
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }
}

/// Reads one zig-zag, 5-bit chunked delta starting at `position`.
fn next_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::Truncated);
        };
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(PolylineError::InvalidCharacter {
                found: byte as char,
                position: *position,
            });
        }
        *position += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
