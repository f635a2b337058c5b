//! Coordinates, segments, and the nodes the optimizers reason about.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::polyline::PolylineError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Reasons a segment is rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    NoPoints,
    SinglePoint,
    NonFiniteCoordinate,
    NonPositiveLength,
}

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("segment {id} is degenerate: {reason:?}")]
    Degenerate { id: u64, reason: Degeneracy },
    #[error("segment {id}: cache I/O error")]
    Io {
        id: u64,
        #[source]
        source: std::io::Error,
    },
    #[error("segment {id}: fetch failed")]
    Http {
        id: u64,
        #[source]
        source: reqwest::Error,
    },
    #[error("segment {id}: malformed segment JSON")]
    Json {
        id: u64,
        #[source]
        source: serde_json::Error,
    },
    #[error("segment {id}: malformed map polyline")]
    Polyline {
        id: u64,
        #[source]
        source: PolylineError,
    },
}

/// A fixed-direction sub-path with an immutable entry and exit.
///
/// `length` is the provider-reported distance in meters, independent of the
/// geometry. Construct through [`Segment::new`], which rejects degenerate
/// input.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    id: u64,
    points: Vec<Coordinate>,
    length: f64,
}

impl Segment {
    pub fn new(id: u64, points: Vec<Coordinate>, length: f64) -> Result<Self, SegmentError> {
        let reason = if points.is_empty() {
            Some(Degeneracy::NoPoints)
        } else if points.len() == 1 {
            Some(Degeneracy::SinglePoint)
        } else if !points.iter().all(Coordinate::is_finite) {
            Some(Degeneracy::NonFiniteCoordinate)
        } else if !(length.is_finite() && length > 0.0) {
            Some(Degeneracy::NonPositiveLength)
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SegmentError::Degenerate { id, reason }),
            None => Ok(Self { id, points, length }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn entry(&self) -> Coordinate {
        self.points[0]
    }

    pub fn exit(&self) -> Coordinate {
        self.points[self.points.len() - 1]
    }
}

/// Index of the origin in every node list, cost matrix, and node cycle.
pub const ORIGIN: usize = 0;

/// The unit visited by a tour: the origin or one of the segments.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Origin(Coordinate),
    Segment(&'a Segment),
}

impl Node<'_> {
    pub fn entry(&self) -> Coordinate {
        match self {
            Node::Origin(at) => *at,
            Node::Segment(segment) => segment.entry(),
        }
    }

    pub fn exit(&self) -> Coordinate {
        match self {
            Node::Origin(at) => *at,
            Node::Segment(segment) => segment.exit(),
        }
    }

    /// Traversal length; zero for the origin.
    pub fn length(&self) -> f64 {
        match self {
            Node::Origin(_) => 0.0,
            Node::Segment(segment) => segment.length(),
        }
    }
}

/// Lays out the origin at index 0 followed by the segments in input order.
pub fn nodes(origin: Coordinate, segments: &[Segment]) -> Vec<Node<'_>> {
    std::iter::once(Node::Origin(origin))
        .chain(segments.iter().map(Node::Segment))
        .collect()
}
