//! Test fixtures for segment-tour.
//!
//! Provides:
//! - A scripted distance oracle with call accounting and failure injection
//! - Segment builders for hand-made layouts

#![allow(dead_code)]

use std::sync::Mutex;

use segment_tour::segment::{Coordinate, Segment};
use segment_tour::traits::{DistanceOracle, LegDistance, OracleError, TravelMode};

/// How the stub prices a single origin-destination pair.
#[derive(Debug, Clone, Copy)]
pub enum Pricing {
    /// `sqrt(dlat² + dlng²)` in raw degrees.
    Euclidean,
    /// Every pair costs the same.
    Uniform(f64),
    /// Zero distance everywhere.
    Zero,
}

/// Deterministic oracle for tests.
pub struct StubOracle {
    pricing: Pricing,
    /// Drop the last result of any batch issued from this origin.
    short_from: Option<Coordinate>,
    calls: Mutex<Vec<(Coordinate, usize)>>,
}

impl StubOracle {
    pub fn new(pricing: Pricing) -> Self {
        Self {
            pricing,
            short_from: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn short_from(mut self, origin: Coordinate) -> Self {
        self.short_from = Some(origin);
        self
    }

    /// `(origin, destination count)` for every batch call so far.
    pub fn calls(&self) -> Vec<(Coordinate, usize)> {
        self.calls.lock().unwrap().clone()
    }

    fn price(&self, from: Coordinate, to: Coordinate) -> f64 {
        match self.pricing {
            Pricing::Euclidean => ((from.lat - to.lat).powi(2) + (from.lng - to.lng).powi(2)).sqrt(),
            Pricing::Uniform(distance) => distance,
            Pricing::Zero => 0.0,
        }
    }
}

impl DistanceOracle for StubOracle {
    fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        _mode: TravelMode,
    ) -> Result<Vec<LegDistance>, OracleError> {
        self.calls.lock().unwrap().push((origin, destinations.len()));
        let mut legs = destinations
            .iter()
            .map(|to| LegDistance::Meters(self.price(origin, *to)))
            .collect::<Vec<_>>();
        if self.short_from == Some(origin) {
            legs.pop();
        }
        Ok(legs)
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

pub fn c(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng)
}

/// A straight two-point segment.
pub fn segment(id: u64, entry: (f64, f64), exit: (f64, f64), length: f64) -> Segment {
    Segment::new(id, vec![entry.into(), exit.into()], length).unwrap()
}

/// `count` scattered segments from a fixed seed, each a short hop in a
/// pseudo-random direction.
pub fn scattered_segments(count: usize, seed: u64) -> Vec<Segment> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % 10_000) as f64 / 1_000.0
    };

    (0..count)
        .map(|i| {
            let entry = (next(), next());
            let exit = (entry.0 + next() / 10.0, entry.1 + next() / 10.0);
            segment(i as u64, entry, exit, 0.5 + next() / 10.0)
        })
        .collect()
}
