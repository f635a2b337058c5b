//! Nearest-candidate-first tour construction.
//!
//! From the current position, shortlist the closest unvisited segments with
//! the flat-plane pruner, ask the oracle for their real travel distance, and
//! ride to the nearest one. Repeat from its exit. This is the classic
//! nearest-neighbor approximation and is not optimal, but it needs only one
//! oracle call of at most `candidates` destinations per step.

use tracing::{debug, instrument};

use crate::pruner::{self, DEFAULT_CANDIDATES};
use crate::segment::{Coordinate, Segment};
use crate::tour::Tour;
use crate::traits::{DistanceOracle, OracleError, TravelMode, resolved_distances};

#[derive(Debug, Clone)]
pub struct GreedyOptions {
    /// Stop after this many segments. `None` visits all of them.
    pub max_segments: Option<usize>,
    /// Candidates per step handed from the pruner to the oracle.
    pub candidates: usize,
}

impl Default for GreedyOptions {
    fn default() -> Self {
        Self {
            max_segments: None,
            candidates: DEFAULT_CANDIDATES,
        }
    }
}

/// Builds a tour greedily, starting and ending at `origin`.
///
/// The reported cost sums the real distance of each chosen hop, the chosen
/// segments' lengths, and the return leg from the last exit to `origin`.
#[instrument(level = "debug", skip_all, fields(segments = segments.len()))]
pub fn greedy_tour<O>(
    origin: Coordinate,
    segments: &[Segment],
    oracle: &O,
    mode: TravelMode,
    options: &GreedyOptions,
) -> Result<Tour, OracleError>
where
    O: DistanceOracle + ?Sized,
{
    let limit = options.max_segments.unwrap_or(segments.len()).min(segments.len());
    let candidates = options.candidates.max(1);

    let mut visited = vec![false; segments.len()];
    let mut ordering = Vec::with_capacity(limit);
    let mut position = origin;
    let mut total_cost = 0.0;

    while ordering.len() < limit {
        let remaining = segments
            .iter()
            .enumerate()
            .filter(|(index, _)| !visited[*index])
            .map(|(index, segment)| (index, segment.entry()));
        let shortlist = pruner::shortlist(position, remaining, candidates);
        let entries = shortlist.iter().map(|c| c.entry).collect::<Vec<_>>();
        let distances = resolved_distances(oracle, position, &entries, mode)?;

        // Strict comparison keeps the pruner's order on ties.
        let mut best = 0;
        for (slot, distance) in distances.iter().enumerate().skip(1) {
            if *distance < distances[best] {
                best = slot;
            }
        }

        let chosen = shortlist[best].index;
        let segment = &segments[chosen];
        debug!(
            step = ordering.len(),
            segment = segment.id(),
            distance = distances[best],
            "chose next segment"
        );

        total_cost += distances[best] + segment.length();
        visited[chosen] = true;
        ordering.push(chosen);
        position = segment.exit();
    }

    if !ordering.is_empty() {
        total_cost += resolved_distances(oracle, position, &[origin], mode)?[0];
    }

    Ok(Tour::new(ordering, total_cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LegDistance;
    use std::sync::Mutex;

    /// Flat-plane distances, recording the size of every batch.
    struct Recording {
        batches: Mutex<Vec<usize>>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    impl DistanceOracle for Recording {
        fn batch_distance(
            &self,
            origin: Coordinate,
            destinations: &[Coordinate],
            _mode: TravelMode,
        ) -> Result<Vec<LegDistance>, OracleError> {
            self.batches.lock().unwrap().push(destinations.len());
            Ok(destinations
                .iter()
                .map(|d| LegDistance::Meters(pruner::flat_estimate(origin, *d)))
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

    fn line_segments(count: usize) -> Vec<Segment> {
        // Segments laid end to end along the equator, listed out of order.
        (0..count)
            .rev()
            .map(|i| {
                let start = i as f64 * 2.0 + 1.0;
                Segment::new(
                    i as u64,
                    vec![Coordinate::new(0.0, start), Coordinate::new(0.0, start + 1.0)],
                    1.0,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_visits_nearest_first() {
        let segments = line_segments(4);
        let oracle = Recording::new();
        let tour = greedy_tour(
            Coordinate::new(0.0, 0.0),
            &segments,
            &oracle,
            TravelMode::Cycling,
            &GreedyOptions::default(),
        )
        .unwrap();

        // Input index 3 holds the segment closest to the origin.
        assert_eq!(tour.ordering(), &[3, 2, 1, 0]);
        // Four 1-unit hops, four 1-unit segments, 8-unit return.
        assert!((tour.total_cost() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_batches_are_bounded() {
        let segments = line_segments(25);
        let oracle = Recording::new();
        let options = GreedyOptions {
            max_segments: None,
            candidates: 10,
        };
        greedy_tour(Coordinate::new(0.0, 0.0), &segments, &oracle, TravelMode::Cycling, &options)
            .unwrap();

        let batches = oracle.batches.lock().unwrap();
        // One call per step plus the return leg.
        assert_eq!(batches.len(), 26);
        assert!(batches.iter().all(|&size| size <= 10));
    }

    #[test]
    fn test_cap_zero_and_empty_input() {
        let oracle = Recording::new();
        let options = GreedyOptions {
            max_segments: Some(0),
            ..GreedyOptions::default()
        };
        let tour = greedy_tour(
            Coordinate::new(0.0, 0.0),
            &line_segments(3),
            &oracle,
            TravelMode::Cycling,
            &options,
        )
        .unwrap();
        assert!(tour.ordering().is_empty());
        assert_eq!(tour.total_cost(), 0.0);

        let tour = greedy_tour(
            Coordinate::new(0.0, 0.0),
            &[],
            &oracle,
            TravelMode::Cycling,
            &GreedyOptions::default(),
        )
        .unwrap();
        assert!(tour.ordering().is_empty());
        assert!(oracle.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_real_distance_overrides_estimate() {
        // Segment 0 looks closer on the flat plane, but the oracle says
        // segment 1 is cheaper to reach.
        struct Detour;

        impl DistanceOracle for Detour {
            fn batch_distance(
                &self,
                _origin: Coordinate,
                destinations: &[Coordinate],
                _mode: TravelMode,
            ) -> Result<Vec<LegDistance>, OracleError> {
                Ok(destinations
                    .iter()
                    .map(|d| LegDistance::Meters(if d.lng == 1.0 { 50.0 } else { 5.0 }))
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

        let segments = vec![
            Segment::new(10, vec![Coordinate::new(0.0, 1.0), Coordinate::new(0.0, 1.5)], 1.0)
                .unwrap(),
            Segment::new(11, vec![Coordinate::new(0.0, 2.0), Coordinate::new(0.0, 2.5)], 1.0)
                .unwrap(),
        ];
        let options = GreedyOptions {
            max_segments: Some(1),
            ..GreedyOptions::default()
        };
        let tour = greedy_tour(Coordinate::new(0.0, 0.0), &segments, &Detour, TravelMode::Cycling, &options)
            .unwrap();
        assert_eq!(tour.ordering(), &[1]);
    }
}
