//! Cheap pre-filter in front of the distance oracle.
//!
//! The estimate is a flat-plane distance in raw degrees. It ignores both the
//! curvature of the earth and the road network, and only ranks candidates so
//! the oracle is asked about a bounded handful of them.

use crate::segment::Coordinate;

/// Default number of candidates passed on to the oracle.
pub const DEFAULT_CANDIDATES: usize = 10;

/// A shortlisted node with its flat-plane estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub entry: Coordinate,
    pub estimate: f64,
}

/// `sqrt(dlat² + dlng²)` in degrees.
pub fn flat_estimate(from: Coordinate, to: Coordinate) -> f64 {
    ((from.lat - to.lat).powi(2) + (from.lng - to.lng).powi(2)).sqrt()
}

/// Keeps the `limit` candidates whose entry is closest to `position`.
///
/// Candidates are `(index, entry)` pairs. The sort is stable, so equal
/// estimates keep their input order; callers feed indices in ascending
/// order to get an index tie-break.
pub fn shortlist<I>(position: Coordinate, candidates: I, limit: usize) -> Vec<Candidate>
where
    I: IntoIterator<Item = (usize, Coordinate)>,
{
    let mut ranked = candidates
        .into_iter()
        .map(|(index, entry)| Candidate {
            index,
            entry,
            estimate: flat_estimate(position, entry),
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| a.estimate.total_cmp(&b.estimate));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(candidates: &[Candidate]) -> Vec<usize> {
        candidates.iter().map(|c| c.index).collect()
    }

    #[test]
    fn test_flat_estimate() {
        let d = flat_estimate(Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_keeps_closest_in_order() {
        let candidates = vec![
            (0, Coordinate::new(5.0, 0.0)),
            (1, Coordinate::new(1.0, 0.0)),
            (2, Coordinate::new(3.0, 0.0)),
            (3, Coordinate::new(2.0, 0.0)),
        ];
        let picked = shortlist(Coordinate::new(0.0, 0.0), candidates, 3);
        assert_eq!(indices(&picked), vec![1, 3, 2]);
        assert_eq!(picked[0].estimate, 1.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            (4, Coordinate::new(0.0, 1.0)),
            (7, Coordinate::new(1.0, 0.0)),
            (9, Coordinate::new(0.0, -1.0)),
        ];
        let picked = shortlist(Coordinate::new(0.0, 0.0), candidates, 2);
        assert_eq!(indices(&picked), vec![4, 7]);
    }

    #[test]
    fn test_returns_fewer_when_fewer_remain() {
        let candidates = vec![(0, Coordinate::new(1.0, 1.0)), (1, Coordinate::new(2.0, 2.0))];
        let picked = shortlist(Coordinate::new(0.0, 0.0), candidates, DEFAULT_CANDIDATES);
        assert_eq!(picked.len(), 2);
        assert!(shortlist(Coordinate::new(0.0, 0.0), Vec::new(), DEFAULT_CANDIDATES).is_empty());
    }
}
