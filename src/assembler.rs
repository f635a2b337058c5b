//! Expands a segment ordering into one continuous track.

use tracing::{debug, instrument};

use crate::segment::{Coordinate, Segment};
use crate::traits::{DistanceOracle, OracleError, TravelMode};

/// Stitches transit paths and segment geometry into a closed track.
///
/// The track starts at `origin`, optionally rides to `via` first, then for
/// each segment in `ordering` follows the oracle's path from the last point
/// to the segment entry and the segment's own geometry, and finally returns
/// to `origin`.
#[instrument(level = "debug", skip_all, fields(segments = ordering.len()))]
pub fn assemble_track<O>(
    origin: Coordinate,
    via: Option<Coordinate>,
    segments: &[Segment],
    ordering: &[usize],
    oracle: &O,
    mode: TravelMode,
) -> Result<Vec<Coordinate>, OracleError>
where
    O: DistanceOracle + ?Sized,
{
    let mut track = vec![origin];

    if let Some(via) = via {
        track.extend(oracle.path(origin, via, mode)?);
    }

    for &index in ordering {
        let segment = &segments[index];
        let from = last_point(&track);
        track.extend(oracle.path(from, segment.entry(), mode)?);
        track.extend_from_slice(segment.points());
    }

    let from = last_point(&track);
    track.extend(oracle.path(from, origin, mode)?);
    debug!(points = track.len(), "assembled track");

    Ok(track)
}

fn last_point(track: &[Coordinate]) -> Coordinate {
    // The track always starts with the origin.
    track[track.len() - 1]
}
