//! Tour planner: picks an ordering strategy and runs it.

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::greedy::{self, GreedyOptions};
use crate::held_karp::{self, DEFAULT_MAX_NODES, Intractable};
use crate::matrix;
use crate::pruner::DEFAULT_CANDIDATES;
use crate::segment::{Coordinate, Segment, SegmentError};
use crate::tour::Tour;
use crate::traits::{DistanceOracle, OracleError, SegmentSource, TravelMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Nearest-candidate-first; bounded oracle usage, not optimal.
    #[default]
    Greedy,
    /// Full cost matrix plus Held-Karp; optimal, exponential.
    Exact,
}

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub strategy: Strategy,
    pub mode: TravelMode,
    /// Cap on visited segments. Only honored by the greedy strategy.
    pub max_segments: Option<usize>,
    /// Candidates per greedy step handed from the pruner to the oracle.
    pub candidates: usize,
    /// Node ceiling (origin included) for the exact strategy.
    pub max_exact_nodes: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Greedy,
            mode: TravelMode::Cycling,
            max_segments: None,
            candidates: DEFAULT_CANDIDATES,
            max_exact_nodes: DEFAULT_MAX_NODES,
        }
    }
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("distance oracle error")]
    Oracle(#[from] OracleError),
    #[error("input too large for the exact solver")]
    IntractableInput(#[from] Intractable),
    #[error("invalid segment")]
    Segment(#[from] SegmentError),
}

/// Orders `segments` into a closed tour starting and ending at `origin`.
///
/// Either a complete tour is returned or an error; nothing partial.
#[instrument(level = "debug", skip_all, fields(segments = segments.len(), strategy = ?options.strategy))]
pub fn plan<O>(
    origin: Coordinate,
    segments: &[Segment],
    oracle: &O,
    options: &PlanOptions,
) -> Result<Tour, PlanError>
where
    O: DistanceOracle + Sync,
{
    let tour = match options.strategy {
        Strategy::Greedy => greedy::greedy_tour(
            origin,
            segments,
            oracle,
            options.mode,
            &GreedyOptions {
                max_segments: options.max_segments,
                candidates: options.candidates,
            },
        )?,
        Strategy::Exact => {
            if options.max_segments.is_some() {
                warn!("segment cap is ignored by the exact solver");
            }
            // Refuse before paying for the matrix.
            let nodes = segments.len() + 1;
            let max_nodes = held_karp::effective_max_nodes(options.max_exact_nodes);
            if nodes > max_nodes {
                return Err(Intractable { nodes, max_nodes }.into());
            }
            let matrix = matrix::build_cost_matrix(origin, segments, oracle, options.mode)?;
            held_karp::solve(&matrix, options.max_exact_nodes)?
        }
    };

    info!(
        visited = tour.ordering().len(),
        total_cost = tour.total_cost(),
        "planned tour"
    );
    Ok(tour)
}

/// Loads every segment in `ids` order, failing on the first bad one.
pub fn load_segments<S>(source: &S, ids: &[u64]) -> Result<Vec<Segment>, PlanError>
where
    S: SegmentSource + ?Sized,
{
    ids.iter()
        .map(|&id| source.load(id).map_err(PlanError::from))
        .collect()
}
