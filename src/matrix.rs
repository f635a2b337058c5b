//! Directed cost matrix between the origin and the segments.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::segment::{self, Coordinate, ORIGIN, Segment};
use crate::traits::{DistanceOracle, OracleError, TravelMode, resolved_distances};

/// A dense n×n cost matrix stored in row-major order.
///
/// `get(i, j)` is the cost of leaving node `i` from its exit, travelling to
/// the entry of node `j`, and traversing `j`. The diagonal is unused and
/// stored as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    data: Vec<f64>,
    size: usize,
}

impl CostMatrix {
    /// Creates a matrix from explicit rows.
    ///
    /// Returns `None` unless the rows form a square table of finite,
    /// non-negative costs. Diagonal entries are ignored.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return None;
            }
            for (j, cost) in row.into_iter().enumerate() {
                if i == j {
                    data.push(0.0);
                } else if cost.is_finite() && cost >= 0.0 {
                    data.push(cost);
                } else {
                    return None;
                }
            }
        }
        Some(Self { data, size })
    }

    /// Number of nodes, origin included.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Cost of the closed tour origin → `ordering` → origin.
    ///
    /// `ordering` holds segment indices; segment `i` is node `i + 1`.
    pub fn tour_cost(&self, ordering: &[usize]) -> f64 {
        let mut cost = 0.0;
        let mut at = ORIGIN;
        for &segment in ordering {
            cost += self.get(at, segment + 1);
            at = segment + 1;
        }
        cost + self.get(at, ORIGIN)
    }
}

/// Builds the cost matrix for `origin` followed by `segments`.
///
/// Issues exactly one oracle call per row, from the row node's exit to the
/// entries of every other node. Rows are independent and resolved in
/// parallel; any failed row fails the whole build and nothing is returned.
#[instrument(level = "debug", skip_all, fields(segments = segments.len()))]
pub fn build_cost_matrix<O>(
    origin: Coordinate,
    segments: &[Segment],
    oracle: &O,
    mode: TravelMode,
) -> Result<CostMatrix, OracleError>
where
    O: DistanceOracle + Sync,
{
    let nodes = segment::nodes(origin, segments);
    let size = nodes.len();

    let rows = (0..size)
        .into_par_iter()
        .map(|i| -> Result<Vec<f64>, OracleError> {
            let destinations = nodes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, node)| node.entry())
                .collect::<Vec<_>>();
            let distances = resolved_distances(oracle, nodes[i].exit(), &destinations, mode)?;
            debug!(row = i, destinations = destinations.len(), "resolved cost matrix row");

            let mut row = Vec::with_capacity(size);
            for (j, node) in nodes.iter().enumerate() {
                if j == i {
                    row.push(0.0);
                    continue;
                }
                let column = if j > i { j - 1 } else { j };
                row.push(distances[column] + node.length());
            }
            Ok(row)
        })
        .collect::<Result<Vec<Vec<f64>>, OracleError>>()?;

    Ok(CostMatrix {
        data: rows.into_iter().flatten().collect(),
        size,
    })
}
