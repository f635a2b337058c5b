//! Exact tour ordering via the Held-Karp dynamic program.
//!
//! State is `(visited, last)`, where `visited` is a bitmask over the segment
//! nodes (the origin is implicit) and `last` is the segment the partial tour
//! currently ends on. Bit `j` of the mask stands for node `j + 1`.
//!
//! ```text
//! dp[{j}][j] = cost(0, j)
//! dp[S][j]   = min over k in S \ {j} of dp[S \ {j}][k] + cost(k, j)
//! best       = min over j of dp[full][j] + cost(j, 0)
//! ```
//!
//! Time is O(N² · 2^(N-1)) and memory O(N · 2^(N-1)), so the node count is
//! capped and checked before anything is allocated.
//!
//! Tables are flat buffers indexed by `mask * m + j` for `m` segments.
//! Iteration is deterministic: masks ascending, `j` ascending, while the
//! predecessor `k` and the closing node are scanned from the highest index
//! down. A candidate only replaces the incumbent when strictly cheaper, so
//! among equal-cost tours the first one found wins, and ties come out
//! visiting lower indices first.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::matrix::CostMatrix;
use crate::segment::ORIGIN;
use crate::tour::Tour;

/// Default node ceiling (origin included).
pub const DEFAULT_MAX_NODES: usize = 20;

/// Ceiling that no configuration can raise. At 22 nodes the tables take
/// about 400 MB (2^21 masks × 21 slots × 9 bytes); each extra node more
/// than doubles that.
pub const HARD_MAX_NODES: usize = 22;

const NO_PARENT: u8 = u8::MAX;

/// The matrix has more nodes than the solver is allowed to handle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{nodes} nodes exceed the exact solver ceiling of {max_nodes}")]
pub struct Intractable {
    pub nodes: usize,
    pub max_nodes: usize,
}

/// Node ceiling actually enforced for a configured `max_nodes`.
pub fn effective_max_nodes(max_nodes: usize) -> usize {
    max_nodes.min(HARD_MAX_NODES)
}

/// Finds a minimum-cost closed tour through every node of `matrix`.
#[instrument(level = "debug", skip_all, fields(nodes = matrix.size()))]
pub fn solve(matrix: &CostMatrix, max_nodes: usize) -> Result<Tour, Intractable> {
    let nodes = matrix.size();
    let max_nodes = effective_max_nodes(max_nodes);
    if nodes > max_nodes {
        return Err(Intractable { nodes, max_nodes });
    }

    let m = nodes.saturating_sub(1);
    if m == 0 {
        return Ok(Tour::new(Vec::new(), 0.0));
    }

    let full = (1usize << m) - 1;
    let mut dp = vec![f64::INFINITY; (full + 1) * m];
    let mut parent = vec![NO_PARENT; (full + 1) * m];

    for j in 0..m {
        dp[(1 << j) * m + j] = matrix.get(ORIGIN, j + 1);
    }

    for mask in 1..=full {
        if mask.count_ones() < 2 {
            continue;
        }
        for j in 0..m {
            if mask & (1 << j) == 0 {
                continue;
            }
            let prev = mask ^ (1 << j);
            let slot = mask * m + j;
            for k in (0..m).rev() {
                if prev & (1 << k) == 0 {
                    continue;
                }
                let candidate = dp[prev * m + k] + matrix.get(k + 1, j + 1);
                if candidate < dp[slot] {
                    dp[slot] = candidate;
                    parent[slot] = k as u8;
                }
            }
        }
    }

    let mut last = m - 1;
    let mut best = f64::INFINITY;
    for j in (0..m).rev() {
        let candidate = dp[full * m + j] + matrix.get(j + 1, ORIGIN);
        if candidate < best {
            best = candidate;
            last = j;
        }
    }

    let mut ordering = Vec::with_capacity(m);
    let mut mask = full;
    let mut at = last;
    loop {
        ordering.push(at);
        let previous = parent[mask * m + at];
        mask ^= 1 << at;
        if previous == NO_PARENT {
            break;
        }
        at = usize::from(previous);
    }
    ordering.reverse();
    debug_assert_eq!(ordering.len(), m);
    debug!(cost = best, "found optimal tour");

    Ok(Tour::new(ordering, best))
}
