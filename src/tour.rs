//! The result both optimizers produce.

use crate::segment::ORIGIN;

/// A closed tour through the origin, as an ordering of segment indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    ordering: Vec<usize>,
    total_cost: f64,
}

impl Tour {
    pub fn new(ordering: Vec<usize>, total_cost: f64) -> Self {
        Self {
            ordering,
            total_cost,
        }
    }

    /// Segment indices in visiting order, origin excluded.
    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }

    /// Sum of edge costs including the return leg to the origin.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Node indices of the cycle, starting and ending at the origin.
    pub fn node_cycle(&self) -> Vec<usize> {
        std::iter::once(ORIGIN)
            .chain(self.ordering.iter().map(|segment| segment + 1))
            .chain(std::iter::once(ORIGIN))
            .collect()
    }
}
