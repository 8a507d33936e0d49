//! Solution representation and moves for the TSP.
//!
//! A solution is a cyclic tour over city indices together with its cost and
//! the bookkeeping of the run that produced it.

use crate::error::Result;
use crate::instance::TspInstance;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Represents a solution to the TSP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of zero-based city indices (cyclic)
    pub tour: Vec<usize>,
    /// Total tour length
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Seed of the random generator that produced the tour
    pub seed: Option<u64>,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
    /// Number of accepted moves (if applicable)
    pub accepted_moves: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: f64::INFINITY,
            algorithm: String::new(),
            seed: None,
            computation_time: 0.0,
            iterations: None,
            accepted_moves: None,
        }
    }

    /// Create a solution from a tour
    pub fn from_tour(instance: &TspInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_cost(&tour);

        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            ..Self::new()
        }
    }

    /// Check if all cities are visited exactly once
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        instance.check_tour(&self.tour).is_ok()
    }

    /// Write the plain-text report: cost line followed by the visiting order
    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Final achieved cost: {}", self.cost)?;
        let order: Vec<String> = self.tour.iter().map(|c| c.to_string()).collect();
        writeln!(out, "Solution: {}", order.join(" "))
    }

    /// Save as pretty-printed JSON
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json).map_err(|e| {
            crate::error::SolverError::export(format!("{}: {}", path.as_ref().display(), e))
        })
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        if let Some(seed) = self.seed {
            writeln!(f, "  Seed: {}", seed)?;
        }
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        if let Some(accepted) = self.accepted_moves {
            writeln!(f, "  Accepted moves: {}", accepted)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

/// Exchange of the cities at two tour positions.
///
/// Positions are drawn with replacement, so `i == j` is possible and leaves
/// the tour unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapMove {
    pub i: usize,
    pub j: usize,
}

impl SwapMove {
    /// Draw two positions uniformly from `0..n`. `n` must be non-zero.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        SwapMove { i, j }
    }

    /// Apply to a copy of `tour`; the input is left untouched
    pub fn apply_to(&self, tour: &[usize]) -> Vec<usize> {
        let mut neighbor = tour.to_vec();
        neighbor.swap(self.i, self.j);
        neighbor
    }
}

/// Produce a neighbor of `tour` by swapping two uniformly chosen positions.
///
/// `tour` must be non-empty.
pub fn neighbor<R: Rng + ?Sized>(tour: &[usize], rng: &mut R) -> Vec<usize> {
    SwapMove::random(tour.len(), rng).apply_to(tour)
}
