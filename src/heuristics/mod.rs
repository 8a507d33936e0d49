//! Heuristics module for the TSP.
//!
//! This module exports the random tour construction and the simulated
//! annealing improvement heuristic.

pub mod construction;
pub mod annealing;

pub use construction::*;
pub use annealing::*;
