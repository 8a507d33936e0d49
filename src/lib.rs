//! SA-TSP Solver Library
//!
//! Approximate solutions to the Euclidean Traveling Salesman Problem with
//! simulated annealing.
//!
//! # Features
//!
//! - City loading from `<id> <x> <y>` text files (TSPLIB coordinate sections load as-is)
//! - Random permutation construction
//! - Simulated annealing with geometric cooling and swap moves
//! - Reproducible runs from explicit seeds
//! - Multi-start restarts, sequential or parallel, with CSV export
//! - SVG visualization
//!
//! # Example
//!
//! ```no_run
//! use sa_tsp_solver::instance::TspInstance;
//! use sa_tsp_solver::heuristics::annealing::{AnnealingConfig, AnnealingEngine};
//!
//! let instance = TspInstance::from_file("xqf131.tsp").unwrap();
//!
//! let config = AnnealingConfig::default().with_seed(7);
//! let result = AnnealingEngine::new(&instance, config).unwrap().run();
//!
//! println!("Solution cost: {:.2}", result.best_cost);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod restarts;
pub mod visualization;

pub use error::{Result, SolverError};
pub use instance::{City, TspInstance};
pub use solution::Solution;
