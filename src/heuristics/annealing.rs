//! Simulated annealing for the Euclidean TSP.
//!
//! The engine runs a fixed iteration budget. Each iteration proposes a random
//! swap of two tour positions, accepts it when it is strictly better or when
//! the Metropolis test `exp((current - candidate) / T) > u` passes, keeps the
//! best tour seen so far, then cools geometrically: `T *= cooling_rate`.
//! Cooling happens every iteration whether or not the move was accepted.

use crate::error::{Result, SolverError};
use crate::heuristics::construction::random_tour;
use crate::instance::TspInstance;
use crate::solution::{neighbor, Solution};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Number of best-cost samples kept in the history (plus endpoints)
const HISTORY_SAMPLES: usize = 100;

/// Parameters of an annealing run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Starting temperature, must be positive and finite
    pub initial_temperature: f64,
    /// Multiplicative decay per iteration, in (0, 1]
    pub cooling_rate: f64,
    /// Exact number of transitions to perform
    pub max_iterations: usize,
    /// Seed for the run's generator; drawn from OS entropy when absent
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        AnnealingConfig {
            initial_temperature: 10_000.0,
            cooling_rate: 0.999,
            max_iterations: 10_000,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(SolverError::invalid_input(format!(
                "initial temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate <= 1.0) {
            return Err(SolverError::invalid_input(format!(
                "cooling rate must lie in (0, 1], got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }
}

/// Observable state of the annealing state machine
#[derive(Debug, Clone)]
pub struct AnnealingState {
    pub temperature: f64,
    pub current_tour: Vec<usize>,
    pub current_cost: f64,
    pub best_tour: Vec<usize>,
    pub best_cost: f64,
    /// Transitions performed so far
    pub iteration: usize,
}

/// How a proposed move was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Strictly cheaper than the current tour
    Improving,
    /// Not cheaper, let through by the Metropolis test
    Metropolis,
    Rejected,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingResult {
    pub best_tour: Vec<usize>,
    pub best_cost: f64,
    /// Seed actually used, so an unseeded run can be replayed
    pub seed: u64,
    pub iterations: usize,
    pub final_temperature: f64,
    pub accepted_moves: usize,
    pub improving_moves: usize,
    /// Iteration at which the best tour was last improved (0 = initial tour)
    pub best_iteration: usize,
    /// Best cost sampled at regular intervals
    pub cost_history: Vec<f64>,
    /// Wall time in seconds
    pub elapsed: f64,
}

impl AnnealingResult {
    pub fn into_solution(self) -> Solution {
        Solution {
            tour: self.best_tour,
            cost: self.best_cost,
            algorithm: "SimulatedAnnealing".to_string(),
            seed: Some(self.seed),
            computation_time: self.elapsed,
            iterations: Some(self.iterations),
            accepted_moves: Some(self.accepted_moves),
        }
    }
}

/// The annealing state machine over one instance.
///
/// Owns its random generator; the instance is only borrowed, so any number of
/// engines can share one instance across threads.
pub struct AnnealingEngine<'a> {
    instance: &'a TspInstance,
    config: AnnealingConfig,
    seed: u64,
    rng: ChaCha8Rng,
    state: AnnealingState,
    accepted_moves: usize,
    improving_moves: usize,
    best_iteration: usize,
    history_interval: usize,
    cost_history: Vec<f64>,
}

impl<'a> AnnealingEngine<'a> {
    /// Start from a random permutation drawn from the engine's own generator
    pub fn new(instance: &'a TspInstance, config: AnnealingConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tour = random_tour(instance.len(), &mut rng)?;
        Ok(Self::from_parts(instance, config, seed, rng, tour))
    }

    /// Start from a caller-supplied tour, validated against the instance
    pub fn with_initial_tour(
        instance: &'a TspInstance,
        config: AnnealingConfig,
        tour: Vec<usize>,
    ) -> Result<Self> {
        config.validate()?;
        if instance.is_empty() {
            return Err(SolverError::invalid_input("cannot anneal an empty city set"));
        }
        instance.check_tour(&tour)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self::from_parts(instance, config, seed, rng, tour))
    }

    fn from_parts(
        instance: &'a TspInstance,
        config: AnnealingConfig,
        seed: u64,
        rng: ChaCha8Rng,
        tour: Vec<usize>,
    ) -> Self {
        let cost = instance.tour_cost(&tour);
        let state = AnnealingState {
            temperature: config.initial_temperature,
            current_tour: tour.clone(),
            current_cost: cost,
            best_tour: tour,
            best_cost: cost,
            iteration: 0,
        };

        AnnealingEngine {
            instance,
            config,
            seed,
            rng,
            state,
            accepted_moves: 0,
            improving_moves: 0,
            best_iteration: 0,
            history_interval: (config.max_iterations / HISTORY_SAMPLES).max(1),
            cost_history: vec![cost],
        }
    }

    pub fn state(&self) -> &AnnealingState {
        &self.state
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_finished(&self) -> bool {
        self.state.iteration >= self.config.max_iterations
    }

    /// Perform one transition: propose, decide, track the best, cool.
    ///
    /// Returns `None` without touching the state once the budget is spent.
    pub fn step(&mut self) -> Option<Acceptance> {
        if self.is_finished() {
            return None;
        }

        let candidate = neighbor(&self.state.current_tour, &mut self.rng);
        let candidate_cost = self.instance.tour_cost(&candidate);

        let acceptance = if candidate_cost < self.state.current_cost {
            Acceptance::Improving
        } else {
            let threshold =
                ((self.state.current_cost - candidate_cost) / self.state.temperature).exp();
            if threshold > self.rng.gen::<f64>() {
                Acceptance::Metropolis
            } else {
                Acceptance::Rejected
            }
        };

        if acceptance != Acceptance::Rejected {
            self.state.current_tour = candidate;
            self.state.current_cost = candidate_cost;
            self.accepted_moves += 1;
            if acceptance == Acceptance::Improving {
                self.improving_moves += 1;
            }
        }

        self.state.iteration += 1;

        if self.state.current_cost < self.state.best_cost {
            self.state.best_tour.clone_from(&self.state.current_tour);
            self.state.best_cost = self.state.current_cost;
            self.best_iteration = self.state.iteration;
        }

        self.state.temperature *= self.config.cooling_rate;

        if self.state.iteration % self.history_interval == 0 {
            self.cost_history.push(self.state.best_cost);
        }

        Some(acceptance)
    }

    /// Consume the remaining budget and report the best tour
    pub fn run(mut self) -> AnnealingResult {
        log::info!(
            "Annealing {} cities: {} iterations, T0 = {}, rate = {}, seed = {}",
            self.instance.len(),
            self.config.max_iterations,
            self.config.initial_temperature,
            self.config.cooling_rate,
            self.seed
        );
        let start = Instant::now();

        while self.step().is_some() {}

        if self.state.iteration % self.history_interval != 0 {
            self.cost_history.push(self.state.best_cost);
        }

        let elapsed = start.elapsed().as_secs_f64();
        log::info!(
            "Annealing finished: best cost {:.4} (iteration {}), {} of {} moves accepted, {:.4}s",
            self.state.best_cost,
            self.best_iteration,
            self.accepted_moves,
            self.state.iteration,
            elapsed
        );

        AnnealingResult {
            best_tour: self.state.best_tour,
            best_cost: self.state.best_cost,
            seed: self.seed,
            iterations: self.state.iteration,
            final_temperature: self.state.temperature,
            accepted_moves: self.accepted_moves,
            improving_moves: self.improving_moves,
            best_iteration: self.best_iteration,
            cost_history: self.cost_history,
            elapsed,
        }
    }
}

/// Simulated annealing solver with a fixed parameter set
#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    pub config: AnnealingConfig,
}

impl SimulatedAnnealing {
    pub fn with_config(config: AnnealingConfig) -> Self {
        SimulatedAnnealing { config }
    }

    /// Anneal from a random starting tour
    pub fn solve(&self, instance: &TspInstance) -> Result<AnnealingResult> {
        Ok(AnnealingEngine::new(instance, self.config)?.run())
    }

    /// Anneal starting from `solution`'s tour, replacing it with the best found.
    ///
    /// Returns whether the cost went down.
    pub fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> Result<bool> {
        let engine = AnnealingEngine::with_initial_tour(instance, self.config, solution.tour.clone())?;
        let before = instance.tour_cost(&solution.tour);
        let result = engine.run();
        let improved = result.best_cost < before;

        *solution = result.into_solution();
        Ok(improved)
    }

    pub fn name(&self) -> &str {
        "SimulatedAnnealing"
    }
}
