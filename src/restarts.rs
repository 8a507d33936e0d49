//! Multi-start restarts of the annealing engine.
//!
//! Runs independent engines with consecutive seeds over one shared, read-only
//! instance, then aggregates the outcomes. Seeds are fixed up front, so the
//! parallel and sequential paths produce the same records.

use crate::error::{Result, SolverError};
use crate::heuristics::annealing::{AnnealingConfig, AnnealingEngine, AnnealingResult};
use crate::instance::TspInstance;
use crate::solution::Solution;

use indicatif::ProgressBar;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Restart configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartConfig {
    /// Number of independent runs
    pub runs: usize,
    /// Run `k` uses seed `base_seed + k`
    pub base_seed: u64,
    /// Run on the rayon thread pool
    pub parallel: bool,
    /// Parameters shared by every run (its seed is overridden)
    pub annealing: AnnealingConfig,
}

impl Default for RestartConfig {
    fn default() -> Self {
        RestartConfig {
            runs: 5,
            base_seed: 42,
            parallel: true,
            annealing: AnnealingConfig::default(),
        }
    }
}

/// Result of a single restart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run: usize,
    pub seed: u64,
    pub best_cost: f64,
    pub iterations: usize,
    pub accepted_moves: usize,
    pub improving_moves: usize,
    pub best_iteration: usize,
    /// Computation time in seconds
    pub time: f64,
}

impl RunRecord {
    fn from_result(run: usize, result: &AnnealingResult) -> Self {
        RunRecord {
            run,
            seed: result.seed,
            best_cost: result.best_cost,
            iterations: result.iterations,
            accepted_moves: result.accepted_moves,
            improving_moves: result.improving_moves,
            best_iteration: result.best_iteration,
            time: result.elapsed,
        }
    }
}

/// Aggregated statistics over all restarts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartStatistics {
    pub runs: usize,
    pub best_cost: f64,
    pub avg_cost: f64,
    pub worst_cost: f64,
    pub std_cost: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Everything a restart campaign produced
#[derive(Debug, Clone)]
pub struct RestartStudy {
    pub instance: String,
    records: Vec<RunRecord>,
    best: AnnealingResult,
    best_run: usize,
}

/// Run `config.runs` independent annealing runs on `instance`.
///
/// `progress` is ticked once per finished run.
pub fn run_restarts(
    instance: &TspInstance,
    config: &RestartConfig,
    progress: Option<&ProgressBar>,
) -> Result<RestartStudy> {
    if config.runs == 0 {
        return Err(SolverError::invalid_input("restart count must be at least 1"));
    }
    config.annealing.validate()?;

    log::info!(
        "Running {} restarts on {} ({}, base seed {})",
        config.runs,
        instance.name,
        if config.parallel { "parallel" } else { "sequential" },
        config.base_seed
    );

    let run_one = |run: usize| -> Result<AnnealingResult> {
        let seed = config.base_seed.wrapping_add(run as u64);
        let engine = AnnealingEngine::new(instance, config.annealing.with_seed(seed))?;
        let result = engine.run();
        if let Some(pb) = progress {
            pb.inc(1);
        }
        Ok(result)
    };

    let results: Vec<AnnealingResult> = if config.parallel {
        (0..config.runs).into_par_iter().map(run_one).collect::<Result<_>>()?
    } else {
        (0..config.runs).map(run_one).collect::<Result<_>>()?
    };

    let records: Vec<RunRecord> = results
        .iter()
        .enumerate()
        .map(|(run, result)| RunRecord::from_result(run, result))
        .collect();

    // min_by_key keeps the first of equal minima, i.e. the lowest run index
    let (best_run, best) = results
        .into_iter()
        .enumerate()
        .min_by_key(|(_, r)| OrderedFloat(r.best_cost))
        .ok_or_else(|| SolverError::invalid_input("no restart produced a result"))?;

    Ok(RestartStudy {
        instance: instance.name.clone(),
        records,
        best,
        best_run,
    })
}

impl RestartStudy {
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Index of the run that found the overall best tour
    pub fn best_run(&self) -> usize {
        self.best_run
    }

    pub fn best_result(&self) -> &AnnealingResult {
        &self.best
    }

    pub fn best_solution(&self) -> Solution {
        let mut solution = self.best.clone().into_solution();
        solution.algorithm = format!("SimulatedAnnealing-Restart{}", self.best_run);
        solution
    }

    pub fn statistics(&self) -> RestartStatistics {
        let costs: Vec<f64> = self.records.iter().map(|r| r.best_cost).collect();
        let times: Vec<f64> = self.records.iter().map(|r| r.time).collect();
        let n = costs.len() as f64;

        let avg_cost = costs.iter().sum::<f64>() / n;
        let best_cost = costs.iter().cloned().fold(f64::INFINITY, f64::min);
        let worst_cost = costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let variance = costs.iter()
            .map(|c| (c - avg_cost).powi(2))
            .sum::<f64>() / n;

        let total_time = times.iter().sum::<f64>();

        RestartStatistics {
            runs: self.records.len(),
            best_cost,
            avg_cost,
            worst_cost,
            std_cost: variance.sqrt(),
            avg_time: total_time / n,
            total_time,
        }
    }

    /// Export per-run records to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .map_err(|e| SolverError::export(format!("{}: {}", path.as_ref().display(), e)))?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()
            .map_err(|e| SolverError::export(e.to_string()))?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        let stats = self.statistics();

        report.push_str("========================================\n");
        report.push_str("       SA-TSP Restart Report\n");
        report.push_str("========================================\n\n");
        report.push_str(&format!("Instance: {}\n\n", self.instance));

        report.push_str(&format!("{:<6} {:>12} {:>14} {:>12} {:>10}\n",
            "Run", "Seed", "Best Cost", "Accepted", "Time"));
        report.push_str("-".repeat(58).as_str());
        report.push('\n');

        for r in &self.records {
            let marker = if r.run == self.best_run { "*" } else { "" };
            report.push_str(&format!("{:<6} {:>12} {:>14.4} {:>12} {:>10.4}\n",
                format!("{}{}", r.run, marker),
                r.seed,
                r.best_cost,
                r.accepted_moves,
                r.time));
        }

        report.push_str("-".repeat(58).as_str());
        report.push('\n');
        report.push_str(&format!("Best: {:.4}  Avg: {:.4}  Worst: {:.4}  Std: {:.4}\n",
            stats.best_cost, stats.avg_cost, stats.worst_cost, stats.std_cost));
        report.push_str(&format!("Avg time: {:.4}s  Total time: {:.4}s\n",
            stats.avg_time, stats.total_time));

        report
    }
}
