//! Benchmarking module: repeated colony runs over several seeds.
//!
//! Provides tools for running experiments, collecting statistics,
//! and exporting them.

use crate::colony::{AcoConfig, AntColony, TspAlgorithm};
use crate::error::ColonyError;
use crate::graph::Graph;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Result of a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Algorithm name
    pub algorithm: String,
    /// Graph name
    pub graph: String,
    /// Number of cities
    pub cities: usize,
    /// Seed of the run
    pub seed: u64,
    /// Best tour length
    pub length: f64,
    /// Rounds performed
    pub rounds: usize,
    /// Round in which the best tour was found
    pub found_in_round: usize,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics over all runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Number of successful runs
    pub runs: usize,
    /// Runs that did not produce a tour
    pub failures: usize,
    pub best_length: f64,
    pub worst_length: f64,
    pub avg_length: f64,
    /// Standard deviation of length
    pub std_length: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs, seeds are `first_seed..first_seed + num_runs`
    pub num_runs: usize,
    pub first_seed: u64,
    /// Colony parameters; the seed is overridden per run
    pub aco: AcoConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            first_seed: 0,
            aco: AcoConfig::default(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
    failures: usize,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            failures: 0,
        }
    }

    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    /// Run every seed on a copy of `graph`, calling `on_run` after each run
    pub fn run<F>(&mut self, graph: &Graph, mut on_run: F) -> Result<(), ColonyError>
    where
        F: FnMut(usize),
    {
        log::info!("Running benchmark on '{}' ({} runs)", graph.name(), self.config.num_runs);

        for i in 0..self.config.num_runs {
            let seed = self.config.first_seed + i as u64;
            let config = AcoConfig {
                seed,
                ..self.config.aco.clone()
            };
            let mut colony = AntColony::new(config)?;
            let mut working = graph.clone();

            match colony.optimal_path(&mut working) {
                Ok(solution) => self.results.push(RunResult {
                    algorithm: colony.name().to_string(),
                    graph: graph.name().to_string(),
                    cities: graph.len(),
                    seed,
                    length: solution.length,
                    rounds: solution.rounds,
                    found_in_round: solution.found_in_round,
                    time: solution.computation_time,
                }),
                Err(ColonyError::NoFeasibleTour { rounds }) => {
                    log::warn!("seed {}: no tour after {} rounds", seed, rounds);
                    self.failures += 1;
                }
                Err(e) => return Err(e),
            }
            on_run(i + 1);
        }
        Ok(())
    }

    /// Compute statistics over the recorded runs
    pub fn compute_statistics(&self) -> Option<RunStatistics> {
        if self.results.is_empty() {
            return None;
        }

        let lengths: Vec<f64> = self.results.iter().map(|r| r.length).collect();
        let times: Vec<f64> = self.results.iter().map(|r| r.time).collect();
        let n = lengths.len() as f64;

        let avg_length = lengths.iter().sum::<f64>() / n;
        let variance = lengths.iter().map(|l| (l - avg_length).powi(2)).sum::<f64>() / n;
        let total_time = times.iter().sum::<f64>();

        Some(RunStatistics {
            runs: lengths.len(),
            failures: self.failures,
            best_length: lengths.iter().cloned().fold(f64::INFINITY, f64::min),
            worst_length: lengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            avg_length,
            std_length: variance.sqrt(),
            avg_time: total_time / n,
            total_time,
        })
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        if let Some(stats) = self.compute_statistics() {
            writer.serialize(stats)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("         ACO Benchmark Report\n");
        report.push_str("========================================\n\n");

        let aco = &self.config.aco;
        report.push_str(&format!(
            "alpha={} beta={} rho={} q={} ants={} rounds={}\n\n",
            aco.alpha, aco.beta, aco.evaporation_rate, aco.q, aco.num_ants, aco.max_rounds
        ));

        report.push_str(&format!(
            "{:<8} {:>12} {:>8} {:>8} {:>10}\n",
            "Seed", "Length", "Rounds", "Found", "Time"
        ));
        report.push_str(&format!("{}\n", "-".repeat(50)));
        for r in &self.results {
            report.push_str(&format!(
                "{:<8} {:>12.2} {:>8} {:>8} {:>10.4}\n",
                r.seed, r.length, r.rounds, r.found_in_round, r.time
            ));
        }

        match self.compute_statistics() {
            Some(stats) => {
                report.push_str(&format!("\nBest:    {:.2}\n", stats.best_length));
                report.push_str(&format!("Average: {:.2} (std {:.2})\n", stats.avg_length, stats.std_length));
                report.push_str(&format!("Worst:   {:.2}\n", stats.worst_length));
                report.push_str(&format!("Time:    {:.4}s avg, {:.4}s total\n", stats.avg_time, stats.total_time));
                if stats.failures > 0 {
                    report.push_str(&format!("Failed runs: {}\n", stats.failures));
                }
            }
            None => report.push_str("\nNo run produced a tour.\n"),
        }

        report
    }
}
