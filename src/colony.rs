//! Ant Colony Optimization driver (Ant System with optional elitist deposit).
//!
//! Each round has two phases separated by a barrier:
//! 1. every ant builds a tour while the graph is only borrowed immutably
//!    (sequentially or with `rayon`);
//! 2. pheromone evaporates on every edge, then each completed tour deposits
//!    `q / length` on its edges.
//!
//! Ants are kept across rounds and restarted with [`Ant::reset_for_reuse`].

use crate::ant::{Ant, AntParams};
use crate::error::{ColonyError, GraphError};
use crate::graph::{CityId, Graph, TrailGraph as _};
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// Strategy that computes a tour for a whole graph
pub trait TspAlgorithm {
    /// Name used in reports
    fn name(&self) -> &str;

    /// Compute a (good, not necessarily optimal) tour through every city
    fn optimal_path(&mut self, graph: &mut Graph) -> Result<Solution, ColonyError>;
}

/// ACO configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcoConfig {
    /// Number of ants, 0 means one per city
    pub num_ants: usize,
    /// Number of rounds
    pub max_rounds: usize,
    /// Maximum rounds without improvement, at least 1
    pub max_no_improve: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub evaporation_rate: f64,
    /// Pheromone level set on every edge before the first round
    pub initial_pheromone: f64,
    /// Overwrite existing trails with `initial_pheromone` before running
    pub reset_pheromone: bool,
    /// Pheromone deposit factor
    pub q: f64,
    /// Extra deposit on the global best tour, in multiples of `q / best_length`
    pub elitist_weight: f64,
    /// Build the ants' tours on the rayon thread pool
    pub parallel: bool,
    /// Random seed
    pub seed: u64,
    /// Time limit in seconds
    pub time_limit: f64,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            num_ants: 20,
            max_rounds: 200,
            max_no_improve: 50,
            alpha: 1.0,
            beta: 2.5,
            evaporation_rate: 0.1,
            initial_pheromone: 1.0,
            reset_pheromone: true,
            q: 100.0,
            elitist_weight: 0.0,
            parallel: false,
            seed: 42,
            time_limit: 60.0,
        }
    }
}

impl AcoConfig {
    pub fn validate(&self) -> Result<(), ColonyError> {
        let invalid = |msg: &str| Err(ColonyError::InvalidConfig(msg.to_string()));

        if !(self.alpha >= 0.0) || !(self.beta >= 0.0) {
            return invalid("alpha and beta must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return invalid("evaporation rate must lie in [0, 1]");
        }
        if !(self.q > 0.0) {
            return invalid("deposit factor q must be positive");
        }
        if !(self.initial_pheromone >= 0.0) || !(self.elitist_weight >= 0.0) {
            return invalid("initial pheromone and elitist weight must be non-negative");
        }
        if self.max_rounds == 0 {
            return invalid("at least one round is required");
        }
        if self.max_no_improve == 0 {
            return invalid("max rounds without improvement must be at least 1");
        }
        if !(self.time_limit > 0.0) {
            return invalid("time limit must be positive");
        }
        Ok(())
    }

    pub fn ant_params(&self) -> AntParams {
        AntParams {
            alpha: self.alpha,
            beta: self.beta,
        }
    }
}

/// Summary of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub round: usize,
    /// Ants that completed a tour
    pub completed: usize,
    /// Ants whose decision step had no reachable city
    pub discarded: usize,
    pub best_length: Option<f64>,
    pub mean_length: Option<f64>,
    pub worst_length: Option<f64>,
    /// Best length seen so far over all rounds
    pub global_best: Option<f64>,
}

/// Ant Colony Optimization solver
pub struct AntColony {
    config: AcoConfig,
    rng: ChaCha8Rng,
}

impl AntColony {
    pub fn new(config: AcoConfig) -> Result<Self, ColonyError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(AntColony { config, rng })
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    /// Run the algorithm on `graph`, leaving the final trails on it.
    pub fn run(&mut self, graph: &mut Graph) -> Result<Solution, ColonyError> {
        self.run_with_progress(graph, |_| {})
    }

    /// Same as [`run`](Self::run), calling `on_round` after every round
    pub fn run_with_progress<F>(&mut self, graph: &mut Graph, mut on_round: F) -> Result<Solution, ColonyError>
    where
        F: FnMut(&RoundStats),
    {
        if graph.is_empty() {
            return Err(ColonyError::EmptyGraph);
        }

        let start = Instant::now();
        let cities = graph.city_ids();
        let num_ants = if self.config.num_ants == 0 {
            cities.len()
        } else {
            self.config.num_ants
        };

        log::info!(
            "ACO on '{}': {} cities, {} edges, {} ants, alpha={}, beta={}, rho={}",
            graph.name(),
            cities.len(),
            graph.edge_count(),
            num_ants,
            self.config.alpha,
            self.config.beta,
            self.config.evaporation_rate
        );

        if self.config.reset_pheromone {
            let initial = self.config.initial_pheromone;
            graph.update_pheromones(|_| initial);
        }

        let mut ants = (0..num_ants)
            .map(|_| self.spawn_ant(&cities))
            .collect::<Result<Vec<_>, _>>()?;

        let mut best_tour: Option<Vec<CityId>> = None;
        let mut best_length = f64::INFINITY;
        let mut found_in_round = 0;
        let mut history = Vec::new();
        let mut no_improve = 0;
        let mut round = 0;

        while round < self.config.max_rounds
            && no_improve < self.config.max_no_improve
            && start.elapsed().as_secs_f64() < self.config.time_limit
        {
            // Decision phase: the graph is shared read-only by every ant
            let outcomes: Vec<Option<(Vec<CityId>, f64)>> = {
                let shared: &Graph = graph;
                if self.config.parallel {
                    ants.par_iter_mut().map(|ant| construct_tour(ant, shared)).collect()
                } else {
                    ants.iter_mut().map(|ant| construct_tour(ant, shared)).collect()
                }
            };

            let mut completed = Vec::with_capacity(outcomes.len());
            let mut discarded = 0;
            for (ant, outcome) in ants.iter_mut().zip(outcomes) {
                match outcome {
                    Some(tour) => {
                        ant.reset_for_reuse();
                        completed.push(tour);
                    }
                    None => {
                        discarded += 1;
                        *ant = self.spawn_ant(&cities)?;
                    }
                }
            }

            let round_best = completed
                .iter()
                .min_by_key(|(_, length)| OrderedFloat(*length))
                .cloned();
            if let Some((tour, length)) = round_best {
                if length < best_length {
                    best_length = length;
                    best_tour = Some(tour);
                    found_in_round = round;
                    no_improve = 0;
                } else {
                    no_improve += 1;
                }
            } else {
                no_improve += 1;
            }

            // Update phase: every ant of this round has finished
            self.update_pheromones(graph, &completed, best_tour.as_deref(), best_length)?;

            let stats = round_stats(round, &completed, discarded, best_tour.as_ref().map(|_| best_length));
            log::debug!(
                "round {}: {} completed, {} discarded, round best {:?}, global best {:?}",
                stats.round,
                stats.completed,
                stats.discarded,
                stats.best_length,
                stats.global_best
            );
            on_round(&stats);
            history.push(stats);

            round += 1;
        }

        let Some(best_tour) = best_tour else {
            return Err(ColonyError::NoFeasibleTour { rounds: round });
        };

        graph.select_path(&best_tour)?;

        let mut solution = Solution::from_tour(graph, best_tour, self.name())?;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.rounds = round;
        solution.found_in_round = found_in_round;
        solution.history = history;

        log::info!(
            "ACO finished after {} rounds in {:.3}s, best length {:.4} (round {})",
            solution.rounds,
            solution.computation_time,
            solution.length,
            solution.found_in_round
        );

        Ok(solution)
    }

    /// Fresh ant with its own random stream drawn from the colony generator
    fn spawn_ant(&mut self, cities: &[CityId]) -> Result<Ant, ColonyError> {
        let rng = ChaCha8Rng::seed_from_u64(self.rng.gen::<u64>());
        Ok(Ant::new(cities, self.config.ant_params(), rng)?)
    }

    /// Evaporation followed by deposit
    fn update_pheromones(
        &self,
        graph: &mut Graph,
        completed: &[(Vec<CityId>, f64)],
        best_tour: Option<&[CityId]>,
        best_length: f64,
    ) -> Result<(), GraphError> {
        let persistence = 1.0 - self.config.evaporation_rate;
        graph.update_pheromones(|edge| edge.pheromone() * persistence);

        for (tour, length) in completed {
            deposit(graph, tour, self.config.q / length)?;
        }

        if self.config.elitist_weight > 0.0 {
            if let Some(tour) = best_tour {
                deposit(graph, tour, self.config.elitist_weight * self.config.q / best_length)?;
            }
        }
        Ok(())
    }
}

impl TspAlgorithm for AntColony {
    fn name(&self) -> &str {
        "ACO"
    }

    fn optimal_path(&mut self, graph: &mut Graph) -> Result<Solution, ColonyError> {
        self.run(graph)
    }
}

/// Build one ant's tour; `None` when the ant got stuck
fn construct_tour(ant: &mut Ant, graph: &Graph) -> Option<(Vec<CityId>, f64)> {
    let tour = match ant.complete_tour(graph) {
        Ok(tour) => tour,
        Err(e) => {
            log::warn!("discarding ant: {}", e);
            return None;
        }
    };
    match graph.path_length(&tour) {
        Ok(length) => Some((tour, length)),
        Err(e) => {
            log::warn!("discarding ant tour: {}", e);
            None
        }
    }
}

/// Add `amount` on every edge of `tour`. Zero-length tours deposit nothing.
fn deposit(graph: &mut Graph, tour: &[CityId], amount: f64) -> Result<(), GraphError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Ok(());
    }
    for edge in graph.path_edges(tour)? {
        graph.add_pheromone(edge, amount)?;
    }
    Ok(())
}

fn round_stats(round: usize, completed: &[(Vec<CityId>, f64)], discarded: usize, global_best: Option<f64>) -> RoundStats {
    let lengths: Vec<f64> = completed.iter().map(|(_, l)| *l).collect();
    let (best, mean, worst) = if lengths.is_empty() {
        (None, None, None)
    } else {
        let best = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
        let worst = lengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        (Some(best), Some(mean), Some(worst))
    };

    RoundStats {
        round,
        completed: completed.len(),
        discarded,
        best_length: best,
        mean_length: mean,
        worst_length: worst,
        global_best,
    }
}

/// Export round history to CSV
pub fn export_history_csv<P: AsRef<Path>>(history: &[RoundStats], path: P) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for stats in history {
        writer.serialize(stats)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Cities on a circle, fully connected with Euclidean lengths
    fn create_ring(n: usize) -> Graph {
        let mut graph = Graph::named("ring");
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let angle = i as f64 / n as f64 * std::f64::consts::TAU;
                (10.0 * angle.cos(), 10.0 * angle.sin())
            })
            .collect();
        let ids: Vec<CityId> = (0..n).map(|i| graph.add_city(format!("{}", i)).unwrap()).collect();
        for i in 0..n {
            for j in i + 1..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                graph.connect(ids[i], ids[j], (dx * dx + dy * dy).sqrt()).unwrap();
            }
        }
        graph
    }

    fn small_config() -> AcoConfig {
        AcoConfig {
            num_ants: 8,
            max_rounds: 30,
            max_no_improve: 30,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_aco_finds_complete_tour() {
        let mut graph = create_ring(8);
        let mut colony = AntColony::new(small_config()).unwrap();
        let solution = colony.run(&mut graph).unwrap();

        assert!(solution.is_complete(&graph));
        assert_eq!(solution.history.len(), solution.rounds);
        assert!((graph.path_length(&solution.tour).unwrap() - solution.length).abs() < 1e-9);

        // open tour along the ring: 7 sides of the regular octagon
        let side = 2.0 * 10.0 * (std::f64::consts::PI / 8.0).sin();
        assert!(solution.length >= 7.0 * side - 1e-9);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential_graph = create_ring(9);
        let mut parallel_graph = create_ring(9);

        let sequential = AntColony::new(small_config()).unwrap().run(&mut sequential_graph).unwrap();
        let parallel = AntColony::new(AcoConfig { parallel: true, ..small_config() })
            .unwrap()
            .run(&mut parallel_graph)
            .unwrap();

        assert_eq!(sequential.tour, parallel.tour);
        assert_eq!(sequential.length, parallel.length);
    }

    #[test]
    fn test_best_tour_edges_selected() {
        let mut graph = create_ring(6);
        let solution = AntColony::new(small_config()).unwrap().run(&mut graph).unwrap();

        let on_path: HashSet<_> = graph.path_edges(&solution.tour).unwrap().into_iter().collect();
        for (id, edge) in graph.edges() {
            assert_eq!(edge.is_selected(), on_path.contains(&id));
        }
    }

    #[test]
    fn test_evaporation_and_deposit() {
        let mut graph = Graph::new();
        let a = graph.add_city("A").unwrap();
        let b = graph.add_city("B").unwrap();
        let edge = graph.connect(a, b, 4.0).unwrap();

        let config = AcoConfig {
            num_ants: 1,
            max_rounds: 1,
            evaporation_rate: 0.5,
            initial_pheromone: 2.0,
            q: 8.0,
            ..Default::default()
        };
        AntColony::new(config).unwrap().run(&mut graph).unwrap();

        // 2.0 * 0.5 + 8.0 / 4.0
        assert!((graph.edge(edge).unwrap().pheromone() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_stored_trails_kept_without_reset() {
        let mut graph = Graph::new();
        let a = graph.add_city("A").unwrap();
        let b = graph.add_city("B").unwrap();
        let edge = graph.connect_with_pheromone(a, b, 1.0, 10.0).unwrap();

        let config = AcoConfig {
            num_ants: 1,
            max_rounds: 1,
            evaporation_rate: 0.1,
            reset_pheromone: false,
            q: 1.0,
            ..Default::default()
        };
        AntColony::new(config).unwrap().run(&mut graph).unwrap();

        assert!((graph.edge(edge).unwrap().pheromone() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_feasible_tour() {
        let mut graph = Graph::new();
        graph.add_city("A").unwrap();
        graph.add_city("B").unwrap();

        let config = AcoConfig { max_rounds: 3, ..small_config() };
        let result = AntColony::new(config).unwrap().run(&mut graph);

        assert!(matches!(result, Err(ColonyError::NoFeasibleTour { rounds: 3 })));
    }

    #[test]
    fn test_empty_graph() {
        let mut graph = Graph::new();
        let result = AntColony::new(small_config()).unwrap().run(&mut graph);

        assert!(matches!(result, Err(ColonyError::EmptyGraph)));
    }

    #[test]
    fn test_invalid_config() {
        let bad = [
            AcoConfig { evaporation_rate: 1.5, ..Default::default() },
            AcoConfig { alpha: -1.0, ..Default::default() },
            AcoConfig { q: 0.0, ..Default::default() },
            AcoConfig { max_rounds: 0, ..Default::default() },
            AcoConfig { beta: f64::NAN, ..Default::default() },
            AcoConfig { max_no_improve: 0, ..Default::default() },
            AcoConfig { time_limit: 0.0, ..Default::default() },
            AcoConfig { time_limit: -5.0, ..Default::default() },
            AcoConfig { time_limit: f64::NAN, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(AntColony::new(config), Err(ColonyError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_one_ant_per_city_and_progress() {
        let mut graph = create_ring(5);
        let config = AcoConfig {
            num_ants: 0,
            max_rounds: 4,
            ..small_config()
        };
        let mut seen = Vec::new();
        AntColony::new(config)
            .unwrap()
            .run_with_progress(&mut graph, |stats| seen.push(stats.completed))
            .unwrap();

        assert_eq!(seen, vec![5, 5, 5, 5]);
    }

    #[test]
    fn test_partially_connected_graph_discards_stuck_ants() {
        // star: every tour from a leaf gets stuck after the center
        let mut graph = Graph::new();
        let center = graph.add_city("center").unwrap();
        for i in 0..3 {
            let leaf = graph.add_city(format!("leaf{}", i)).unwrap();
            graph.connect(center, leaf, 1.0).unwrap();
        }

        let config = AcoConfig { max_rounds: 2, ..small_config() };
        let mut discarded = 0;
        let result = AntColony::new(config)
            .unwrap()
            .run_with_progress(&mut graph, |stats| discarded += stats.discarded);

        assert!(matches!(result, Err(ColonyError::NoFeasibleTour { .. })));
        assert_eq!(discarded, 16);
    }

    #[test]
    fn test_history_csv_export() {
        let mut graph = create_ring(5);
        let solution = AntColony::new(AcoConfig { max_rounds: 3, ..small_config() })
            .unwrap()
            .run(&mut graph)
            .unwrap();

        let path = std::env::temp_dir().join(format!("ant-tour-history-{}.csv", std::process::id()));
        export_history_csv(&solution.history, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(content.starts_with("round,completed,discarded"));
        assert_eq!(content.lines().count(), 1 + solution.history.len());
    }
}
