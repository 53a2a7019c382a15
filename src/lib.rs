//! Ant Tour Library
//!
//! Ant Colony Optimization for the Traveling Salesman Problem, built on a
//! small graph of named cities joined by undirected edges that carry a
//! length and a pheromone trail.
//!
//! # Features
//!
//! - Graph arena with stable city and edge ids, and change notifications
//! - Ant decision engine (roulette wheel over `pheromone^alpha * (1/length)^beta`)
//! - Colony driver (Ant System with optional elitist deposit, sequential or parallel)
//! - TSPLIB coordinate instances and JSON persistence of trails
//! - Multi-seed benchmarking with CSV export
//!
//! # Example
//!
//! ```no_run
//! use ant_tour::colony::{AcoConfig, AntColony};
//! use ant_tour::instance::TspInstance;
//!
//! let instance = TspInstance::from_file("berlin52.tsp").unwrap();
//! let mut graph = instance.to_graph(1.0).unwrap();
//!
//! let mut colony = AntColony::new(AcoConfig::default()).unwrap();
//! let solution = colony.run(&mut graph).unwrap();
//!
//! println!("Tour length: {:.2}", solution.length);
//! ```

pub mod ant;
pub mod benchmark;
pub mod colony;
pub mod error;
pub mod graph;
pub mod instance;
pub mod persistence;
pub mod solution;

pub use ant::{Ant, AntParams};
pub use colony::{AcoConfig, AntColony, RoundStats, TspAlgorithm};
pub use error::{AntError, ColonyError, GraphError, InstanceError, PersistenceError};
pub use graph::{CityId, EdgeId, Graph};
pub use solution::Solution;
