//! Error types for graph construction, tour building and the boundary modules.

use crate::graph::{CityId, EdgeId};
use thiserror::Error;

/// Structural errors raised by the graph model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("city {0} is not part of the graph")]
    UnknownCity(CityId),

    #[error("edge {0} is not part of the graph")]
    UnknownEdge(EdgeId),

    #[error("a city named '{0}' already exists")]
    DuplicateCity(String),

    #[error("city {0} cannot be connected to itself")]
    SelfLoop(CityId),

    /// Duplicate connect attempt. The existing edge is left untouched.
    #[error("cities {0} and {1} are already connected")]
    AlreadyConnected(CityId, CityId),

    #[error("no edge between consecutive cities {from} and {to}")]
    DisconnectedPath { from: CityId, to: CityId },
}

/// Errors raised by an ant while building a tour
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AntError {
    #[error("an ant needs at least one city to start from")]
    NoCities,

    #[error("start city {0} is not among the cities to visit")]
    StartNotInCities(CityId),

    /// None of the remaining cities is reachable from the current one.
    #[error("no reachable city from {from} ({remaining} cities left to visit)")]
    InfeasibleDecision { from: CityId, remaining: usize },

    #[error("tour requested while {remaining} cities are still unvisited")]
    NotFinished { remaining: usize },
}

/// Errors raised by the colony orchestrator
#[derive(Debug, Error)]
pub enum ColonyError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("the graph has no cities")]
    EmptyGraph,

    #[error("no ant completed a tour in {rounds} rounds")]
    NoFeasibleTour { rounds: usize },

    #[error(transparent)]
    Ant(#[from] AntError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while saving or loading a graph
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid graph document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("edge references unknown city '{0}'")]
    UnknownEndpoint(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while parsing a TSPLIB instance
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("cannot read instance: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("DIMENSION is {expected} but {found} coordinates were read")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("unsupported EDGE_WEIGHT_TYPE '{0}'")]
    UnsupportedWeightType(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
