//! Weighted, pheromone-bearing connection between two cities.

use super::{CityId, TrailEdge};
use serde::{Deserialize, Serialize};

/// Coerce an edge length: anything not strictly positive becomes 1.
#[inline]
pub fn sanitize_length(length: f64) -> f64 {
    if length > 0.0 && length.is_finite() {
        length
    } else {
        1.0
    }
}

/// Coerce a pheromone level: negative or NaN levels become 0, an overflowed
/// trail saturates at `f64::MAX` so it always stays finite.
#[inline]
pub fn sanitize_pheromone(pheromone: f64) -> f64 {
    if pheromone >= 0.0 {
        pheromone.min(f64::MAX)
    } else {
        0.0
    }
}

/// An undirected edge of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Endpoints, in the order they were connected
    endpoints: (CityId, CityId),
    /// Travel length, always > 0
    length: f64,
    /// Trail intensity, always >= 0
    pheromone: f64,
    /// Display-only marker, never read by the decision step
    selected: bool,
}

impl Edge {
    pub fn new(a: CityId, b: CityId, length: f64, pheromone: f64) -> Self {
        Edge {
            endpoints: (a, b),
            length: sanitize_length(length),
            pheromone: sanitize_pheromone(pheromone),
            selected: false,
        }
    }

    pub fn endpoints(&self) -> (CityId, CityId) {
        self.endpoints
    }

    /// The endpoint opposite to `city`, if `city` is an endpoint
    pub fn other(&self, city: CityId) -> Option<CityId> {
        match self.endpoints {
            (a, b) if a == city => Some(b),
            (a, b) if b == city => Some(a),
            _ => None,
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn pheromone(&self) -> f64 {
        self.pheromone
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_length(&mut self, length: f64) {
        self.length = sanitize_length(length);
    }

    pub(crate) fn set_pheromone(&mut self, pheromone: f64) {
        self.pheromone = sanitize_pheromone(pheromone);
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

impl TrailEdge for Edge {
    fn length(&self) -> f64 {
        self.length
    }

    fn pheromone(&self) -> f64 {
        self.pheromone
    }
}
