//! Best-known tour returned by the colony.

use crate::colony::RoundStats;
use crate::error::GraphError;
use crate::graph::{CityId, Graph};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A tour with its evaluation and run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Cities in visiting order
    pub tour: Vec<CityId>,
    /// City names in visiting order
    pub names: Vec<String>,
    /// Sum of edge lengths along the tour
    pub length: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of rounds performed
    pub rounds: usize,
    /// Round in which the tour was found
    pub found_in_round: usize,
    /// Per-round summary
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<RoundStats>,
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            names: Vec::new(),
            length: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            rounds: 0,
            found_in_round: 0,
            history: Vec::new(),
        }
    }

    /// Create a solution from a tour, measuring it on `graph`
    pub fn from_tour(graph: &Graph, tour: Vec<CityId>, algorithm: &str) -> Result<Self, GraphError> {
        let length = graph.path_length(&tour)?;
        let names = tour
            .iter()
            .map(|&c| graph.city_name(c).map(str::to_string).ok_or(GraphError::UnknownCity(c)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Solution {
            tour,
            names,
            length,
            algorithm: algorithm.to_string(),
            ..Self::new()
        })
    }

    /// Check if all cities are visited exactly once
    pub fn is_complete(&self, graph: &Graph) -> bool {
        if self.tour.len() != graph.len() {
            return false;
        }
        let unique: HashSet<CityId> = self.tour.iter().copied().collect();
        unique.len() == graph.len() && unique.iter().all(|&c| graph.city(c).is_some())
    }

    /// Get the position of a city in the tour
    pub fn position(&self, city: CityId) -> Option<usize> {
        self.tour.iter().position(|&c| c == city)
    }

    /// City after `city` in the tour
    pub fn successor(&self, city: CityId) -> Option<CityId> {
        self.position(city).and_then(|pos| self.tour.get(pos + 1).copied())
    }

    /// City before `city` in the tour
    pub fn predecessor(&self, city: CityId) -> Option<CityId> {
        self.position(city).and_then(|pos| pos.checked_sub(1)).map(|pos| self.tour[pos])
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.2})", self.names.join(" -> "), self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_line() -> (Graph, Vec<CityId>) {
        let mut graph = Graph::new();
        let ids: Vec<CityId> = ["A", "B", "C"].iter().map(|n| graph.add_city(*n).unwrap()).collect();
        graph.connect(ids[0], ids[1], 2.0).unwrap();
        graph.connect(ids[1], ids[2], 3.0).unwrap();
        (graph, ids)
    }

    #[test]
    fn test_from_tour() {
        let (graph, ids) = create_line();
        let solution = Solution::from_tour(&graph, ids.clone(), "test").unwrap();

        assert_eq!(solution.length, 5.0);
        assert_eq!(solution.names, vec!["A", "B", "C"]);
        assert!(solution.is_complete(&graph));
        assert_eq!(solution.to_string(), "A -> B -> C (5.00)");
    }

    #[test]
    fn test_from_tour_disconnected() {
        let (graph, ids) = create_line();
        let result = Solution::from_tour(&graph, vec![ids[0], ids[2]], "test");

        assert!(matches!(result, Err(GraphError::DisconnectedPath { .. })));
    }

    #[test]
    fn test_neighbors_in_tour() {
        let (graph, ids) = create_line();
        let solution = Solution::from_tour(&graph, ids.clone(), "test").unwrap();

        assert_eq!(solution.successor(ids[0]), Some(ids[1]));
        assert_eq!(solution.successor(ids[2]), None);
        assert_eq!(solution.predecessor(ids[0]), None);
        assert_eq!(solution.predecessor(ids[2]), Some(ids[1]));
        assert_eq!(solution.position(CityId(9)), None);
    }

    #[test]
    fn test_incomplete() {
        let (graph, ids) = create_line();
        let solution = Solution::from_tour(&graph, ids[..2].to_vec(), "test").unwrap();

        assert!(!solution.is_complete(&graph));
    }
}
