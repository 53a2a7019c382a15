//! Module for parsing TSPLIB instances into graphs.
//!
//! Only coordinate-based instances are handled: `NODE_COORD_SECTION` with
//! `EUC_2D`, `CEIL_2D` or no `EDGE_WEIGHT_TYPE` (plain Euclidean distance).
//! Every pair of nodes is connected, which gives the complete graph the TSP
//! is usually stated on.

use crate::error::InstanceError;
use crate::graph::{CityId, Graph};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A node with planar coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier as written in the file
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }

    pub fn euclidean(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// How distances are derived from coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeWeightType {
    /// Raw Euclidean distance
    Euclidean,
    /// Euclidean distance rounded to the nearest integer (TSPLIB `EUC_2D`)
    Euc2d,
    /// Euclidean distance rounded up (TSPLIB `CEIL_2D`)
    Ceil2d,
}

impl EdgeWeightType {
    fn parse(value: &str) -> Result<Self, InstanceError> {
        match value {
            "EUC_2D" => Ok(EdgeWeightType::Euc2d),
            "CEIL_2D" => Ok(EdgeWeightType::Ceil2d),
            "EXACT_2D" => Ok(EdgeWeightType::Euclidean),
            other => Err(InstanceError::UnsupportedWeightType(other.to_string())),
        }
    }

    pub fn distance(self, a: &Node, b: &Node) -> f64 {
        let d = a.euclidean(b);
        match self {
            EdgeWeightType::Euclidean => d,
            EdgeWeightType::Euc2d => d.round(),
            EdgeWeightType::Ceil2d => d.ceil(),
        }
    }
}

/// A TSPLIB instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    pub weight_type: EdgeWeightType,
    /// Nodes in file order
    pub nodes: Vec<Node>,
}

impl TspInstance {
    /// Parse a TSPLIB file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse TSPLIB content
    pub fn parse(content: &str) -> Result<Self, InstanceError> {
        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut weight_type = EdgeWeightType::Euclidean;
        let mut nodes = Vec::new();
        let mut in_coords = false;

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "COMMENT" => comment = value.to_string(),
                    "DIMENSION" => {
                        dimension = Some(value.parse().map_err(|_| InstanceError::Parse {
                            line: line_no,
                            message: format!("invalid dimension '{}'", value),
                        })?)
                    }
                    "EDGE_WEIGHT_TYPE" => weight_type = EdgeWeightType::parse(value)?,
                    _ => {}
                }
                in_coords = false;
                continue;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }
            if line.ends_with("_SECTION") {
                in_coords = false;
                continue;
            }

            if in_coords {
                nodes.push(parse_node(line, line_no)?);
            }
        }

        if let Some(expected) = dimension {
            if expected != nodes.len() {
                return Err(InstanceError::DimensionMismatch {
                    expected,
                    found: nodes.len(),
                });
            }
        }

        Ok(TspInstance {
            name,
            comment,
            weight_type,
            nodes,
        })
    }

    pub fn dimension(&self) -> usize {
        self.nodes.len()
    }

    /// Build the complete graph; cities are named after node ids
    pub fn to_graph(&self, initial_pheromone: f64) -> Result<Graph, InstanceError> {
        let mut graph = Graph::named(self.name.clone());
        let ids = self
            .nodes
            .iter()
            .map(|node| graph.add_city(node.id.to_string()))
            .collect::<Result<Vec<CityId>, _>>()?;

        for i in 0..self.nodes.len() {
            for j in i + 1..self.nodes.len() {
                let length = self.weight_type.distance(&self.nodes[i], &self.nodes[j]);
                graph.connect_with_pheromone(ids[i], ids[j], length, initial_pheromone)?;
            }
        }

        Ok(graph)
    }
}

fn parse_node(line: &str, line_no: usize) -> Result<Node, InstanceError> {
    let invalid = |what: &str| InstanceError::Parse {
        line: line_no,
        message: format!("invalid {} in '{}'", what, line),
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(invalid("coordinate line"));
    }
    let id: usize = parts[0].parse().map_err(|_| invalid("node id"))?;
    let x: f64 = parts[1].parse().map_err(|_| invalid("x coordinate"))?;
    let y: f64 = parts[2].parse().map_err(|_| invalid("y coordinate"))?;

    Ok(Node::new(id, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "NAME: sample4
COMMENT: four corners
TYPE: TSP
DIMENSION: 4
EDGE_WEIGHT_TYPE: EUC_2D
NODE_COORD_SECTION
1 0.0 0.0
2 3.0 0.0
3 3.0 4.0
4 0.0 4.0
EOF
";

    #[test]
    fn test_parse_sample() {
        let instance = TspInstance::parse(SAMPLE).unwrap();

        assert_eq!(instance.name, "sample4");
        assert_eq!(instance.comment, "four corners");
        assert_eq!(instance.weight_type, EdgeWeightType::Euc2d);
        assert_eq!(instance.dimension(), 4);
        assert_eq!(instance.nodes[2], Node::new(3, 3.0, 4.0));
    }

    #[test]
    fn test_to_graph_complete() {
        let instance = TspInstance::parse(SAMPLE).unwrap();
        let graph = instance.to_graph(1.0).unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 6);

        let a = graph.city_by_name("1").unwrap();
        let c = graph.city_by_name("3").unwrap();
        let edge = graph.distance_to(a, c).unwrap();
        assert_eq!(edge.length(), 5.0);
        assert_eq!(edge.pheromone(), 1.0);
    }

    #[test]
    fn test_rounding_modes() {
        let a = Node::new(1, 0.0, 0.0);
        let b = Node::new(2, 1.0, 1.0);

        assert!((EdgeWeightType::Euclidean.distance(&a, &b) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(EdgeWeightType::Euc2d.distance(&a, &b), 1.0);
        assert_eq!(EdgeWeightType::Ceil2d.distance(&a, &b), 2.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let content = "DIMENSION: 3\nNODE_COORD_SECTION\n1 0 0\n2 1 1\nEOF\n";

        assert!(matches!(
            TspInstance::parse(content),
            Err(InstanceError::DimensionMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_invalid_coordinate() {
        let content = "NODE_COORD_SECTION\n1 0 zero\n";

        match TspInstance::parse(content) {
            Err(InstanceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_weight_type() {
        let content = "EDGE_WEIGHT_TYPE: GEO\nNODE_COORD_SECTION\n1 0 0\n";

        assert!(matches!(
            TspInstance::parse(content),
            Err(InstanceError::UnsupportedWeightType(_))
        ));
    }
}
