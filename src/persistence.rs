//! Saving and loading graphs (cities, edge lengths and pheromone trails) as JSON.

use crate::error::PersistenceError;
use crate::graph::{CityId, Graph};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// On-disk representation of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub name: String,
    /// City names; their order fixes the city ids
    pub cities: Vec<String>,
    pub edges: Vec<EdgeRecord>,
}

/// One undirected edge, endpoints referenced by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub length: f64,
    #[serde(default)]
    pub pheromone: f64,
}

impl GraphDocument {
    pub fn from_graph(graph: &Graph) -> Self {
        let name_of = |id: CityId| graph.city_name(id).unwrap_or_default().to_string();

        GraphDocument {
            name: graph.name().to_string(),
            cities: graph.cities().map(|(_, c)| c.name().to_string()).collect(),
            edges: graph
                .edges()
                .map(|(_, edge)| {
                    let (a, b) = edge.endpoints();
                    EdgeRecord {
                        from: name_of(a),
                        to: name_of(b),
                        length: edge.length(),
                        pheromone: edge.pheromone(),
                    }
                })
                .collect(),
        }
    }

    /// Rebuild the graph, validating names and connections
    pub fn to_graph(&self) -> Result<Graph, PersistenceError> {
        let mut graph = Graph::named(self.name.clone());
        for name in &self.cities {
            graph.add_city(name.clone())?;
        }
        for record in &self.edges {
            let from = graph
                .city_by_name(&record.from)
                .ok_or_else(|| PersistenceError::UnknownEndpoint(record.from.clone()))?;
            let to = graph
                .city_by_name(&record.to)
                .ok_or_else(|| PersistenceError::UnknownEndpoint(record.to.clone()))?;
            graph.connect_with_pheromone(from, to, record.length, record.pheromone)?;
        }
        Ok(graph)
    }
}

/// Write `graph` as pretty-printed JSON
pub fn serialize<W: Write>(graph: &Graph, writer: W) -> Result<(), PersistenceError> {
    serde_json::to_writer_pretty(writer, &GraphDocument::from_graph(graph))?;
    Ok(())
}

/// Read a graph written by [`serialize`]
pub fn deserialize<R: Read>(reader: R) -> Result<Graph, PersistenceError> {
    let document: GraphDocument = serde_json::from_reader(reader)?;
    document.to_graph()
}

pub fn save<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serialize(graph, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Graph, PersistenceError> {
    let file = File::open(path)?;
    deserialize(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    fn create_triangle() -> Graph {
        let mut graph = Graph::named("triangle");
        let a = graph.add_city("A").unwrap();
        let b = graph.add_city("B").unwrap();
        let c = graph.add_city("C").unwrap();
        graph.connect_with_pheromone(a, b, 3.0, 0.5).unwrap();
        graph.connect_with_pheromone(b, c, 4.0, 1.5).unwrap();
        graph.connect_with_pheromone(c, a, 5.0, 0.0).unwrap();
        graph
    }

    #[test]
    fn test_document_keeps_lengths_and_trails() {
        let graph = create_triangle();
        let mut buffer = Vec::new();
        serialize(&graph, &mut buffer).unwrap();

        let loaded = deserialize(buffer.as_slice()).unwrap();
        assert_eq!(loaded.name(), "triangle");
        assert_eq!(GraphDocument::from_graph(&loaded), GraphDocument::from_graph(&graph));

        let b = loaded.city_by_name("B").unwrap();
        let c = loaded.city_by_name("C").unwrap();
        let edge = loaded.distance_to(c, b).unwrap();
        assert_eq!(edge.length(), 4.0);
        assert_eq!(edge.pheromone(), 1.5);
    }

    #[test]
    fn test_unknown_endpoint() {
        let json = r#"{ "cities": ["A"], "edges": [{ "from": "A", "to": "Z", "length": 1.0 }] }"#;

        match deserialize(json.as_bytes()) {
            Err(PersistenceError::UnknownEndpoint(name)) => assert_eq!(name, "Z"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let json = r#"{
            "cities": ["A", "B"],
            "edges": [
                { "from": "A", "to": "B", "length": 1.0 },
                { "from": "B", "to": "A", "length": 2.0 }
            ]
        }"#;

        assert!(matches!(
            deserialize(json.as_bytes()),
            Err(PersistenceError::Graph(GraphError::AlreadyConnected(_, _)))
        ));
    }

    #[test]
    fn test_invalid_length_coerced_on_load() {
        let json = r#"{ "cities": ["A", "B"], "edges": [{ "from": "A", "to": "B", "length": -2.0 }] }"#;
        let graph = deserialize(json.as_bytes()).unwrap();

        let edge = graph.distance_to(graph.city_by_name("A").unwrap(), graph.city_by_name("B").unwrap());
        assert_eq!(edge.unwrap().length(), 1.0);
        assert_eq!(edge.unwrap().pheromone(), 0.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let graph = create_triangle();
        let path = std::env::temp_dir().join(format!("ant-tour-graph-{}.json", std::process::id()));

        save(&graph, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.edge_count(), 3);
    }

    #[test]
    fn test_saturated_trail_survives_reload() {
        let mut graph = create_triangle();
        let edge = graph.edge_between(CityId(0), CityId(1)).unwrap();
        graph.add_pheromone(edge, f64::MAX).unwrap();
        graph.add_pheromone(edge, f64::MAX).unwrap();

        let mut buffer = Vec::new();
        serialize(&graph, &mut buffer).unwrap();
        let loaded = deserialize(buffer.as_slice()).unwrap();

        assert_eq!(loaded.distance_to(CityId(0), CityId(1)).unwrap().pheromone(), f64::MAX);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(deserialize("not json".as_bytes()), Err(PersistenceError::Json(_))));
    }
}
