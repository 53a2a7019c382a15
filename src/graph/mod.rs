//! Graph model for the TSP: an arena of cities and undirected edges.
//!
//! Cities and edges are addressed by index ([`CityId`], [`EdgeId`]). Each city
//! stores its neighbor -> edge mapping, the edge itself lives once in the
//! graph's edge arena. Removing an edge vacates its slot, so ids handed out
//! earlier never point at a different edge.

mod city;
mod edge;
mod observer;

pub use city::{City, CityId};
pub use edge::{sanitize_length, sanitize_pheromone, Edge};
pub use observer::{GraphEvent, GraphObserver, LoggingObserver};

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Index of an edge inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// What the decision step needs from an edge
pub trait TrailEdge {
    /// Travel length, strictly positive
    fn length(&self) -> f64;
    /// Trail intensity, non-negative
    fn pheromone(&self) -> f64;
}

/// What the decision step needs from a graph
pub trait TrailGraph {
    type Edge: TrailEdge;

    /// Every city of the graph, in a stable order
    fn city_ids(&self) -> Vec<CityId>;

    /// The edge between two cities, or `None` if they are not connected
    fn distance_to(&self, from: CityId, to: CityId) -> Option<&Self::Edge>;
}

/// Undirected weighted graph with pheromone trails
#[derive(Default)]
pub struct Graph {
    name: String,
    cities: Vec<City>,
    /// City name -> id, kept in sync with `cities`
    names: HashMap<String, CityId>,
    edges: Vec<Option<Edge>>,
    observer: Option<Box<dyn GraphObserver>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Graph {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach an observer notified on every property change
    pub fn with_observer(mut self, observer: Box<dyn GraphObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Box<dyn GraphObserver>>) {
        self.observer = observer;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of cities
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Number of live edges
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Add a city; names must be unique
    pub fn add_city(&mut self, name: impl Into<String>) -> Result<CityId, GraphError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GraphError::DuplicateCity(name));
        }
        let id = CityId(self.cities.len());
        self.names.insert(name.clone(), id);
        self.cities.push(City::new(name));
        Ok(id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id.index())
    }

    pub fn city_by_name(&self, name: &str) -> Option<CityId> {
        self.names.get(name).copied()
    }

    /// Name of a city, if it exists
    pub fn city_name(&self, id: CityId) -> Option<&str> {
        self.city(id).map(City::name)
    }

    pub fn cities(&self) -> impl Iterator<Item = (CityId, &City)> + '_ {
        self.cities.iter().enumerate().map(|(i, c)| (CityId(i), c))
    }

    pub fn rename_city(&mut self, id: CityId, name: impl Into<String>) -> Result<(), GraphError> {
        let name = name.into();
        self.check_city(id)?;
        if let Some(existing) = self.city_by_name(&name) {
            if existing != id {
                return Err(GraphError::DuplicateCity(name));
            }
        }
        let city = &mut self.cities[id.index()];
        self.names.remove(city.name());
        self.names.insert(name.clone(), id);
        city.set_name(name.clone());
        self.emit(GraphEvent::CityRenamed { city: id, name });
        Ok(())
    }

    /// Connect two cities with a fresh edge carrying no pheromone.
    pub fn connect(&mut self, a: CityId, b: CityId, length: f64) -> Result<EdgeId, GraphError> {
        self.connect_with_pheromone(a, b, length, 0.0)
    }

    /// Connect two cities in both directions.
    ///
    /// Fails with [`GraphError::AlreadyConnected`] if an edge already exists;
    /// the existing edge is never replaced.
    pub fn connect_with_pheromone(
        &mut self,
        a: CityId,
        b: CityId,
        length: f64,
        pheromone: f64,
    ) -> Result<EdgeId, GraphError> {
        self.check_city(a)?;
        self.check_city(b)?;
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        if self.cities[a.index()].is_connected_to(b) {
            return Err(GraphError::AlreadyConnected(a, b));
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge::new(a, b, length, pheromone)));
        self.cities[a.index()].link(b, id);
        self.cities[b.index()].link(a, id);
        Ok(id)
    }

    /// Remove the edge between two cities, returning it. No-op if absent.
    pub fn disconnect(&mut self, a: CityId, b: CityId) -> Option<Edge> {
        let id = self.city(a)?.edge_to(b)?;
        self.cities[a.index()].unlink(b);
        if let Some(other) = self.cities.get_mut(b.index()) {
            other.unlink(a);
        }
        self.edges.get_mut(id.0).and_then(Option::take)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    /// Live edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i), e)))
    }

    pub fn edge_between(&self, a: CityId, b: CityId) -> Option<EdgeId> {
        self.city(a)?.edge_to(b)
    }

    /// The edge between two cities, or `None` if they are not connected
    pub fn distance_to(&self, a: CityId, b: CityId) -> Option<&Edge> {
        self.edge_between(a, b).and_then(|id| self.edge(id))
    }

    pub fn is_connected_to(&self, a: CityId, b: CityId) -> bool {
        self.city(a).map_or(false, |c| c.is_connected_to(b))
    }

    /// True if `a` has an edge to every city in `others`
    pub fn is_connected_to_all(&self, a: CityId, others: &[CityId]) -> bool {
        self.city(a).map_or(false, |c| c.is_connected_to_all(others))
    }

    pub fn set_length(&mut self, id: EdgeId, length: f64) -> Result<(), GraphError> {
        let edge = self.edge_mut(id)?;
        edge.set_length(length);
        let length = edge.length();
        self.emit(GraphEvent::LengthChanged { edge: id, length });
        Ok(())
    }

    pub fn set_pheromone(&mut self, id: EdgeId, pheromone: f64) -> Result<(), GraphError> {
        let edge = self.edge_mut(id)?;
        edge.set_pheromone(pheromone);
        let pheromone = edge.pheromone();
        self.emit(GraphEvent::PheromoneChanged { edge: id, pheromone });
        Ok(())
    }

    pub fn add_pheromone(&mut self, id: EdgeId, delta: f64) -> Result<(), GraphError> {
        let current = self.edge(id).ok_or(GraphError::UnknownEdge(id))?.pheromone();
        self.set_pheromone(id, current + delta)
    }

    pub fn set_selected(&mut self, id: EdgeId, selected: bool) -> Result<(), GraphError> {
        let edge = self.edge_mut(id)?;
        if edge.is_selected() == selected {
            return Ok(());
        }
        edge.set_selected(selected);
        self.emit(GraphEvent::SelectionChanged { edge: id, selected });
        Ok(())
    }

    /// Replace every edge's pheromone by `update(edge)`
    pub fn update_pheromones<F>(&mut self, mut update: F)
    where
        F: FnMut(&Edge) -> f64,
    {
        for i in 0..self.edges.len() {
            let Some(edge) = self.edges[i].as_mut() else {
                continue;
            };
            let next = update(edge);
            edge.set_pheromone(next);
            let pheromone = edge.pheromone();
            self.emit(GraphEvent::PheromoneChanged { edge: EdgeId(i), pheromone });
        }
    }

    /// Edges between consecutive cities of `path`.
    ///
    /// Fails with [`GraphError::DisconnectedPath`] on the first pair without an edge.
    pub fn path_edges(&self, path: &[CityId]) -> Result<Vec<EdgeId>, GraphError> {
        path.windows(2)
            .map(|pair| {
                self.edge_between(pair[0], pair[1]).ok_or(GraphError::DisconnectedPath {
                    from: pair[0],
                    to: pair[1],
                })
            })
            .collect()
    }

    /// Sum of edge lengths between consecutive cities of `path`
    pub fn path_length(&self, path: &[CityId]) -> Result<f64, GraphError> {
        let mut length = 0.0;
        for pair in path.windows(2) {
            let edge = self.distance_to(pair[0], pair[1]).ok_or(GraphError::DisconnectedPath {
                from: pair[0],
                to: pair[1],
            })?;
            length += edge.length();
        }
        Ok(length)
    }

    /// Mark exactly the edges of `path` as selected
    pub fn select_path(&mut self, path: &[CityId]) -> Result<(), GraphError> {
        let on_path = self.path_edges(path)?;
        let ids: Vec<EdgeId> = self.edges().map(|(id, _)| id).collect();
        for id in ids {
            self.set_selected(id, on_path.contains(&id))?;
        }
        Ok(())
    }

    fn check_city(&self, id: CityId) -> Result<(), GraphError> {
        if id.index() < self.cities.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownCity(id))
        }
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, GraphError> {
        self.edges
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(GraphError::UnknownEdge(id))
    }

    fn emit(&self, event: GraphEvent) {
        if let Some(observer) = &self.observer {
            observer.notify(&event);
        }
    }
}

/// Clones cities and edges. The observer is not carried over.
impl Clone for Graph {
    fn clone(&self) -> Self {
        Graph {
            name: self.name.clone(),
            cities: self.cities.clone(),
            names: self.names.clone(),
            edges: self.edges.clone(),
            observer: None,
        }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("cities", &self.cities)
            .field("edges", &self.edges)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl TrailGraph for Graph {
    type Edge = Edge;

    fn city_ids(&self) -> Vec<CityId> {
        (0..self.cities.len()).map(CityId).collect()
    }

    fn distance_to(&self, from: CityId, to: CityId) -> Option<&Edge> {
        Graph::distance_to(self, from, to)
    }
}
