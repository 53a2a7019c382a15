//! Cities (graph vertices) and the visiting protocol used by ants.

use super::EdgeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Index of a city inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityId(pub usize);

impl CityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// Arrival half of the visiting protocol.
    ///
    /// Removes this city from the ant's `remaining` list (nothing happens if it
    /// is not there) and returns it as the ant's new position.
    pub fn arrive(self, remaining: &mut Vec<CityId>) -> CityId {
        if let Some(pos) = remaining.iter().position(|&c| c == self) {
            remaining.remove(pos);
        }
        self
    }

    /// Departure half of the visiting protocol.
    ///
    /// Appends this city to the ant's `visited` sequence unless it is already
    /// the last entry.
    pub fn depart(self, visited: &mut Vec<CityId>) {
        if visited.last() != Some(&self) {
            visited.push(self);
        }
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A vertex of the graph
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    /// Name, unique within the graph
    name: String,
    /// Neighbor -> connecting edge
    adjacency: BTreeMap<CityId, EdgeId>,
}

impl City {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        City {
            name: name.into(),
            adjacency: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Edge leading to `other`, or `None` if there is no connection
    pub fn edge_to(&self, other: CityId) -> Option<EdgeId> {
        self.adjacency.get(&other).copied()
    }

    pub fn is_connected_to(&self, other: CityId) -> bool {
        self.adjacency.contains_key(&other)
    }

    /// True if every city in `others` is a neighbor
    pub fn is_connected_to_all(&self, others: &[CityId]) -> bool {
        others.iter().all(|&c| self.is_connected_to(c))
    }

    pub fn has_connections(&self) -> bool {
        !self.adjacency.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Neighbors in ascending id order
    pub fn neighbors(&self) -> impl Iterator<Item = (CityId, EdgeId)> + '_ {
        self.adjacency.iter().map(|(&c, &e)| (c, e))
    }

    /// Returns false and leaves the mapping unchanged if `other` is already a neighbor.
    pub(crate) fn link(&mut self, other: CityId, edge: EdgeId) -> bool {
        if self.adjacency.contains_key(&other) {
            return false;
        }
        self.adjacency.insert(other, edge);
        true
    }

    pub(crate) fn unlink(&mut self, other: CityId) -> Option<EdgeId> {
        self.adjacency.remove(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrive_removes_from_remaining() {
        let mut remaining = vec![CityId(0), CityId(1), CityId(2)];

        let current = CityId(1).arrive(&mut remaining);
        assert_eq!(current, CityId(1));
        assert_eq!(remaining, vec![CityId(0), CityId(2)]);

        // idempotent when absent
        CityId(1).arrive(&mut remaining);
        assert_eq!(remaining, vec![CityId(0), CityId(2)]);
    }

    #[test]
    fn test_depart_appends_once() {
        let mut visited = Vec::new();

        CityId(4).depart(&mut visited);
        CityId(4).depart(&mut visited);
        assert_eq!(visited, vec![CityId(4)]);

        CityId(2).depart(&mut visited);
        assert_eq!(visited, vec![CityId(4), CityId(2)]);
    }

    #[test]
    fn test_link_does_not_overwrite() {
        let mut city = City::new("A");

        assert!(city.link(CityId(1), EdgeId(0)));
        assert!(!city.link(CityId(1), EdgeId(5)));
        assert_eq!(city.edge_to(CityId(1)), Some(EdgeId(0)));
        assert_eq!(city.connection_count(), 1);

        assert_eq!(city.unlink(CityId(1)), Some(EdgeId(0)));
        assert_eq!(city.unlink(CityId(1)), None);
        assert!(!city.has_connections());
    }

    #[test]
    fn test_connected_to_all() {
        let mut city = City::new("A");
        city.link(CityId(1), EdgeId(0));
        city.link(CityId(2), EdgeId(1));

        assert!(city.is_connected_to_all(&[CityId(1), CityId(2)]));
        assert!(!city.is_connected_to_all(&[CityId(1), CityId(3)]));
        assert!(city.is_connected_to_all(&[]));
    }
}
