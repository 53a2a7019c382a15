//! The ant: a single tour-building agent.
//!
//! An ant starts on a city, then repeatedly picks its next city among those
//! it has not visited yet, with probability proportional to
//! `(1 / length)^beta * pheromone^alpha` (roulette-wheel selection). It only
//! reads the graph: all state it mutates is its own, so ants of the same round
//! can run in parallel over a shared `&Graph`.

use crate::error::AntError;
use crate::graph::{CityId, TrailEdge, TrailGraph};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Exponents of the decision rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntParams {
    /// Pheromone importance
    pub alpha: f64,
    /// Inverse-distance importance
    pub beta: f64,
}

impl Default for AntParams {
    fn default() -> Self {
        AntParams { alpha: 1.0, beta: 2.5 }
    }
}

/// Tour-building agent
#[derive(Debug, Clone)]
pub struct Ant {
    /// Cities already on the tour, in visiting order
    visited: Vec<CityId>,
    /// City currently occupied
    current: CityId,
    /// Cities still to visit; iteration order of the roulette wheel
    remaining: Vec<CityId>,
    params: AntParams,
    rng: ChaCha8Rng,
}

impl Ant {
    /// Create an ant on a uniformly random city of `cities`.
    pub fn new(cities: &[CityId], params: AntParams, mut rng: ChaCha8Rng) -> Result<Self, AntError> {
        if cities.is_empty() {
            return Err(AntError::NoCities);
        }
        let start = cities[rng.gen_range(0..cities.len())];
        Self::starting_at(start, cities, params, rng)
    }

    /// Create an ant seeded from `seed`
    pub fn with_seed(cities: &[CityId], params: AntParams, seed: u64) -> Result<Self, AntError> {
        Self::new(cities, params, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create an ant on a chosen start city, which must be one of `cities`.
    pub fn starting_at(
        start: CityId,
        cities: &[CityId],
        params: AntParams,
        rng: ChaCha8Rng,
    ) -> Result<Self, AntError> {
        if cities.is_empty() {
            return Err(AntError::NoCities);
        }
        if !cities.contains(&start) {
            return Err(AntError::StartNotInCities(start));
        }

        let mut remaining = Vec::with_capacity(cities.len());
        for &city in cities {
            if !remaining.contains(&city) {
                remaining.push(city);
            }
        }
        let current = start.arrive(&mut remaining);

        Ok(Ant {
            visited: Vec::with_capacity(cities.len()),
            current,
            remaining,
            params,
            rng,
        })
    }

    pub fn current(&self) -> CityId {
        self.current
    }

    pub fn visited(&self) -> &[CityId] {
        &self.visited
    }

    pub fn remaining(&self) -> &[CityId] {
        &self.remaining
    }

    pub fn alpha(&self) -> f64 {
        self.params.alpha
    }

    pub fn beta(&self) -> f64 {
        self.params.beta
    }

    pub fn params(&self) -> AntParams {
        self.params
    }

    /// True once every city has been entered
    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Unnormalized attractiveness of moving from the current city to `to`.
    /// Unreachable cities weigh 0.
    pub fn weight<G: TrailGraph>(&self, graph: &G, to: CityId) -> f64 {
        match graph.distance_to(self.current, to) {
            Some(edge) => {
                let w = (1.0 / edge.length()).powf(self.params.beta) * edge.pheromone().powf(self.params.alpha);
                if w.is_nan() {
                    0.0
                } else {
                    w
                }
            }
            None => 0.0,
        }
    }

    /// Weight of every remaining city, in roulette order
    pub fn weights<G: TrailGraph>(&self, graph: &G) -> Vec<(CityId, f64)> {
        self.remaining.iter().map(|&c| (c, self.weight(graph, c))).collect()
    }

    /// Normalized selection probability of every remaining city.
    ///
    /// Fails with [`AntError::InfeasibleDecision`] when no remaining city is
    /// reachable.
    pub fn probabilities<G: TrailGraph>(&self, graph: &G) -> Result<Vec<(CityId, f64)>, AntError> {
        let weights = normalize_infinite(self.weights(graph));
        let total: f64 = weights.iter().map(|&(_, w)| w).sum();
        if total <= 0.0 {
            return Err(self.infeasible());
        }
        Ok(weights.into_iter().map(|(c, w)| (c, w / total)).collect())
    }

    /// Move to the next city and return it.
    ///
    /// Once finished this is a no-op returning the current city. On
    /// [`AntError::InfeasibleDecision`] the ant's state is left unchanged.
    pub fn advance<G: TrailGraph>(&mut self, graph: &G) -> Result<CityId, AntError> {
        if self.is_finished() {
            return Ok(self.current);
        }

        let next = self.decide(graph)?;
        self.current.depart(&mut self.visited);
        self.current = next.arrive(&mut self.remaining);

        Ok(self.current)
    }

    /// The complete tour, starting at the first city.
    ///
    /// Fails with [`AntError::NotFinished`] while cities remain.
    pub fn tour(&mut self) -> Result<&[CityId], AntError> {
        if !self.is_finished() {
            return Err(AntError::NotFinished {
                remaining: self.remaining.len(),
            });
        }
        self.current.depart(&mut self.visited);
        Ok(&self.visited)
    }

    /// Advance until finished and return the tour
    pub fn complete_tour<G: TrailGraph>(&mut self, graph: &G) -> Result<Vec<CityId>, AntError> {
        while !self.is_finished() {
            self.advance(graph)?;
        }
        self.tour().map(<[CityId]>::to_vec)
    }

    /// Prepare the ant for another traversal starting where it stopped.
    ///
    /// `remaining` becomes the visited cities minus the current one (followed
    /// by any city that was never reached), `visited` is cleared and `current`
    /// is kept as the new start.
    pub fn reset_for_reuse(&mut self) {
        let current = self.current;
        let mut remaining: Vec<CityId> = self.visited.drain(..).filter(|&c| c != current).collect();
        for city in self.remaining.drain(..) {
            if city != current && !remaining.contains(&city) {
                remaining.push(city);
            }
        }
        self.remaining = remaining;
    }

    /// Roulette-wheel pick among the remaining cities
    fn decide<G: TrailGraph>(&mut self, graph: &G) -> Result<CityId, AntError> {
        let weights = normalize_infinite(self.weights(graph));
        let total: f64 = weights.iter().map(|&(_, w)| w).sum();
        if total <= 0.0 {
            return Err(self.infeasible());
        }

        let draw: f64 = self.rng.gen();
        roulette(&weights, total, draw).ok_or_else(|| self.infeasible())
    }

    fn infeasible(&self) -> AntError {
        AntError::InfeasibleDecision {
            from: self.current,
            remaining: self.remaining.len(),
        }
    }
}

/// Pick the first candidate whose cumulative share `w / total` reaches `draw`.
///
/// Zero-weight candidates are never picked. When rounding leaves the running
/// sum below `draw`, the last candidate with a positive weight is returned.
fn roulette(weights: &[(CityId, f64)], total: f64, draw: f64) -> Option<CityId> {
    let mut cumulative = 0.0;
    let mut fallback = None;
    for &(city, w) in weights {
        if w <= 0.0 {
            continue;
        }
        cumulative += w / total;
        if cumulative >= draw {
            return Some(city);
        }
        fallback = Some(city);
    }
    fallback
}

/// If some weights overflowed to infinity, only those stay eligible, equally likely.
fn normalize_infinite(weights: Vec<(CityId, f64)>) -> Vec<(CityId, f64)> {
    if !weights.iter().any(|&(_, w)| w.is_infinite()) {
        return weights;
    }
    weights
        .into_iter()
        .map(|(c, w)| (c, if w.is_infinite() { 1.0 } else { 0.0 }))
        .collect()
}
