//! Change notifications for external observers (UI, tracing).
//!
//! The graph never depends on an observer: one may be attached with
//! [`Graph::with_observer`](super::Graph::with_observer) and is then called
//! after every property mutation.

use super::{CityId, EdgeId};

/// A property of a city or edge has changed
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    CityRenamed { city: CityId, name: String },
    LengthChanged { edge: EdgeId, length: f64 },
    PheromoneChanged { edge: EdgeId, pheromone: f64 },
    SelectionChanged { edge: EdgeId, selected: bool },
}

/// Receiver of graph change notifications
pub trait GraphObserver: Send + Sync {
    fn notify(&self, event: &GraphEvent);
}

impl<F> GraphObserver for F
where
    F: Fn(&GraphEvent) + Send + Sync,
{
    fn notify(&self, event: &GraphEvent) {
        self(event)
    }
}

/// Forwards every event to `log::trace!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl GraphObserver for LoggingObserver {
    fn notify(&self, event: &GraphEvent) {
        match event {
            GraphEvent::CityRenamed { city, name } => log::trace!("city {} renamed to '{}'", city, name),
            GraphEvent::LengthChanged { edge, length } => log::trace!("edge {} length = {}", edge, length),
            GraphEvent::PheromoneChanged { edge, pheromone } => {
                log::trace!("edge {} pheromone = {:.6}", edge, pheromone)
            }
            GraphEvent::SelectionChanged { edge, selected } => log::trace!("edge {} selected = {}", edge, selected),
        }
    }
}
