use serde::{Deserialize, Serialize};

/// An undirected proximity edge. Always stored with `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: u32,
    pub target: u32,
    pub distance: f64,
}

impl Connection {
    /// Builds an edge with the endpoints ordered by id.
    pub fn new(a: u32, b: u32, distance: f64) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source,
            target,
            distance,
        }
    }

    /// Closeness in `[0, 1]`: 1 at zero distance, 0 at `max_distance`.
    #[must_use]
    pub fn strength(&self, max_distance: f64) -> f64 {
        if max_distance <= 0.0 {
            return 0.0;
        }
        (1.0 - self.distance / max_distance).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn touches(&self, id: u32) -> bool {
        self.source == id || self.target == id
    }
}
