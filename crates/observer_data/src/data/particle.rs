use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Palette used for social clusters, indexed by `cluster % len`.
pub const CLUSTER_COLORS: [&str; 5] = ["#ff4757", "#3498db", "#2ecc71", "#ffa502", "#9b59b6"];

/// A past position recorded in a classical trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
}

/// Bounded FIFO of past positions. Pushing past capacity evicts the oldest point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub const DEFAULT_CAPACITY: usize = 30;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(TrailPoint { x, y });
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest point first.
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TrailPoint> {
        self.points.back()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

/// How strongly a conscious particle's last prediction missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surprise {
    Calm,
    Alert,
    Surprised,
}

/// Predictive state carried by every particle, only advanced in conscious mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_x: f64,
    pub predicted_y: f64,
    /// Exponentially smoothed distance between prediction and outcome.
    pub error: f64,
}

impl Prediction {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            predicted_x: x,
            predicted_y: y,
            error: 0.0,
        }
    }

    /// Error intensity normalised to `[0, 1]` (an error of 3 units saturates).
    #[must_use]
    pub fn intensity(&self) -> f64 {
        (self.error / 3.0).min(1.0)
    }

    #[must_use]
    pub fn surprise(&self) -> Surprise {
        let intensity = self.intensity();
        if intensity > 0.5 {
            Surprise::Surprised
        } else if intensity > 0.2 {
            Surprise::Alert
        } else {
            Surprise::Calm
        }
    }
}

/// Per-particle heat state (thermodynamic mode).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    pub temperature: f64,
    pub heat_capacity: f64,
}

/// Per-particle relativistic state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativisticState {
    pub proper_time: f64,
    pub rest_mass: f64,
    pub lorentz_factor: f64,
}

impl RelativisticState {
    /// `γ m c²` for the current Lorentz factor.
    #[must_use]
    pub fn total_energy(&self, speed_of_light: f64) -> f64 {
        self.lorentz_factor * self.rest_mass * speed_of_light * speed_of_light
    }
}

/// Per-particle belief state (probabilistic mode). `probability` is an
/// independent confidence score, not one entry of a population-wide distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    pub probability: f64,
    pub variance: f64,
}

/// A point particle.
///
/// Mode-specific blocks are `Some` only while the matching observer mode is
/// active; the controller adds and removes them in place on a mode switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub cluster: u32,
    pub trail: Trail,
    pub prediction: Prediction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relativistic: Option<RelativisticState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belief: Option<BeliefState>,
}

impl Particle {
    /// A bare particle at rest with empty mode state.
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            cluster: 0,
            trail: Trail::default(),
            prediction: Prediction::at(x, y),
            thermal: None,
            relativistic: None,
            belief: None,
        }
    }

    #[must_use]
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Particle) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rescales velocity to `limit` if it is faster, keeping direction.
    pub fn cap_speed(&mut self, limit: f64) {
        let speed = self.speed();
        if speed > limit && speed > 0.0 {
            self.vx = self.vx / speed * limit;
            self.vy = self.vy / speed * limit;
        }
    }

    #[must_use]
    pub fn cluster_color(&self) -> &'static str {
        CLUSTER_COLORS[self.cluster as usize % CLUSTER_COLORS.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_evicts_oldest() {
        let mut trail = Trail::with_capacity(3);
        for i in 0..5 {
            trail.push(f64::from(i), 0.0);
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
        assert_eq!(trail.latest().map(|p| p.x), Some(4.0));
    }

    #[test]
    fn test_zero_capacity_trail_stays_empty() {
        let mut trail = Trail::with_capacity(0);
        trail.push(1.0, 1.0);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_cap_speed_preserves_direction() {
        let mut p = Particle::new(0, 0.0, 0.0).with_velocity(3.0, 4.0);
        p.cap_speed(2.5);
        assert!((p.speed() - 2.5).abs() < 1e-12);
        assert!((p.vx / p.vy - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_cap_speed_ignores_slow_particles() {
        let mut p = Particle::new(0, 0.0, 0.0).with_velocity(0.3, -0.4);
        p.cap_speed(3.0);
        assert_eq!((p.vx, p.vy), (0.3, -0.4));
    }

    #[test]
    fn test_surprise_levels() {
        let mut pred = Prediction::at(0.0, 0.0);
        assert_eq!(pred.surprise(), Surprise::Calm);
        pred.error = 1.2;
        assert_eq!(pred.surprise(), Surprise::Alert);
        pred.error = 9.0;
        assert_eq!(pred.surprise(), Surprise::Surprised);
        assert_eq!(pred.intensity(), 1.0);
    }

    #[test]
    fn test_cluster_color_wraps() {
        let mut p = Particle::new(7, 0.0, 0.0);
        p.cluster = 6;
        assert_eq!(p.cluster_color(), CLUSTER_COLORS[1]);
    }

    #[test]
    fn test_mode_blocks_omitted_from_json_when_absent() {
        let p = Particle::new(1, 2.0, 3.0);
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("thermal"));
        assert!(!json.contains("belief"));
        let back: Particle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
