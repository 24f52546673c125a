//! Telemetry aggregator.
//!
//! Every metric is recomputed from the current particles and edges on each
//! call. Nothing is carried between calls; frame rate is owned by the
//! controller and merged in afterwards.

use crate::config::Surface;
use crate::graph::ProximityGraph;
use observer_data::{Connection, Particle, TelemetryRecord};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Range under which the short-range repulsive term applies.
pub const REPULSION_RANGE: f64 = 20.0;

/// Inputs besides the particle and edge slices.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryContext {
    pub surface: Surface,
    pub connection_distance: f64,
    /// Observation fidelity in `[0, 100]`.
    pub budget: f64,
}

/// Side length of the entropy grid: `max(5, floor(20 * budget / 100))`.
#[inline]
#[must_use]
pub fn grid_resolution(budget: f64) -> usize {
    let g = (20.0 * budget.clamp(0.0, 100.0) / 100.0).floor() as usize;
    g.max(5)
}

/// Maximum attainable entropy for a `g x g` grid, `log2(g²)`.
#[inline]
#[must_use]
pub fn max_entropy(resolution: usize) -> f64 {
    ((resolution * resolution) as f64).log2()
}

/// Particle counts over a `resolution x resolution` partition of the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    pub resolution: usize,
    /// Row-major counts, `counts[cy * resolution + cx]`.
    pub counts: Vec<usize>,
    pub total: usize,
}

impl OccupancyGrid {
    pub fn from_particles(particles: &[Particle], surface: Surface, resolution: usize) -> Self {
        let resolution = resolution.max(1);
        let cell_w = surface.width / resolution as f64;
        let cell_h = surface.height / resolution as f64;
        let last = resolution - 1;
        let mut counts = vec![0; resolution * resolution];

        let bucket = |v: f64, size: f64| -> usize {
            let c = (v / size).floor();
            if c.is_nan() || c < 0.0 {
                0
            } else {
                (c as usize).min(last)
            }
        };

        for p in particles {
            let cx = bucket(p.x, cell_w);
            let cy = bucket(p.y, cell_h);
            counts[cy * resolution + cx] += 1;
        }

        Self {
            resolution,
            counts,
            total: particles.len(),
        }
    }

    /// Shannon entropy in bits over occupied cells.
    #[must_use]
    pub fn shannon_entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum()
    }

    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Entropy as seen by an observer with the given budget.
///
/// The raw occupancy entropy is blended toward the maximum by
/// `(100 - budget) / 100`: a blurrier observer sees more disorder.
#[must_use]
pub fn observed_entropy(particles: &[Particle], surface: Surface, budget: f64) -> f64 {
    if particles.is_empty() {
        return 0.0;
    }
    let resolution = grid_resolution(budget);
    let raw = OccupancyGrid::from_particles(particles, surface, resolution).shannon_entropy();
    let max = max_entropy(resolution);
    let observer_uncertainty = (100.0 - budget.clamp(0.0, 100.0)) / 100.0;
    raw + (max - raw) * observer_uncertainty
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Moments {
    /// Mean squared distance from the centroid.
    pos_variance: f64,
    vel_variance: f64,
}

fn moments(particles: &[Particle]) -> Moments {
    if particles.is_empty() {
        return Moments::default();
    }
    let n = particles.len() as f64;
    let (sx, sy, svx, svy) = particles.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, p| {
        (acc.0 + p.x, acc.1 + p.y, acc.2 + p.vx, acc.3 + p.vy)
    });
    let (mean_x, mean_y, mean_vx, mean_vy) = (sx / n, sy / n, svx / n, svy / n);

    let (pv, vv) = particles.iter().fold((0.0, 0.0), |acc, p| {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        let dvx = p.vx - mean_vx;
        let dvy = p.vy - mean_vy;
        (acc.0 + dx * dx + dy * dy, acc.1 + dvx * dvx + dvy * dvy)
    });

    Moments {
        pos_variance: pv / n,
        vel_variance: vv / n,
    }
}

/// Position spread times velocity spread, each variance inflated by the
/// measurement error `1 + (100 - budget) / 50`. Zero below two particles.
#[must_use]
pub fn uncertainty_product(particles: &[Particle], budget: f64) -> f64 {
    if particles.len() < 2 {
        return 0.0;
    }
    let m = moments(particles);
    let measurement_error = 1.0 + (100.0 - budget.clamp(0.0, 100.0)) / 50.0;
    (m.pos_variance * measurement_error).sqrt() * (m.vel_variance * measurement_error).sqrt()
}

/// Mean of `½ v²`.
#[must_use]
pub fn kinetic_energy(particles: &[Particle]) -> f64 {
    let sum: f64 = particles
        .iter()
        .map(|p| 0.5 * (p.vx * p.vx + p.vy * p.vy))
        .sum();
    sum / particles.len().max(1) as f64
}

#[inline]
fn pair_potential(a: &Particle, b: &Particle, connection_distance: f64) -> f64 {
    let dist = a.distance_to(b);
    let mut u = 0.0;
    if dist < connection_distance {
        u -= 1.0 / (dist + 1.0);
    }
    if dist < REPULSION_RANGE {
        u += 10.0 / (dist + 1.0);
    }
    u
}

/// Pairwise potential over all `N(N-1)/2` pairs, divided by `max(1, N)`.
///
/// Long-range attraction `-1/(d+1)` inside the connection distance and
/// short-range repulsion `+10/(d+1)` inside [`REPULSION_RANGE`]. This is the
/// quadratic pass of the aggregator and deliberately ignores the spatial index.
#[must_use]
pub fn potential_energy(particles: &[Particle], connection_distance: f64) -> f64 {
    let n = particles.len();
    let row = |i: usize| -> f64 {
        let a = &particles[i];
        particles[i + 1..]
            .iter()
            .map(|b| pair_potential(a, b, connection_distance))
            .sum::<f64>()
    };

    #[cfg(feature = "parallel")]
    let total: f64 = (0..n).into_par_iter().map(row).sum();
    #[cfg(not(feature = "parallel"))]
    let total: f64 = (0..n).map(row).sum();

    total / n.max(1) as f64
}

/// Root-mean-square distance from the centroid.
#[must_use]
pub fn spatial_spread(particles: &[Particle]) -> f64 {
    moments(particles).pos_variance.sqrt()
}

#[must_use]
pub fn average_speed(particles: &[Particle]) -> f64 {
    if particles.is_empty() {
        return 0.0;
    }
    particles.iter().map(Particle::speed).sum::<f64>() / particles.len() as f64
}

/// `|E| / (N(N-1)/2)`, zero below two particles.
#[must_use]
pub fn network_density(particle_count: usize, connection_count: usize) -> f64 {
    if particle_count < 2 {
        return 0.0;
    }
    let max_connections = (particle_count * (particle_count - 1)) as f64 / 2.0;
    connection_count as f64 / max_connections
}

/// Computes the full record. `fps` is left at zero for the caller to merge.
#[must_use]
pub fn aggregate(
    particles: &[Particle],
    connections: &[Connection],
    ctx: &TelemetryContext,
) -> TelemetryRecord {
    let n = particles.len();
    let budget = ctx.budget.clamp(0.0, 100.0);

    let entropy = observed_entropy(particles, ctx.surface, budget);
    let uncertainty = uncertainty_product(particles, budget);
    let kinetic = kinetic_energy(particles);
    let temperature = kinetic.sqrt() * 0.1;
    let potential = potential_energy(particles, ctx.connection_distance);
    let free_energy = potential - temperature * entropy * 0.01;
    let info_deficit = max_entropy(grid_resolution(budget)) - entropy;

    let graph = ProximityGraph::new(n, connections);

    TelemetryRecord {
        fps: 0,
        particle_count: n,
        connection_count: connections.len(),
        entropy,
        temperature,
        kinetic_energy: kinetic,
        potential_energy: potential,
        total_energy: kinetic + potential,
        uncertainty,
        network_density: network_density(n, connections.len()),
        free_energy,
        spatial_spread: spatial_spread(particles),
        avg_velocity: average_speed(particles),
        info_deficit,
        computational_cost: (n as u64) * (n as u64),
        component_count: if n == 0 { 0 } else { graph.component_count() },
        integrated_information: graph.integrated_information(),
    }
}
