//! Particle store: spawning a population and managing mode-specific state.

use crate::config::Surface;
use crate::modes::{ModeDescriptor, ObserverMode};
use observer_data::{BeliefState, Particle, Prediction, RelativisticState, ThermalState, Trail};
use rand::Rng;

/// Ambient temperature thermodynamic particles relax toward.
pub const AMBIENT_TEMPERATURE: f64 = 50.0;

/// Spawns `size` particles for `descriptor`.
///
/// Ids are `0..size`. Social mode with `C` clusters partitions the surface
/// into a near-square grid of `C` regions and spawns each particle inside the
/// region of its randomly chosen cluster; every other mode spawns uniformly
/// over the whole surface. Velocity components start uniform in `[-1, 1]`.
pub fn create_particles<R: Rng>(
    size: usize,
    descriptor: &ModeDescriptor,
    surface: Surface,
    trail_capacity: usize,
    rng: &mut R,
) -> Vec<Particle> {
    let clusters = descriptor.cluster_count.filter(|&c| c > 0);
    let regions = match (descriptor.mode, clusters) {
        (ObserverMode::Social, Some(c)) => Some(RegionGrid::new(c, surface)),
        _ => None,
    };

    (0..size)
        .map(|i| {
            let cluster = clusters.map_or(0, |c| rng.gen_range(0..c));
            let (x, y) = match &regions {
                Some(grid) => grid.sample(cluster, rng),
                None => (
                    rng.gen::<f64>() * surface.width,
                    rng.gen::<f64>() * surface.height,
                ),
            };

            let mut p = Particle::new(i as u32, x, y).with_velocity(
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            );
            p.cluster = cluster;
            p.trail = Trail::with_capacity(trail_capacity);
            enter_mode(&mut p, descriptor, rng);
            p
        })
        .collect()
}

/// Spawn regions for social clusters: `cols = ceil(sqrt(C))`, `rows = ceil(C / cols)`.
#[derive(Debug, Clone, Copy)]
struct RegionGrid {
    cols: u32,
    region_width: f64,
    region_height: f64,
}

impl RegionGrid {
    fn new(clusters: u32, surface: Surface) -> Self {
        let cols = (f64::from(clusters).sqrt().ceil() as u32).max(1);
        let rows = clusters.div_ceil(cols).max(1);
        Self {
            cols,
            region_width: surface.width / f64::from(cols),
            region_height: surface.height / f64::from(rows),
        }
    }

    fn origin(&self, cluster: u32) -> (f64, f64) {
        (
            f64::from(cluster % self.cols) * self.region_width,
            f64::from(cluster / self.cols) * self.region_height,
        )
    }

    fn sample<R: Rng>(&self, cluster: u32, rng: &mut R) -> (f64, f64) {
        let (ox, oy) = self.origin(cluster);
        (
            ox + rng.gen::<f64>() * self.region_width,
            oy + rng.gen::<f64>() * self.region_height,
        )
    }
}

/// Initialises the state a particle needs while `descriptor` is active.
pub fn enter_mode<R: Rng>(p: &mut Particle, descriptor: &ModeDescriptor, rng: &mut R) {
    match descriptor.mode {
        ObserverMode::Classical => p.trail.clear(),
        ObserverMode::Social => {
            if let Some(c) = descriptor.cluster_count.filter(|&c| c > 0) {
                if p.cluster >= c {
                    p.cluster = p.id % c;
                }
            }
        }
        ObserverMode::Conscious => p.prediction = Prediction::at(p.x, p.y),
        ObserverMode::Thermodynamic => {
            p.thermal = Some(ThermalState {
                temperature: rng.gen_range(50.0..=150.0),
                heat_capacity: rng.gen_range(0.5..=1.5),
            });
        }
        ObserverMode::Relativistic => {
            p.relativistic = Some(RelativisticState {
                proper_time: 0.0,
                rest_mass: rng.gen_range(0.5..=2.0),
                lorentz_factor: 1.0,
            });
        }
        ObserverMode::Probabilistic => {
            p.belief = Some(BeliefState {
                probability: 0.5,
                variance: 1.0,
            });
        }
        ObserverMode::Quantum | ObserverMode::Ai => {}
    }
}

/// Drops the state owned by `mode` when the particle leaves it.
pub fn leave_mode(p: &mut Particle, mode: ObserverMode) {
    match mode {
        ObserverMode::Classical => p.trail.clear(),
        ObserverMode::Social => p.cluster = 0,
        ObserverMode::Conscious => p.prediction = Prediction::at(p.x, p.y),
        ObserverMode::Thermodynamic => p.thermal = None,
        ObserverMode::Relativistic => p.relativistic = None,
        ObserverMode::Probabilistic => p.belief = None,
        ObserverMode::Quantum | ObserverMode::Ai => {}
    }
}

/// Switches every particle from `from` to `to` in place.
///
/// Positions and velocities are untouched. Entering social mode reassigns
/// clusters deterministically as `id % cluster_count`.
pub fn switch_mode<R: Rng>(
    particles: &mut [Particle],
    from: ObserverMode,
    to: &ModeDescriptor,
    rng: &mut R,
) {
    if from == to.mode {
        return;
    }
    for p in particles.iter_mut() {
        leave_mode(p, from);
        if to.mode == ObserverMode::Social {
            if let Some(c) = to.cluster_count.filter(|&c| c > 0) {
                p.cluster = p.id % c;
            }
        }
        enter_mode(p, to, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_ids_are_dense_and_positions_in_bounds() {
        let surface = Surface::new(400.0, 300.0);
        for mode in ObserverMode::ALL {
            let ps = create_particles(64, &mode.descriptor(), surface, 30, &mut rng());
            assert_eq!(ps.len(), 64);
            let ids: HashSet<u32> = ps.iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), 64);
            assert!(ids.iter().all(|&id| id < 64));
            for p in &ps {
                assert!(surface.contains(p.x, p.y), "{mode}: ({}, {})", p.x, p.y);
                assert!((-1.0..=1.0).contains(&p.vx) && (-1.0..=1.0).contains(&p.vy));
            }
        }
    }

    #[test]
    fn test_empty_population() {
        let ps = create_particles(
            0,
            &ObserverMode::Social.descriptor(),
            Surface::default(),
            30,
            &mut rng(),
        );
        assert!(ps.is_empty());
    }

    #[test]
    fn test_social_particles_spawn_inside_their_region() {
        let surface = Surface::new(300.0, 200.0);
        let d = ObserverMode::Social.descriptor();
        let ps = create_particles(200, &d, surface, 30, &mut rng());
        // 5 clusters -> 3 columns, 2 rows of 100 x 100 regions.
        for p in &ps {
            assert!(p.cluster < 5);
            let col = f64::from(p.cluster % 3);
            let row = f64::from(p.cluster / 3);
            assert!(p.x >= col * 100.0 && p.x <= (col + 1.0) * 100.0);
            assert!(p.y >= row * 100.0 && p.y <= (row + 1.0) * 100.0);
        }
    }

    #[test]
    fn test_mode_state_initialised_per_mode() {
        let surface = Surface::default();
        let thermo = create_particles(
            20,
            &ObserverMode::Thermodynamic.descriptor(),
            surface,
            30,
            &mut rng(),
        );
        for p in &thermo {
            let t = p.thermal.expect("thermal state").temperature;
            assert!((50.0..=150.0).contains(&t));
            assert!(p.relativistic.is_none() && p.belief.is_none());
        }

        let quantum = create_particles(
            5,
            &ObserverMode::Quantum.descriptor(),
            surface,
            30,
            &mut rng(),
        );
        assert!(quantum.iter().all(|p| p.thermal.is_none() && p.cluster == 0));
    }

    #[test]
    fn test_switch_into_social_assigns_id_modulo() {
        let mut ps = create_particles(
            12,
            &ObserverMode::Quantum.descriptor(),
            Surface::default(),
            30,
            &mut rng(),
        );
        let before: Vec<(f64, f64, f64, f64)> = ps.iter().map(|p| (p.x, p.y, p.vx, p.vy)).collect();
        switch_mode(
            &mut ps,
            ObserverMode::Quantum,
            &ObserverMode::Social.descriptor(),
            &mut rng(),
        );
        for (p, b) in ps.iter().zip(&before) {
            assert_eq!(p.cluster, p.id % 5);
            assert_eq!((p.x, p.y, p.vx, p.vy), *b);
        }
    }

    #[test]
    fn test_switch_removes_previous_mode_state() {
        let mut ps = create_particles(
            4,
            &ObserverMode::Relativistic.descriptor(),
            Surface::default(),
            30,
            &mut rng(),
        );
        switch_mode(
            &mut ps,
            ObserverMode::Relativistic,
            &ObserverMode::Probabilistic.descriptor(),
            &mut rng(),
        );
        for p in &ps {
            assert!(p.relativistic.is_none());
            assert_eq!(p.belief.map(|b| b.probability), Some(0.5));
        }
    }
}
