#[macro_use]
pub mod macros;

use observer_core::population::enter_mode;
use observer_reality_lib::model::{EngineConfig, ObserverEngine, ObserverMode};
use observer_data::{Particle, Trail};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Builds an engine around hand-placed particles.
///
/// Without any `with_particle` call the engine spawns its own population of
/// `population_size` particles.
#[allow(dead_code)]
pub struct EngineBuilder {
    config: EngineConfig,
    particles: Vec<Particle>,
}

#[allow(dead_code)]
impl EngineBuilder {
    pub fn new() -> Self {
        let mut config = EngineConfig::default();
        config.simulation.seed = Some(42);
        config.simulation.population_size = 10;
        Self {
            config,
            particles: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.simulation.seed = Some(seed);
        self
    }

    pub fn with_observer(mut self, mode: ObserverMode) -> Self {
        self.config.simulation.observer_type = mode;
        self
    }

    pub fn with_population(mut self, population: usize) -> Self {
        self.config.simulation.population_size = population;
        self
    }

    pub fn with_surface(mut self, width: f64, height: f64) -> Self {
        self.config.surface.width = width;
        self.config.surface.height = height;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut EngineConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Adds a resting particle; ids follow insertion order.
    pub fn with_particle(self, x: f64, y: f64) -> Self {
        self.with_moving_particle(x, y, 0.0, 0.0)
    }

    pub fn with_moving_particle(mut self, x: f64, y: f64, vx: f64, vy: f64) -> Self {
        let mut p = Particle::new(self.particles.len() as u32, x, y).with_velocity(vx, vy);
        p.trail = Trail::with_capacity(self.config.physics.trail_capacity);
        self.particles.push(p);
        self
    }

    pub fn build(self) -> ObserverEngine {
        let mut engine =
            ObserverEngine::new(self.config).expect("Failed to create engine in test builder");
        if !self.particles.is_empty() {
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            let descriptor = engine.descriptor().clone();
            let mut particles = self.particles;
            for p in &mut particles {
                enter_mode(p, &descriptor, &mut rng);
            }
            engine
                .set_particles(particles)
                .expect("Builder particles carry sequential ids");
        }
        engine
    }
}

/// Runs `n` ticks with a fixed 16 ms frame delta.
#[allow(dead_code)]
pub fn run_ticks(engine: &mut ObserverEngine, n: usize) {
    engine.start();
    for _ in 0..n {
        engine.tick_with_delta(std::time::Duration::from_millis(16));
    }
}
