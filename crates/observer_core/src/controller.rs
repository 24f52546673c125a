//! Simulation controller: tick ordering and the external control API.
//!
//! The host drives the engine by calling [`ObserverEngine::tick`] from its own
//! scheduler (display refresh, a timer, or a plain loop in tests). Running
//! decides whether a tick does anything at all; playing decides whether forces
//! evolve during it.

use crate::config::EngineConfig;
use crate::connections::build_connections;
use crate::error::{ConfigurationError, Result};
use crate::forces::{self, StepContext};
use crate::history::TelemetryHistory;
use crate::metrics::{FrameMeter, TickMetrics};
use crate::modes::{ModeDescriptor, ObserverMode};
use crate::population::{create_particles, switch_mode};
use crate::spatial_hash::SpatialHash;
use crate::telemetry::{self, TelemetryContext};
use observer_data::{Connection, Particle, TelemetryRecord};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Velocity multiplier used by hosts for a default "add heat" action.
pub const HEAT_FACTOR: f64 = 1.3;
/// Velocity multiplier used by hosts for a default "remove heat" action.
pub const COOL_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Read-only view handed to the renderer once per tick.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame<'a> {
    pub tick: u64,
    pub playing: bool,
    pub descriptor: &'a ModeDescriptor,
    pub particles: &'a [Particle],
    pub connections: &'a [Connection],
    pub telemetry: &'a TelemetryRecord,
}

/// Render seam. Closures taking `&Frame` implement it directly.
pub trait FrameSink {
    fn render(&mut self, frame: &Frame<'_>);
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame<'_>),
{
    fn render(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

pub struct ObserverEngine {
    config: EngineConfig,
    descriptor: ModeDescriptor,
    particles: Vec<Particle>,
    connections: Vec<Connection>,
    telemetry: TelemetryRecord,
    history: TelemetryHistory,
    frame_meter: FrameMeter,
    tick_metrics: TickMetrics,
    state: RunState,
    playing: bool,
    frame_count: u64,
    last_tick: Option<Instant>,
    rng: ChaCha8Rng,
    force_grid: SpatialHash,
    link_grid: SpatialHash,
    sink: Option<Box<dyn FrameSink>>,
}

impl std::fmt::Debug for ObserverEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverEngine")
            .field("mode", &self.descriptor.mode)
            .field("particles", &self.particles.len())
            .field("connections", &self.connections.len())
            .field("state", &self.state)
            .field("playing", &self.playing)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl ObserverEngine {
    /// Validates `config` and spawns its initial population. The engine starts
    /// Stopped and paused; forces stay frozen until [`play`](Self::play).
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mode = config.simulation.observer_type;
        let population = config.simulation.population_size;

        let mut engine = Self {
            descriptor: mode.descriptor(),
            particles: Vec::new(),
            connections: Vec::new(),
            telemetry: TelemetryRecord::default(),
            history: TelemetryHistory::default(),
            frame_meter: FrameMeter::new(),
            tick_metrics: TickMetrics::default(),
            state: RunState::Stopped,
            playing: false,
            frame_count: 0,
            last_tick: None,
            rng,
            force_grid: SpatialHash::default(),
            link_grid: SpatialHash::default(),
            sink: None,
            config,
        };
        tracing::info!(fingerprint = %engine.config.fingerprint(), "Engine configured");
        engine.create(population, mode);
        Ok(engine)
    }

    /// Rebuilds the whole population for `mode`, discarding edges and telemetry.
    pub fn create(&mut self, population: usize, mode: ObserverMode) {
        self.descriptor = mode.descriptor();
        self.config.simulation.population_size = population;
        self.config.simulation.observer_type = mode;

        self.particles = create_particles(
            population,
            &self.descriptor,
            self.config.surface,
            self.config.physics.trail_capacity,
            &mut self.rng,
        );
        self.rebuild_connections();
        self.telemetry = TelemetryRecord::default();
        self.history.clear();

        tracing::info!(population, mode = %mode, "Population created");
    }

    /// Replaces the population with hand-built particles, keeping the mode.
    ///
    /// Particle ids must be `0..len` in slice order; anything else is rejected
    /// and the current population is kept.
    pub fn set_particles(&mut self, particles: Vec<Particle>) -> Result<()> {
        if let Some((index, p)) = particles
            .iter()
            .enumerate()
            .find(|(index, p)| p.id as usize != *index)
        {
            return Err(ConfigurationError::invalid(format!(
                "Particle at index {index} has id {}",
                p.id
            )));
        }
        self.config.simulation.population_size = particles.len();
        self.particles = particles;
        self.rebuild_connections();
        Ok(())
    }

    pub fn start(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        self.state = RunState::Running;
        self.last_tick = None;
        tracing::info!(frame = self.frame_count, "Simulation started");
    }

    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        self.state = RunState::Stopped;
        tracing::info!(frame = self.frame_count, "Simulation stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Runs one tick timed against the previous call. Returns `false` when stopped.
    pub fn tick(&mut self) -> bool {
        if self.state == RunState::Stopped {
            return false;
        }
        let now = Instant::now();
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |prev| now.duration_since(prev));
        self.last_tick = Some(now);
        self.tick_with_delta(delta)
    }

    /// Runs one tick with an externally measured frame delta.
    ///
    /// Order: frame-rate bookkeeping, force step, connection rebuild, render,
    /// then telemetry on every `telemetry_interval`-th frame.
    pub fn tick_with_delta(&mut self, delta: Duration) -> bool {
        if self.state == RunState::Stopped {
            return false;
        }

        self.frame_meter.record(delta, self.frame_count);

        let ctx = StepContext {
            descriptor: &self.descriptor,
            physics: &self.config.physics,
            surface: self.config.surface,
            evolution_speed: self.config.simulation.evolution_speed,
            playing: self.playing,
        };
        forces::step(&mut self.particles, &ctx, &mut self.force_grid, &mut self.rng);

        self.rebuild_connections();
        self.render();

        if self.config.simulation.enable_telemetry
            && self.frame_count % self.config.physics.telemetry_interval == 0
        {
            self.refresh_telemetry();
        }

        self.frame_count += 1;
        self.tick_metrics.record_tick(
            delta,
            self.particles.len(),
            self.connections.len(),
            self.frame_meter.fps(),
        );
        true
    }

    fn rebuild_connections(&mut self) {
        self.connections = build_connections(
            &self.particles,
            self.descriptor.connection_distance,
            self.config.physics.max_connections,
            &mut self.link_grid,
        );
    }

    fn render(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let frame = Frame {
                tick: self.frame_count,
                playing: self.playing,
                descriptor: &self.descriptor,
                particles: &self.particles,
                connections: &self.connections,
                telemetry: &self.telemetry,
            };
            sink.render(&frame);
        }
    }

    fn refresh_telemetry(&mut self) {
        let ctx = TelemetryContext {
            surface: self.config.surface,
            connection_distance: self.descriptor.connection_distance,
            budget: self.config.simulation.computational_budget,
        };
        let mut record = telemetry::aggregate(&self.particles, &self.connections, &ctx);
        record.fps = self.frame_meter.fps();

        tracing::debug!(
            frame = self.frame_count,
            entropy = record.entropy,
            total_energy = record.total_energy,
            "Telemetry aggregated"
        );
        self.history.record(self.frame_count, record.clone());
        self.telemetry = record;
    }

    /// Switches the active observer in place, keeping positions and velocities.
    pub fn set_observer(&mut self, mode: ObserverMode) {
        let from = self.descriptor.mode;
        if from == mode {
            return;
        }
        let descriptor = mode.descriptor();
        switch_mode(&mut self.particles, from, &descriptor, &mut self.rng);
        self.descriptor = descriptor;
        self.config.simulation.observer_type = mode;
        self.rebuild_connections();
        tracing::info!(from = %from, to = %mode, "Observer switched");
    }

    /// Like [`set_observer`](Self::set_observer) for hosts holding a mode name.
    pub fn set_observer_by_name(&mut self, name: &str) -> Result<()> {
        let mode = name.parse::<ObserverMode>()?;
        self.set_observer(mode);
        Ok(())
    }

    pub fn set_population(&mut self, population: usize) {
        self.create(population, self.descriptor.mode);
    }

    /// Scales force and noise magnitudes. Negative values become zero.
    pub fn set_speed(&mut self, speed: f64) {
        self.config.simulation.evolution_speed = speed.max(0.0);
    }

    /// Sets the observation budget, clamped to `[0, 100]`. NaN is ignored.
    pub fn set_budget(&mut self, budget: f64) {
        if budget.is_nan() {
            return;
        }
        self.config.simulation.computational_budget = budget.clamp(0.0, 100.0);
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flips the playing flag and returns its new value.
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// One-shot scaling of every velocity by `factor`.
    pub fn add_heat(&mut self, factor: f64) {
        self.scale_velocities(factor);
    }

    pub fn remove_heat(&mut self, factor: f64) {
        self.scale_velocities(factor);
    }

    fn scale_velocities(&mut self, factor: f64) {
        for p in &mut self.particles {
            p.vx *= factor;
            p.vy *= factor;
        }
    }

    pub fn set_frame_sink<S: FrameSink + 'static>(&mut self, sink: S) {
        self.sink = Some(Box::new(sink));
    }

    pub fn clear_frame_sink(&mut self) {
        self.sink = None;
    }

    /// Last computed snapshot; never recomputed on read.
    #[must_use]
    pub fn telemetry(&self) -> &TelemetryRecord {
        &self.telemetry
    }

    #[must_use]
    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[must_use]
    pub fn descriptor(&self) -> &ModeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn mode(&self) -> ObserverMode {
        self.descriptor.mode
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.config.simulation.evolution_speed
    }

    #[must_use]
    pub fn budget(&self) -> f64 {
        self.config.simulation.computational_budget
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.frame_meter.fps()
    }
}
