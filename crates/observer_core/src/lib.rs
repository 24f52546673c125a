//! # Observer Core
//!
//! Simulation and telemetry engine for a population of point particles seen
//! through one of eight observer modes.
//!
//! This crate contains:
//! - The observer mode registry and per-mode descriptors
//! - Particle spawning and in-place mode switching
//! - A flat-array spatial hash shared by the force and connection passes
//! - The force solver and its per-mode post-integration rules
//! - Proximity-graph construction and network analysis
//! - The telemetry aggregator and a bounded telemetry history
//! - The simulation controller driving the per-tick pipeline
//!
//! ## Example
//!
//! ```
//! use observer_core::{EngineConfig, ObserverEngine, ObserverMode};
//!
//! let mut config = EngineConfig::default();
//! config.simulation.population_size = 50;
//! config.simulation.seed = Some(7);
//!
//! let mut engine = ObserverEngine::new(config).unwrap();
//! engine.set_observer(ObserverMode::Thermodynamic);
//! engine.start();
//! engine.play();
//! for _ in 0..30 {
//!     engine.tick();
//! }
//! assert_eq!(engine.telemetry().particle_count, 50);
//! ```

pub mod config;
pub mod connections;
pub mod controller;
pub mod error;
pub mod forces;
pub mod graph;
pub mod history;
pub mod metrics;
pub mod modes;
pub mod population;
pub mod spatial_hash;
pub mod telemetry;

pub use config::{EngineConfig, PhysicsConfig, SimulationConfig, Surface};
pub use controller::{Frame, FrameSink, ObserverEngine, RunState, COOL_FACTOR, HEAT_FACTOR};
pub use error::ConfigurationError;
pub use history::TelemetryHistory;
pub use modes::{ModeDescriptor, ObserverMode};
