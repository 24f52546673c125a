//! Plain data shared by the engine and its rendering collaborators.

pub mod data;

pub use data::connection::Connection;
pub use data::particle::{
    BeliefState, Particle, Prediction, RelativisticState, Surprise, ThermalState, Trail,
    TrailPoint, CLUSTER_COLORS,
};
pub use data::telemetry::{Metric, TelemetryRecord};
