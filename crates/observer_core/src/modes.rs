//! Observer mode registry.
//!
//! Each [`ObserverMode`] maps to a fixed [`ModeDescriptor`]. Components match on
//! the mode rather than comparing names, so adding a mode is a compile error
//! everywhere it is not handled.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObserverMode {
    #[default]
    Quantum,
    Classical,
    Social,
    Conscious,
    Ai,
    Thermodynamic,
    Relativistic,
    Probabilistic,
}

impl ObserverMode {
    pub const ALL: [ObserverMode; 8] = [
        ObserverMode::Quantum,
        ObserverMode::Classical,
        ObserverMode::Social,
        ObserverMode::Conscious,
        ObserverMode::Ai,
        ObserverMode::Thermodynamic,
        ObserverMode::Relativistic,
        ObserverMode::Probabilistic,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ObserverMode::Quantum => "quantum",
            ObserverMode::Classical => "classical",
            ObserverMode::Social => "social",
            ObserverMode::Conscious => "conscious",
            ObserverMode::Ai => "ai",
            ObserverMode::Thermodynamic => "thermodynamic",
            ObserverMode::Relativistic => "relativistic",
            ObserverMode::Probabilistic => "probabilistic",
        }
    }

    #[must_use]
    pub fn descriptor(self) -> ModeDescriptor {
        match self {
            ObserverMode::Quantum => ModeDescriptor {
                mode: self,
                label: "Quantum Observer",
                color: "#9b59b6",
                particle_size: 3.0,
                connection_distance: 100.0,
                cluster_count: None,
                show_ghosts: true,
                show_trails: false,
                speed_of_light: None,
            },
            ObserverMode::Classical => ModeDescriptor {
                mode: self,
                label: "Classical Observer",
                color: "#3498db",
                particle_size: 5.0,
                connection_distance: 150.0,
                cluster_count: None,
                show_ghosts: false,
                show_trails: true,
                speed_of_light: None,
            },
            ObserverMode::Social => ModeDescriptor {
                mode: self,
                label: "Social Observer",
                color: "#27ae60",
                particle_size: 6.0,
                connection_distance: 120.0,
                cluster_count: Some(5),
                show_ghosts: false,
                show_trails: false,
                speed_of_light: None,
            },
            ObserverMode::Conscious => ModeDescriptor {
                mode: self,
                label: "Conscious Observer",
                color: "#e67e22",
                particle_size: 4.0,
                connection_distance: 110.0,
                cluster_count: None,
                show_ghosts: false,
                show_trails: false,
                speed_of_light: None,
            },
            ObserverMode::Ai => ModeDescriptor {
                mode: self,
                label: "AI Observer",
                color: "#1abc9c",
                particle_size: 3.0,
                connection_distance: 90.0,
                cluster_count: None,
                show_ghosts: false,
                show_trails: false,
                speed_of_light: None,
            },
            ObserverMode::Thermodynamic => ModeDescriptor {
                mode: self,
                label: "Thermodynamic Observer",
                color: "#e74c3c",
                particle_size: 4.0,
                connection_distance: 100.0,
                cluster_count: None,
                show_ghosts: false,
                show_trails: false,
                speed_of_light: None,
            },
            ObserverMode::Relativistic => ModeDescriptor {
                mode: self,
                label: "Relativistic Observer",
                color: "#f1c40f",
                particle_size: 3.0,
                connection_distance: 130.0,
                cluster_count: None,
                show_ghosts: false,
                show_trails: false,
                speed_of_light: Some(5.0),
            },
            ObserverMode::Probabilistic => ModeDescriptor {
                mode: self,
                label: "Probabilistic Observer",
                color: "#95a5a6",
                particle_size: 4.0,
                connection_distance: 100.0,
                cluster_count: None,
                show_ghosts: false,
                show_trails: false,
                speed_of_light: None,
            },
        }
    }
}

impl fmt::Display for ObserverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObserverMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObserverMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownObserver(s.to_string()))
    }
}

/// Immutable parameters of one observer mode.
///
/// `color`, `particle_size` and the `show_*` flags are rendering hints the
/// engine passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeDescriptor {
    pub mode: ObserverMode,
    pub label: &'static str,
    pub color: &'static str,
    pub particle_size: f64,
    /// Proximity-graph radius; half of it is the force interaction radius.
    pub connection_distance: f64,
    pub cluster_count: Option<u32>,
    pub show_ghosts: bool,
    pub show_trails: bool,
    pub speed_of_light: Option<f64>,
}

impl ModeDescriptor {
    #[inline]
    #[must_use]
    pub fn force_radius(&self) -> f64 {
        self.connection_distance * 0.5
    }

    /// Builder-style override used by hosts and tests that tune a mode.
    #[must_use]
    pub fn with_connection_distance(mut self, distance: f64) -> Self {
        self.connection_distance = distance;
        self
    }

    #[must_use]
    pub fn with_speed_of_light(mut self, c: f64) -> Self {
        self.speed_of_light = Some(c);
        self
    }
}

impl Default for ModeDescriptor {
    fn default() -> Self {
        ObserverMode::default().descriptor()
    }
}
