//! Configuration management for simulation parameters.
//!
//! Strongly-typed structures mapping to an optional `config.toml`. Every field
//! has a default, so a partial file only overrides what it names.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [simulation]
//! population_size = 250
//! observer_type = "classical"
//! seed = 42
//!
//! [surface]
//! width = 1024.0
//! height = 768.0
//!
//! [physics]
//! max_connections = 4000
//! ```

use crate::error::ConfigurationError;
use crate::modes::ObserverMode;
use serde::{Deserialize, Serialize};

/// Top-level knobs exposed to the host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub population_size: usize,
    pub observer_type: ObserverMode,
    pub enable_telemetry: bool,
    pub seed: Option<u64>,
    pub evolution_speed: f64,
    /// Observation fidelity in `[0, 100]`; lower budgets blur the telemetry.
    pub computational_budget: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            observer_type: ObserverMode::Quantum,
            enable_telemetry: true,
            seed: None,
            evolution_speed: 1.0,
            computational_budget: 100.0,
        }
    }
}

/// Dimensions of the simulation surface. Positions live in `[0, width] x [0, height]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Constants of the force and integration rules.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub max_speed: f64,
    pub damping: f64,
    pub force_strength: f64,
    /// Half-width of the uniform noise added to each velocity component per tick.
    pub thermal_noise: f64,
    pub trail_capacity: usize,
    pub max_connections: usize,
    /// Telemetry is aggregated on ticks where `tick % telemetry_interval == 0`.
    pub telemetry_interval: u64,
    /// Fraction of c that relativistic particles are clamped to.
    pub speed_of_light_margin: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_speed: 3.0,
            damping: 0.99,
            force_strength: 0.01,
            thermal_noise: 0.01,
            trail_capacity: 30,
            max_connections: 2000,
            telemetry_interval: 30,
            speed_of_light_margin: 0.999,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub surface: Surface,
    pub physics: PhysicsConfig,
}

/// Largest accepted surface width or height.
pub const MAX_SURFACE_EXTENT: f64 = 10_000.0;

/// `anyhow::ensure!` for validation rules that report a [`ConfigurationError`].
macro_rules! ensure_cfg {
    ($cond:expr, $msg:expr $(,)?) => {
        if !$cond {
            return Err(ConfigurationError::invalid($msg));
        }
    };
}

impl EngineConfig {
    /// Validates all configuration parameters, reporting the first failure.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // Simulation validation
        let sim = &self.simulation;
        ensure_cfg!(sim.population_size > 0, "Population size must be positive");
        ensure_cfg!(
            sim.population_size <= 20_000,
            "Population size too large (max 20000)"
        );
        ensure_cfg!(
            sim.evolution_speed.is_finite() && sim.evolution_speed >= 0.0,
            "Evolution speed must be a non-negative number"
        );
        ensure_cfg!(
            (0.0..=100.0).contains(&sim.computational_budget),
            "Computational budget must be in [0, 100]"
        );

        // Surface validation
        ensure_cfg!(
            self.surface.width.is_finite() && self.surface.width > 0.0,
            "Surface width must be positive"
        );
        ensure_cfg!(
            self.surface.width <= MAX_SURFACE_EXTENT,
            "Surface width too large (max 10000)"
        );
        ensure_cfg!(
            self.surface.height.is_finite() && self.surface.height > 0.0,
            "Surface height must be positive"
        );
        ensure_cfg!(
            self.surface.height <= MAX_SURFACE_EXTENT,
            "Surface height too large (max 10000)"
        );

        // Physics validation
        let phys = &self.physics;
        ensure_cfg!(phys.max_speed > 0.0, "Max speed must be positive");
        ensure_cfg!(
            phys.damping > 0.0 && phys.damping <= 1.0,
            "Damping must be in (0, 1]"
        );
        ensure_cfg!(
            phys.force_strength >= 0.0,
            "Force strength must be non-negative"
        );
        ensure_cfg!(
            phys.thermal_noise >= 0.0,
            "Thermal noise must be non-negative"
        );
        ensure_cfg!(phys.max_connections > 0, "Max connections must be positive");
        ensure_cfg!(
            phys.telemetry_interval > 0,
            "Telemetry interval must be positive"
        );
        ensure_cfg!(
            phys.speed_of_light_margin > 0.0 && phys.speed_of_light_margin < 1.0,
            "Speed of light margin must be in (0, 1)"
        );

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if it exists, falling back to defaults otherwise.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Digest of everything that shapes the dynamics, for tagging runs in logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.surface).as_bytes());
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(self.simulation.observer_type.as_str().as_bytes());
        hasher.update(format!("{:?}", self.simulation.seed).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_population_rejected() {
        let config = EngineConfig {
            simulation: SimulationConfig {
                population_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_budget_out_of_range_rejected() {
        let config = EngineConfig {
            simulation: SimulationConfig {
                computational_budget: 120.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_surface_rejected() {
        let mut config = EngineConfig::default();
        config.surface.width = 1e9;
        config.surface.height = 1e9;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Invalid(msg)) if msg.contains("width too large")
        ));

        config.surface.width = MAX_SURFACE_EXTENT;
        config.surface.height = MAX_SURFACE_EXTENT + 1.0;
        assert!(config.validate().is_err());

        config.surface.height = MAX_SURFACE_EXTENT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_margin_of_one_rejected() {
        let config = EngineConfig {
            physics: PhysicsConfig {
                speed_of_light_margin: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [simulation]
            population_size = 42
            observer_type = "relativistic"

            [surface]
            width = 320.0
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.population_size, 42);
        assert_eq!(config.simulation.observer_type, ObserverMode::Relativistic);
        assert_eq!(config.surface.width, 320.0);
        assert_eq!(config.surface.height, 600.0);
        assert_eq!(config.physics.max_connections, 2000);
    }

    #[test]
    fn test_unknown_observer_in_toml_fails() {
        let result = EngineConfig::from_toml(
            r#"
            [simulation]
            observer_type = "omniscient"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = EngineConfig::default();
        let mut b = EngineConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.physics.damping = 0.95;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_surface_contains_edges() {
        let s = Surface::new(10.0, 5.0);
        assert!(s.contains(0.0, 0.0));
        assert!(s.contains(10.0, 5.0));
        assert!(!s.contains(10.1, 1.0));
        assert!(!s.contains(1.0, -0.1));
    }
}
