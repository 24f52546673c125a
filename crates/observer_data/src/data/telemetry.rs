use serde::{Deserialize, Serialize};

/// Snapshot of every derived metric. Replaced wholesale on each aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub fps: u32,
    pub particle_count: usize,
    pub connection_count: usize,
    /// Shannon entropy of the occupancy grid, in bits.
    pub entropy: f64,
    pub temperature: f64,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    /// Position spread times velocity spread.
    pub uncertainty: f64,
    pub network_density: f64,
    pub free_energy: f64,
    pub spatial_spread: f64,
    pub avg_velocity: f64,
    /// Bits missing from the maximum attainable entropy.
    pub info_deficit: f64,
    pub computational_cost: u64,
    pub component_count: usize,
    pub integrated_information: f64,
}

/// Numeric fields of [`TelemetryRecord`] addressable as chart series.
/// Serialized names match the record's JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Fps,
    ParticleCount,
    ConnectionCount,
    Entropy,
    Temperature,
    KineticEnergy,
    PotentialEnergy,
    TotalEnergy,
    Uncertainty,
    NetworkDensity,
    FreeEnergy,
    SpatialSpread,
    AvgVelocity,
    InfoDeficit,
    ComputationalCost,
    ComponentCount,
    IntegratedInformation,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::Fps,
        Metric::ParticleCount,
        Metric::ConnectionCount,
        Metric::Entropy,
        Metric::Temperature,
        Metric::KineticEnergy,
        Metric::PotentialEnergy,
        Metric::TotalEnergy,
        Metric::Uncertainty,
        Metric::NetworkDensity,
        Metric::FreeEnergy,
        Metric::SpatialSpread,
        Metric::AvgVelocity,
        Metric::InfoDeficit,
        Metric::ComputationalCost,
        Metric::ComponentCount,
        Metric::IntegratedInformation,
    ];

    #[must_use]
    pub fn read(self, record: &TelemetryRecord) -> f64 {
        match self {
            Metric::Fps => f64::from(record.fps),
            Metric::ParticleCount => record.particle_count as f64,
            Metric::ConnectionCount => record.connection_count as f64,
            Metric::Entropy => record.entropy,
            Metric::Temperature => record.temperature,
            Metric::KineticEnergy => record.kinetic_energy,
            Metric::PotentialEnergy => record.potential_energy,
            Metric::TotalEnergy => record.total_energy,
            Metric::Uncertainty => record.uncertainty,
            Metric::NetworkDensity => record.network_density,
            Metric::FreeEnergy => record.free_energy,
            Metric::SpatialSpread => record.spatial_spread,
            Metric::AvgVelocity => record.avg_velocity,
            Metric::InfoDeficit => record.info_deficit,
            Metric::ComputationalCost => record.computational_cost as f64,
            Metric::ComponentCount => record.component_count as f64,
            Metric::IntegratedInformation => record.integrated_information,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metric::Fps => "FPS",
            Metric::ParticleCount => "Particles (N)",
            Metric::ConnectionCount => "Connections (E)",
            Metric::Entropy => "Shannon Entropy (H)",
            Metric::Temperature => "Temperature (T)",
            Metric::KineticEnergy => "Kinetic Energy (K)",
            Metric::PotentialEnergy => "Potential Energy (U)",
            Metric::TotalEnergy => "Total Energy (E)",
            Metric::Uncertainty => "Uncertainty (Δx·Δp)",
            Metric::NetworkDensity => "Network Density (ρ)",
            Metric::FreeEnergy => "Free Energy (F)",
            Metric::SpatialSpread => "Spatial Spread (σᵣ)",
            Metric::AvgVelocity => "Avg Velocity (⟨v⟩)",
            Metric::InfoDeficit => "Info Deficit (ΔH)",
            Metric::ComputationalCost => "Complexity (C)",
            Metric::ComponentCount => "Components",
            Metric::IntegratedInformation => "Integrated Information (Φ)",
        }
    }
}
