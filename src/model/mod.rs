pub use observer_core::{
    ConfigurationError, EngineConfig, Frame, FrameSink, ObserverEngine, ObserverMode, RunState,
};
pub mod config {
    pub use observer_core::config::*;
}
pub mod connections {
    pub use observer_core::connections::*;
}
pub mod controller {
    pub use observer_core::controller::*;
}
pub mod forces {
    pub use observer_core::forces::*;
}
pub mod graph {
    pub use observer_core::graph::*;
}
pub mod history {
    pub use observer_core::history::*;
}
pub mod metrics {
    pub use observer_core::metrics::*;
}
pub mod modes {
    pub use observer_core::modes::*;
}
pub mod population {
    pub use observer_core::population::*;
}
pub mod spatial_hash {
    pub use observer_core::spatial_hash::*;
}
pub mod telemetry {
    pub use observer_core::telemetry::*;
}
pub mod data {
    pub use observer_data::*;
}
