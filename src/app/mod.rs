//! Host runners standing in for a display's frame scheduler.

pub mod shutdown;

pub use shutdown::ShutdownManager;

use observer_core::{ObserverEngine, ObserverMode};
use observer_data::TelemetryRecord;
use serde::Serialize;
use std::time::{Duration, Instant};

/// What the binary prints once a run ends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub observer: ObserverMode,
    pub ticks: u64,
    pub elapsed_ms: u128,
    pub fingerprint: String,
    pub telemetry: TelemetryRecord,
}

impl RunSummary {
    fn capture(engine: &ObserverEngine, ticks: u64, started: Instant) -> Self {
        Self {
            observer: engine.mode(),
            ticks,
            elapsed_ms: started.elapsed().as_millis(),
            fingerprint: engine.config().fingerprint(),
            telemetry: engine.telemetry().clone(),
        }
    }
}

/// Ticks `ticks` times back to back.
pub fn run_headless(engine: &mut ObserverEngine, ticks: u64) -> RunSummary {
    let started = Instant::now();
    engine.start();
    let mut ran = 0;
    while ran < ticks && engine.tick() {
        ran += 1;
    }
    engine.stop();
    tracing::info!(ticks = ran, elapsed_ms = started.elapsed().as_millis() as u64, "Headless run finished");
    RunSummary::capture(engine, ran, started)
}

/// Ticks on a fixed interval of `1 / fps` until `ticks` ran or shutdown is requested.
pub async fn run_realtime(
    engine: &mut ObserverEngine,
    ticks: u64,
    fps: u32,
    shutdown: &ShutdownManager,
) -> RunSummary {
    let started = Instant::now();
    let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    engine.start();
    let mut ran = 0;
    while ran < ticks && !shutdown.is_shutdown_requested() {
        interval.tick().await;
        if !engine.tick() {
            break;
        }
        ran += 1;
    }
    engine.stop();
    tracing::info!(ticks = ran, fps = engine.fps(), "Realtime run finished");
    RunSummary::capture(engine, ran, started)
}
