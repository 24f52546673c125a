//! Frame-rate bookkeeping and structured logging for the simulation.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of frame deltas in the rolling FPS window.
pub const FPS_WINDOW: usize = 30;
/// FPS is recomputed on frames where `frame % FPS_REFRESH == 0`.
pub const FPS_REFRESH: u64 = 10;

/// Rolling frame-rate estimate.
#[derive(Debug, Clone, Default)]
pub struct FrameMeter {
    deltas_ms: VecDeque<f64>,
    fps: u32,
}

impl FrameMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the time since the previous frame for frame number `frame`.
    pub fn record(&mut self, delta: Duration, frame: u64) {
        if self.deltas_ms.len() == FPS_WINDOW {
            self.deltas_ms.pop_front();
        }
        self.deltas_ms.push_back(delta.as_secs_f64() * 1000.0);

        if frame % FPS_REFRESH == 0 {
            let mean = self.deltas_ms.iter().sum::<f64>() / self.deltas_ms.len() as f64;
            self.fps = if mean > 0.0 {
                (1000.0 / mean).round() as u32
            } else {
                0
            };
        }
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn reset(&mut self) {
        self.deltas_ms.clear();
        self.fps = 0;
    }
}

/// Periodic tick logging.
#[derive(Debug, Clone)]
pub struct TickMetrics {
    tick_count: u64,
    log_interval: u64,
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl TickMetrics {
    #[must_use]
    pub fn new(log_interval: u64) -> Self {
        Self {
            tick_count: 0,
            log_interval: log_interval.max(1),
        }
    }

    /// Records a completed tick; logs at info level every `log_interval` ticks.
    pub fn record_tick(&mut self, frame_delta: Duration, particles: usize, connections: usize, fps: u32) {
        self.tick_count += 1;
        if self.tick_count % self.log_interval == 0 {
            tracing::info!(
                tick = self.tick_count,
                particles,
                connections,
                fps,
                frame_delta_us = frame_delta.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Initialise the tracing subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_refreshes_every_ten_frames() {
        let mut meter = FrameMeter::new();
        meter.record(Duration::from_millis(20), 0);
        assert_eq!(meter.fps(), 50);
        for frame in 1..10 {
            meter.record(Duration::from_millis(10), frame);
        }
        // Not yet refreshed.
        assert_eq!(meter.fps(), 50);
        meter.record(Duration::from_millis(10), 10);
        // Window: one 20 ms delta and ten 10 ms deltas.
        assert_eq!(meter.fps(), (1000.0 / (120.0 / 11.0) as f64).round() as u32);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut meter = FrameMeter::new();
        meter.record(Duration::from_millis(1000), 1);
        for frame in 2..=40 {
            meter.record(Duration::from_millis(20), frame);
        }
        // The slow first frame has left the window by frame 40.
        assert_eq!(meter.fps(), 50);
    }

    #[test]
    fn test_tick_metrics_counts() {
        let mut m = TickMetrics::new(2);
        m.record_tick(Duration::from_millis(1), 10, 4, 60);
        m.record_tick(Duration::from_millis(1), 10, 4, 60);
        assert_eq!(m.tick_count(), 2);
    }
}
