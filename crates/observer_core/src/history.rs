//! Bounded history of telemetry snapshots for time-series charts.

use observer_data::{Metric, TelemetryRecord};
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub tick: u64,
    pub record: TelemetryRecord,
}

/// Ring of the most recent snapshots, oldest first.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl TelemetryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, tick: u64, record: TelemetryRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(TelemetrySample { tick, record });
    }

    /// `(tick, value)` points for one metric, oldest first.
    #[must_use]
    pub fn series(&self, metric: Metric) -> Vec<(u64, f64)> {
        self.samples
            .iter()
            .map(|s| (s.tick, metric.read(&s.record)))
            .collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
