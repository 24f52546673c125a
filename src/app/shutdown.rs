//! Ctrl+C handling for the realtime runner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag, set by the signal task and polled between ticks.
#[derive(Debug, Clone, Default)]
pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a task that requests shutdown on Ctrl+C. Needs a tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received, stopping simulation...");
                flag.request_shutdown();
            }
        });
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_request_is_shared() {
        let manager = ShutdownManager::new();
        let clone = manager.clone();
        assert!(!manager.is_shutdown_requested());
        clone.request_shutdown();
        assert!(manager.is_shutdown_requested());
    }
}
