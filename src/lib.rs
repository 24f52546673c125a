#[cfg(not(target_arch = "wasm32"))]
pub mod app;
pub mod model;

#[cfg(target_arch = "wasm32")]
use crate::model::{EngineConfig, ObserverEngine};
#[cfg(target_arch = "wasm32")]
use observer_core::{COOL_FACTOR, HEAT_FACTOR};
#[cfg(target_arch = "wasm32")]
use std::time::Duration;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> Option<f64> {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
}

/// Browser-facing control API. The page calls `tick()` from `requestAnimationFrame`
/// and draws from `frame()`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct Simulation {
    engine: ObserverEngine,
    last_frame_ms: Option<f64>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl Simulation {
    #[wasm_bindgen(constructor)]
    pub fn new(population: usize, observer: &str) -> Result<Simulation, JsValue> {
        console_error_panic_hook::set_once();

        let mut config = EngineConfig::default();
        config.simulation.population_size = population;
        config.simulation.observer_type = observer
            .parse()
            .map_err(|e: observer_core::ConfigurationError| JsValue::from_str(&e.to_string()))?;
        config.simulation.seed = Some((js_sys::Math::random() * f64::from(u32::MAX)) as u64);

        let engine =
            ObserverEngine::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Simulation {
            engine,
            last_frame_ms: None,
        })
    }

    pub fn start(&mut self) {
        self.last_frame_ms = None;
        self.engine.start();
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn tick(&mut self) -> bool {
        let now = now_ms();
        let delta = match (now, self.last_frame_ms) {
            (Some(now), Some(prev)) if now >= prev => Duration::from_secs_f64((now - prev) / 1000.0),
            _ => Duration::ZERO,
        };
        self.last_frame_ms = now;
        self.engine.tick_with_delta(delta)
    }

    pub fn set_observer(&mut self, name: &str) -> Result<(), JsValue> {
        self.engine
            .set_observer_by_name(name)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_population(&mut self, population: usize) {
        self.engine.set_population(population);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.engine.set_speed(speed);
    }

    pub fn set_budget(&mut self, budget: f64) {
        self.engine.set_budget(budget);
    }

    pub fn play(&mut self) {
        self.engine.play();
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn toggle_play(&mut self) -> bool {
        self.engine.toggle_play()
    }

    pub fn add_heat(&mut self, factor: Option<f64>) {
        self.engine.add_heat(factor.unwrap_or(HEAT_FACTOR));
    }

    pub fn remove_heat(&mut self, factor: Option<f64>) {
        self.engine.remove_heat(factor.unwrap_or(COOL_FACTOR));
    }

    pub fn telemetry(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.telemetry())
    }

    /// Current particles, edges and descriptor in the shape of a render `Frame`.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        to_js(&crate::model::Frame {
            tick: self.engine.frame_count(),
            playing: self.engine.is_playing(),
            descriptor: self.engine.descriptor(),
            particles: self.engine.particles(),
            connections: self.engine.connections(),
            telemetry: self.engine.telemetry(),
        })
    }

    /// `[tick, value]` pairs for a metric named by its telemetry key, e.g. `"freeEnergy"`.
    pub fn history(&self, metric: &str) -> Result<JsValue, JsValue> {
        let metric: observer_data::Metric =
            serde_json::from_value(serde_json::Value::String(metric.to_owned()))
                .map_err(|_| JsValue::from_str(&format!("Unknown metric: {metric}")))?;
        to_js(&self.engine.history().series(metric))
    }
}
