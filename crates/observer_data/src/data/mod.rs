//! Core data structures for the observer simulation.

pub mod connection;
pub mod particle;
pub mod telemetry;
