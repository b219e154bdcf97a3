//! # Engine Container
//!
//! Configuration and dependency wiring for the engine.

pub mod config;
pub mod services;

pub use config::{ConfigError, EngineConfig};
pub use services::EngineContainer;
