//! # Event Handlers
//!
//! Background consumers of the engine bus.

pub mod event_recorder;

pub use event_recorder::EventRecorder;
