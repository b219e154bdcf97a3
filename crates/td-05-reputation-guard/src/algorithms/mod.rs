//! # Algorithms

pub mod window;

pub use window::{rolling_average, select_window};
