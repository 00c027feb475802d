//! nodegate-core — configuration, well-known keys, and string normalization
//! shared by the nodegate crates.

pub mod config;
pub mod keys;
pub mod text;

pub use config::{GateConfig, SchedulingPolicy};
pub use text::normalize;
