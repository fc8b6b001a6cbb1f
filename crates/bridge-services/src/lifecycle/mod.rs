//! Startup and shutdown of the whole bridge.

pub mod bridge_system;

pub use bridge_system::*;
