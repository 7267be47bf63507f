//! Shared utilities.

/// Frame clock for hosts that drive the engine.
pub mod frame_timing;

pub use frame_timing::FrameTiming;
