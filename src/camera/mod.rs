//! Menu camera: a fixed-axis perspective camera with a dolly.

/// Camera struct and projection math.
pub mod core;

pub use self::core::Camera;
