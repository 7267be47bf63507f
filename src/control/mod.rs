//! Pointer-driven sphere rotation.
//!
//! [`ArcballControl`] turns pointer drags into an orientation quaternion with
//! inertia, and pulls the sphere toward a snap target once released.

/// Arcball state machine and quaternion helpers.
pub mod arcball;

pub use arcball::{rotation_between, ArcballControl, FORWARD};

/// Whether the user is currently dragging the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// No pointer held; inertia decays and snapping is active.
    #[default]
    Idle,
    /// Pointer held down over the surface.
    Dragging,
}

/// Nominal frame duration the per-frame tuning constants are written for.
pub const TARGET_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Ratio of `dt` to the nominal frame, nudged off zero so it can divide.
#[must_use]
pub fn time_scale(dt: f32) -> f32 {
    dt / TARGET_FRAME_SECONDS + 1e-5
}
