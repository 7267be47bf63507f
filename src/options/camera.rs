use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Camera projection and dolly parameters.
pub struct CameraOptions {
    /// Resting camera distance before the `scale` multiplier.
    pub base_distance: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Visible world height, as a fraction of the sphere radius, that the
    /// field of view is fitted to.
    pub target_height: f32,
    /// Extra distance per unit of rotation velocity while dragging.
    pub dolly_per_velocity: f32,
    /// Constant pull-back applied while dragging.
    pub drag_pullback: f32,
    /// Damping divisor while idle (larger is slower).
    pub idle_damping: f32,
    /// Damping divisor while dragging.
    pub drag_damping: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            base_distance: 3.0,
            znear: 0.1,
            zfar: 40.0,
            target_height: 0.35,
            dolly_per_velocity: 80.0,
            drag_pullback: 2.5,
            idle_damping: 5.0,
            drag_damping: 7.0,
        }
    }
}
