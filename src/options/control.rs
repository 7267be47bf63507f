use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Arcball tuning. The defaults are hand-tuned; only their relative
/// magnitudes matter.
pub struct ControlOptions {
    /// Radius of the virtual trackball in normalized viewport units.
    pub trackball_radius: f32,
    /// Fraction of the pointer displacement consumed per frame while
    /// dragging.
    pub pointer_intensity: f32,
    /// Multiplier on the per-frame drag angle.
    pub angle_amplification: f32,
    /// Squared displacement below which a drag frame counts as still.
    pub drag_epsilon: f32,
    /// Per-frame slerp factor pulling the pointer spin back to rest when
    /// idle.
    pub idle_damping: f32,
    /// Strength of the snap correction toward the nearest item.
    pub snap_intensity: f32,
    /// Per-frame slerp factor of the smoothed spin used for axis/velocity.
    pub axis_smoothing: f32,
    /// Per-frame EMA factor of the rotation velocity.
    pub velocity_smoothing: f32,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            trackball_radius: 2.0,
            pointer_intensity: 0.3,
            angle_amplification: 5.0,
            drag_epsilon: 0.1,
            idle_damping: 0.1,
            snap_intensity: 0.2,
            axis_smoothing: 0.8,
            velocity_smoothing: 0.5,
        }
    }
}
