//! Virtual-trackball rotation with inertia and snapping.

use glam::{Quat, Vec2, Vec3};

use super::{time_scale, ControlState};
use crate::options::ControlOptions;

/// Direction from the sphere center toward the camera. The item nearest to
/// it is the active one, and snapping rotates the target onto it.
pub const FORWARD: Vec3 = Vec3::Z;

/// Arcball controller owning the sphere orientation.
#[derive(Debug, Clone)]
pub struct ArcballControl {
    options: ControlOptions,
    state: ControlState,
    viewport: Vec2,
    pointer: Vec2,
    previous_pointer: Vec2,
    orientation: Quat,
    pointer_rotation: Quat,
    /// Low-passed `snap * pointer`, the source of the exposed axis.
    smoothed_rotation: Quat,
    rotation_axis: Vec3,
    velocity_ema: f32,
    rotation_velocity: f32,
    snap_target: Option<Vec3>,
}

impl ArcballControl {
    /// Identity orientation, idle, for a `width` x `height` viewport.
    #[must_use]
    pub fn new(options: ControlOptions, width: f32, height: f32) -> Self {
        Self {
            options,
            state: ControlState::Idle,
            viewport: Vec2::new(width, height),
            pointer: Vec2::ZERO,
            previous_pointer: Vec2::ZERO,
            orientation: Quat::IDENTITY,
            pointer_rotation: Quat::IDENTITY,
            smoothed_rotation: Quat::IDENTITY,
            rotation_axis: Vec3::X,
            velocity_ema: 0.0,
            rotation_velocity: 0.0,
            snap_target: None,
        }
    }

    /// Begin a drag at `(x, y)` in viewport pixels.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
        self.previous_pointer = self.pointer;
        self.state = ControlState::Dragging;
    }

    /// End the drag; inertia and snapping take over.
    pub fn pointer_up(&mut self) {
        self.state = ControlState::Idle;
    }

    /// The pointer left the surface; treated like a release.
    pub fn pointer_leave(&mut self) {
        self.state = ControlState::Idle;
    }

    /// Track the pointer. Ignored unless dragging.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.state == ControlState::Dragging {
            self.pointer = Vec2::new(x, y);
        }
    }

    /// Viewport size in the same units as pointer coordinates.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Set (or clear) the world-space direction to snap onto [`FORWARD`].
    pub fn set_snap_target(&mut self, direction: Option<Vec3>) {
        self.snap_target = direction;
    }

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let ts = time_scale(dt);
        let opts = &self.options;
        let mut snap_rotation = Quat::IDENTITY;

        match self.state {
            ControlState::Dragging => {
                let intensity = opts.pointer_intensity * ts;
                let mid = (self.pointer - self.previous_pointer) * intensity;
                if mid.length_squared() > opts.drag_epsilon {
                    let mid = mid + self.previous_pointer;
                    let a = self.project(mid).normalize();
                    let b = self.project(self.previous_pointer).normalize();
                    self.previous_pointer = mid;
                    self.pointer_rotation =
                        rotation_between(a, b, opts.angle_amplification);
                } else {
                    self.pointer_rotation =
                        approach(self.pointer_rotation, Quat::IDENTITY, intensity);
                }
            }
            ControlState::Idle => {
                self.pointer_rotation = approach(
                    self.pointer_rotation,
                    Quat::IDENTITY,
                    opts.idle_damping * ts,
                );
                if let Some(target) = self.snap_target {
                    let distance_factor =
                        (1.0 - target.distance_squared(FORWARD) * 10.0).max(0.1);
                    snap_rotation = rotation_between(
                        target,
                        FORWARD,
                        ts * opts.snap_intensity * distance_factor,
                    );
                }
            }
        }

        let combined = snap_rotation * self.pointer_rotation;
        self.orientation = (combined * self.orientation).normalize();

        self.smoothed_rotation =
            approach(self.smoothed_rotation, combined, opts.axis_smoothing * ts)
                .normalize();
        let w = self.smoothed_rotation.w.clamp(-1.0, 1.0);
        let angle = w.acos() * 2.0;
        let s = (angle / 2.0).sin();
        let mut raw_velocity = 0.0;
        if s > 1e-6 {
            raw_velocity = angle / std::f32::consts::TAU;
            self.rotation_axis = Vec3::new(
                self.smoothed_rotation.x,
                self.smoothed_rotation.y,
                self.smoothed_rotation.z,
            ) / s;
        }

        self.velocity_ema +=
            (raw_velocity - self.velocity_ema) * opts.velocity_smoothing * ts;
        self.rotation_velocity = self.velocity_ema / ts;
    }

    /// Map a viewport position onto the virtual trackball (Bell's sphere and
    /// hyperbola blend), mirrored on x.
    #[must_use]
    pub fn project(&self, pos: Vec2) -> Vec3 {
        let r = self.options.trackball_radius;
        let (w, h) = (self.viewport.x, self.viewport.y);
        let s = (w.max(h) - 1.0).max(1.0);
        let x = (2.0 * pos.x - w - 1.0) / s;
        let y = (2.0 * pos.y - h - 1.0) / s;
        let d2 = x * x + y * y;
        let r2 = r * r;
        let z = if d2 <= r2 / 2.0 {
            (r2 - d2).sqrt()
        } else {
            r2 / (2.0 * d2.sqrt())
        };
        Vec3::new(-x, y, z)
    }

    /// Current sphere orientation (unit length).
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Idle or dragging.
    #[must_use]
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Whether the pointer is held.
    #[must_use]
    pub fn is_pointer_down(&self) -> bool {
        self.state == ControlState::Dragging
    }

    /// Smoothed angular speed in turns per nominal frame.
    #[must_use]
    pub fn rotation_velocity(&self) -> f32 {
        self.rotation_velocity
    }

    /// Axis of the smoothed per-frame rotation.
    #[must_use]
    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation_axis
    }

    /// Direction currently being snapped onto [`FORWARD`], if any.
    #[must_use]
    pub fn snap_target(&self) -> Option<Vec3> {
        self.snap_target
    }
}

/// Rotation carrying unit vector `a` toward `b`, with the angle between them
/// multiplied by `factor`. Parallel or opposite inputs give identity.
#[must_use]
pub fn rotation_between(a: Vec3, b: Vec3, factor: f32) -> Quat {
    let axis = a.cross(b);
    if axis.length_squared() <= 1e-12 {
        return Quat::IDENTITY;
    }
    let angle = a.dot(b).clamp(-1.0, 1.0).acos() * factor;
    Quat::from_axis_angle(axis.normalize(), angle)
}

/// Slerp from `from` toward `to` by `t`, clamped so long frames never
/// overshoot.
fn approach(from: Quat, to: Quat, t: f32) -> Quat {
    from.slerp(to, t.clamp(0.0, 1.0))
}
