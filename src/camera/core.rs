use glam::{Mat4, Vec3};

use crate::options::CameraOptions;

/// Perspective camera on the +Z axis looking at the sphere center.
///
/// The projection is only recomputed on [`resize`](Self::resize); the eye
/// distance changes every frame through [`dolly`](Self::dolly) but the field
/// of view stays tied to the distance at the last resize.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub eye: Vec3,
    /// Look-at target.
    pub target: Vec3,
    /// Up direction.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Radius of the sphere being framed.
    pub sphere_radius: f32,
    /// Fraction of the radius kept in view vertically (or horizontally on
    /// portrait viewports).
    pub target_height: f32,
    projection: Mat4,
}

impl Camera {
    /// Camera at `distance` along +Z framing a sphere of `sphere_radius`.
    #[must_use]
    pub fn new(options: &CameraOptions, sphere_radius: f32, distance: f32) -> Self {
        let mut camera = Self {
            eye: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy: std::f32::consts::FRAC_PI_4,
            znear: options.znear,
            zfar: options.zfar,
            sphere_radius,
            target_height: options.target_height,
            projection: Mat4::IDENTITY,
        };
        camera.projection = camera.build_projection();
        camera
    }

    /// Recompute aspect, field of view and projection for a viewport.
    /// Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        let half_height = self.sphere_radius * self.target_height;
        let distance = self.eye.z.max(f32::EPSILON);
        self.fovy = if self.aspect > 1.0 {
            2.0 * (half_height / distance).atan()
        } else {
            2.0 * (half_height / self.aspect / distance).atan()
        };
        self.projection = self.build_projection();
    }

    /// Ease the eye distance toward `target_z`; `damping` is the number of
    /// nominal frames to close the gap (larger is slower).
    pub fn dolly(&mut self, target_z: f32, damping: f32) {
        self.eye.z += (target_z - self.eye.z) / damping.max(1.0);
    }

    /// View matrix.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection matrix from the last resize.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    fn build_projection(&self) -> Mat4 {
        // perspective_rh uses the [0,1] depth range wgpu expects.
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraOptions::default(), 2.0, 3.0)
    }

    #[test]
    fn resize_is_idempotent() {
        let mut cam = camera();
        cam.resize(1280, 720);
        let first = cam.projection();
        cam.resize(1280, 720);
        assert_eq!(first, cam.projection());
    }

    #[test]
    fn landscape_fov_frames_sphere_height() {
        let mut cam = camera();
        cam.resize(1600, 900);
        let expected = 2.0 * (2.0_f32 * 0.35 / 3.0).atan();
        assert!((cam.fovy - expected).abs() < 1e-6);
    }

    #[test]
    fn portrait_fov_widens_by_aspect() {
        let mut cam = camera();
        cam.resize(600, 1200);
        let expected = 2.0 * (2.0_f32 * 0.35 / 0.5 / 3.0).atan();
        assert!((cam.fovy - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_size_is_ignored() {
        let mut cam = camera();
        cam.resize(800, 600);
        let before = cam.clone();
        cam.resize(0, 600);
        assert_eq!(before, cam);
    }

    #[test]
    fn dolly_closes_gap_by_damping_fraction() {
        let mut cam = camera();
        cam.dolly(8.0, 5.0);
        assert!((cam.eye.z - 4.0).abs() < 1e-6);
    }
}
