//! GPU-free per-frame state of the menu.
//!
//! [`MenuFrame`] owns everything that changes from frame to frame (arcball,
//! camera, instance transforms, active item, movement flag) and reports the
//! notifications the host should see. The GPU engine wraps it and only adds
//! uploads and the draw.

use glam::{Mat4, Vec3, Vec4};

use crate::camera::Camera;
use crate::control::{ArcballControl, FORWARD, TARGET_FRAME_SECONDS};
use crate::geometry::Geometry;
use crate::options::MenuOptions;

/// Longest frame step fed to the simulation; longer gaps (tab switches,
/// debugger pauses) are treated as this.
pub const MAX_FRAME_SECONDS: f32 = 0.032;

/// Camera-side time scale carries a slightly larger bias than the arcball's.
const CAMERA_TIME_BIAS: f32 = 1e-4;

/// Notifications produced by one [`MenuFrame::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    /// The front-facing item changed to this index.
    pub active_item: Option<usize>,
    /// Movement started (`true`) or settled (`false`).
    pub movement: Option<bool>,
}

/// Sphere, control and camera state, advanced once per frame.
pub struct MenuFrame {
    options: MenuOptions,
    item_count: usize,
    positions: Vec<Vec3>,
    control: ArcballControl,
    camera: Camera,
    instances: Vec<Mat4>,
    frames: f32,
    smooth_rotation_velocity: f32,
    movement_active: bool,
    active_item: Option<usize>,
}

impl MenuFrame {
    /// Build the geodesic sphere and initial state for `item_count` items on
    /// a `width` x `height` viewport (pointer units).
    #[must_use]
    pub fn new(
        options: MenuOptions,
        item_count: usize,
        width: u32,
        height: u32,
    ) -> Self {
        let positions = Geometry::geodesic_sphere(
            options.subdivisions,
            options.sphere_radius,
        )
        .positions();
        let control = ArcballControl::new(
            options.control.clone(),
            width as f32,
            height as f32,
        );
        let mut camera = Camera::new(
            &options.camera,
            options.sphere_radius,
            options.camera.base_distance * options.scale,
        );
        camera.resize(width, height);

        let mut frame = Self {
            instances: vec![Mat4::IDENTITY; positions.len()],
            options,
            item_count: item_count.max(1),
            positions,
            control,
            camera,
            frames: 0.0,
            smooth_rotation_velocity: 0.0,
            movement_active: false,
            active_item: None,
        };
        frame.rebuild_instances();
        frame
    }

    /// Advance by `dt` seconds and report what changed.
    pub fn update(&mut self, dt: f32) -> FrameEvents {
        let dt = dt.clamp(0.0, MAX_FRAME_SECONDS);
        self.frames += dt / TARGET_FRAME_SECONDS;
        self.control.update(dt);
        let events = self.follow_control(dt);
        self.rebuild_instances();
        self.smooth_rotation_velocity = self.control.rotation_velocity();
        events
    }

    /// Movement flag, active item, snap target and camera dolly. The active
    /// item is tracked every frame; only the snap waits for the release.
    fn follow_control(&mut self, dt: f32) -> FrameEvents {
        let mut events = FrameEvents::default();
        let cam = &self.options.camera;
        let time_scale = dt / TARGET_FRAME_SECONDS + CAMERA_TIME_BIAS;
        let mut damping = cam.idle_damping / time_scale;
        let mut target_z = cam.base_distance * self.options.scale;

        let moving = self.control.is_pointer_down()
            || self.smooth_rotation_velocity.abs()
                > self.options.movement_threshold;
        if moving != self.movement_active {
            self.movement_active = moving;
            events.movement = Some(moving);
        }

        let nearest = self.nearest_vertex_index();
        let item = nearest % self.item_count;
        if self.active_item != Some(item) {
            self.active_item = Some(item);
            events.active_item = Some(item);
        }

        if self.control.is_pointer_down() {
            target_z += self.control.rotation_velocity()
                * cam.dolly_per_velocity
                + cam.drag_pullback;
            damping = cam.drag_damping / time_scale;
        } else {
            let world = self.control.orientation() * self.positions[nearest];
            self.control.set_snap_target(Some(world.normalize_or(FORWARD)));
        }

        self.camera.dolly(target_z, damping);
        events
    }

    /// Base vertex whose rotated position points most directly at the
    /// camera.
    #[must_use]
    pub fn nearest_vertex_index(&self) -> usize {
        let facing = self.control.orientation().inverse() * FORWARD;
        self.positions
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, v)| {
                let d = facing.dot(*v);
                if d > best.1 { (i, d) } else { best }
            })
            .0
    }

    fn rebuild_instances(&mut self) {
        let q = self.control.orientation();
        let radius = self.options.sphere_radius;
        let emphasis = self.options.facing_emphasis;
        let card_scale = self.options.card_scale;
        self.instances.clear();
        self.instances.extend(self.positions.iter().map(|&v| {
            let p = q * v;
            let s = (p.z.abs() / radius * emphasis + (1.0 - emphasis))
                * card_scale;
            instance_matrix(p, s)
        }));
    }

    /// Switch to a new item list of `item_count` items. The sphere keeps
    /// its orientation; the active item is recomputed and reported on the
    /// next update.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count.max(1);
        self.active_item = None;
    }

    /// Resize the viewport (pointer units) and recompute the projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.control.set_viewport(width as f32, height as f32);
        self.camera.resize(width, height);
    }

    /// Arcball control, for pointer input.
    pub fn control_mut(&mut self) -> &mut ArcballControl {
        &mut self.control
    }

    /// Arcball control.
    #[must_use]
    pub fn control(&self) -> &ArcballControl {
        &self.control
    }

    /// Camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Instance transforms from the last update, one per sphere vertex.
    #[must_use]
    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    /// Number of card slots (sphere vertices).
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of distinct items (at least one).
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Last notified active item.
    #[must_use]
    pub fn active_item(&self) -> Option<usize> {
        self.active_item
    }

    /// Whether the sphere is currently considered moving.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.movement_active
    }

    /// Nominal frames elapsed.
    #[must_use]
    pub fn frames(&self) -> f32 {
        self.frames
    }

    /// Rotation velocity as seen by the last completed frame.
    #[must_use]
    pub fn smooth_rotation_velocity(&self) -> f32 {
        self.smooth_rotation_velocity
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &MenuOptions {
        &self.options
    }
}

/// Card transform for sphere point `p`: centered at `(1 - s) * p`, local +Z
/// along `p` (facing outward), local +X horizontal, uniformly scaled by `s`.
#[must_use]
pub fn instance_matrix(p: Vec3, s: f32) -> Mat4 {
    let z = p.normalize_or(FORWARD);
    let x = Vec3::Y.cross(z).try_normalize().unwrap_or(Vec3::X);
    let y = z.cross(x);
    Mat4::from_cols(
        (x * s).extend(0.0),
        (y * s).extend(0.0),
        (z * s).extend(0.0),
        Vec4::from((p * (1.0 - s), 1.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::shapes::geodesic_vertex_count;

    const DT: f32 = 1.0 / 60.0;

    fn frame(items: usize) -> MenuFrame {
        MenuFrame::new(MenuOptions::default(), items, 800, 600)
    }

    #[test]
    fn one_subdivision_gives_42_slots() {
        let f = frame(5);
        assert_eq!(f.instance_count(), 42);
        assert_eq!(f.instance_count(), geodesic_vertex_count(1));
        assert_eq!(f.instances().len(), 42);
    }

    #[test]
    fn active_item_is_reported_once_until_it_changes() {
        let mut f = frame(7);
        let mut reports = Vec::new();
        for _ in 0..120 {
            if let Some(i) = f.update(DT).active_item {
                reports.push(i);
            }
        }
        assert_eq!(reports.len(), 1, "reports: {reports:?}");
        assert_eq!(Some(reports[0]), f.active_item());
        assert!(reports[0] < 7);
    }

    #[test]
    fn active_item_changes_after_a_drag() {
        let mut f = frame(42);
        let first = f.update(DT).active_item;
        assert!(first.is_some());

        let c = f.control_mut();
        c.pointer_down(100.0, 300.0);
        let mut reported_while_dragging = Vec::new();
        for i in 1..=40 {
            f.control_mut().pointer_move(100.0 + i as f32 * 15.0, 300.0);
            if let Some(i) = f.update(DT).active_item {
                reported_while_dragging.push(i);
            }
            assert_eq!(
                f.active_item(),
                Some(f.nearest_vertex_index() % f.item_count())
            );
        }
        assert!(!reported_while_dragging.is_empty());

        f.control_mut().pointer_up();
        for _ in 0..600 {
            let _ = f.update(DT);
        }
        assert_ne!(f.active_item(), first);
        assert_eq!(
            f.active_item(),
            Some(f.nearest_vertex_index() % f.item_count())
        );
    }

    #[test]
    fn changing_the_item_count_reports_the_front_item_again() {
        let mut f = frame(42);
        for _ in 0..120 {
            let _ = f.update(DT);
        }
        let slot = f.nearest_vertex_index();
        let orientation = f.control().orientation();

        f.set_item_count(5);
        assert_eq!(f.item_count(), 5);
        assert_eq!(f.active_item(), None);
        assert_eq!(f.update(DT).active_item, Some(slot % 5));
        assert!(f.control().orientation().dot(orientation) > 0.999);

        f.set_item_count(0);
        assert_eq!(f.item_count(), 1);
        assert_eq!(f.update(DT).active_item, Some(0));
    }

    #[test]
    fn drag_and_release_notifies_movement_exactly_twice() {
        let mut f = frame(10);
        let mut movement = Vec::new();
        let mut record = |events: FrameEvents| {
            if let Some(m) = events.movement {
                movement.push(m);
            }
        };

        record(f.update(DT));
        f.control_mut().pointer_down(400.0, 300.0);
        for i in 1..=30 {
            f.control_mut().pointer_move(400.0 + i as f32 * 10.0, 300.0);
            record(f.update(DT));
        }
        f.control_mut().pointer_up();
        for _ in 0..900 {
            record(f.update(DT));
        }

        assert_eq!(movement, vec![true, false]);
        assert!(f.control().rotation_velocity().abs() < 0.01);
        assert!(!f.is_moving());
    }

    #[test]
    fn zero_items_still_has_one_addressable_item() {
        let mut f = frame(0);
        assert_eq!(f.item_count(), 1);
        let events = f.update(DT);
        assert_eq!(events.active_item, Some(0));
    }

    #[test]
    fn oversized_steps_are_clamped() {
        let mut f = frame(3);
        let _ = f.update(5.0);
        let expected = MAX_FRAME_SECONDS / TARGET_FRAME_SECONDS;
        assert!((f.frames() - expected).abs() < 1e-4);
    }

    #[test]
    fn front_card_is_largest_and_nearest_camera() {
        let f = frame(1);
        let front = f.nearest_vertex_index();
        let front_scale = f.instances()[front].x_axis.length();
        let max_scale = f
            .instances()
            .iter()
            .map(|m| m.x_axis.length())
            .fold(0.0, f32::max);
        assert!((front_scale - max_scale).abs() < 1e-6);
        let center = f.instances()[front].w_axis.truncate();
        assert!(center.z > 0.0);
    }

    #[test]
    fn instance_matrix_faces_outward() {
        let p = Vec3::new(0.0, 0.0, 2.0);
        let m = instance_matrix(p, 0.25);
        let center = m.transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-6);
        let normal = m.transform_vector3(Vec3::Z).normalize();
        assert!((normal - Vec3::Z).length() < 1e-6);
        let right = m.transform_vector3(Vec3::X).normalize();
        assert!((right - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn instance_matrix_survives_polar_points() {
        let m = instance_matrix(Vec3::new(0.0, 2.0, 0.0), 0.1);
        assert!(m.is_finite());
    }

    #[test]
    fn scale_moves_the_camera_but_not_the_cards() {
        let near = frame(5);
        let far = MenuFrame::new(
            MenuOptions {
                scale: 2.0,
                ..MenuOptions::default()
            },
            5,
            800,
            600,
        );
        assert!((far.camera().eye.z - 2.0 * near.camera().eye.z).abs() < 1e-5);
        assert_eq!(near.instances(), far.instances());
    }

    #[test]
    fn camera_pulls_back_while_dragging() {
        let mut f = frame(5);
        let rest = f.camera().eye.z;
        f.control_mut().pointer_down(400.0, 300.0);
        for _ in 0..60 {
            let _ = f.update(DT);
        }
        assert!(f.camera().eye.z > rest + 1.0);
    }
}
