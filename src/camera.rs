//! # Camera — Free-Look Controller
//!
//! The camera owns two independent input streams:
//!
//! - **Pointer motion** (event-driven): absolute cursor positions arrive from
//!   the window. The first sample only seeds the reference position — it must
//!   produce no movement. Every later sample yields a delta that adjusts yaw
//!   and pitch. Pitch is clamped to [-90, 90] (looking straight up or down is
//!   a hard stop, no wraparound); yaw is normalized into (-180, 180] after
//!   every update.
//! - **Key state** (polled once per frame, after events): W/S/A/D move the
//!   camera by a fixed step along its *local* forward/right axes, so movement
//!   is always relative to the current facing.
//!
//! The orientation quaternion is rebuilt from (pitch, yaw, 0) Euler angles —
//! pitch applied first, then yaw — and the view matrix is recomputed eagerly
//! on every mutation. There is no smoothing; motion is instantaneous.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::input::{Input, KeyCode};

/// Units moved per frame while a movement key is held.
const MOVE_STEP: f32 = 2.0;

/// Free-look camera state: position, yaw/pitch, derived orientation and view.
pub struct CameraController {
    position: Vec3,
    /// Yaw in degrees, kept in (-180, 180].
    yaw: f32,
    /// Pitch in degrees, clamped to [-90, 90].
    pitch: f32,
    orientation: Quat,
    view: Mat4,
    /// Last absolute cursor position, `None` until the first sample seeds it.
    last_cursor: Option<(f32, f32)>,
}

impl CameraController {
    /// Create a camera at `position`, initially looking at the world origin.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            orientation: Quat::IDENTITY,
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            last_cursor: None,
        }
    }

    /// Feed an absolute cursor position from the window event handler.
    ///
    /// The first call seeds the reference and applies no rotation.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let Some((last_x, last_y)) = self.last_cursor else {
            self.last_cursor = Some((x, y));
            return;
        };

        let dx = x - last_x;
        let dy = y - last_y;
        self.last_cursor = Some((x, y));

        self.yaw -= dx;
        self.pitch = (self.pitch + dy).clamp(-90.0, 90.0);
        if self.yaw > 180.0 {
            self.yaw -= 360.0;
        }
        if self.yaw <= -180.0 {
            self.yaw += 360.0;
        }

        self.rebuild_orientation();
        self.rebuild_view();
    }

    /// Poll held keys and step the position along the camera's local axes.
    ///
    /// Must run after the frame's events have been delivered, so the key set
    /// reflects this frame's transitions. Returns `true` if the camera moved.
    pub fn process_movement(&mut self, keys: &Input<KeyCode>) -> bool {
        let mut moved = false;

        if keys.pressed(KeyCode::KeyW) {
            self.position += self.orientation * Vec3::new(0.0, 0.0, MOVE_STEP);
            moved = true;
        }
        if keys.pressed(KeyCode::KeyS) {
            self.position += self.orientation * Vec3::new(0.0, 0.0, -MOVE_STEP);
            moved = true;
        }
        if keys.pressed(KeyCode::KeyA) {
            self.position += self.orientation * Vec3::new(MOVE_STEP, 0.0, 0.0);
            moved = true;
        }
        if keys.pressed(KeyCode::KeyD) {
            self.position += self.orientation * Vec3::new(-MOVE_STEP, 0.0, 0.0);
            moved = true;
        }

        if moved {
            self.rebuild_view();
        }
        moved
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current yaw in degrees, in (-180, 180].
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current pitch in degrees, in [-90, 90].
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// The view matrix, recomputed on every mutating event.
    pub fn view(&self) -> Mat4 {
        self.view
    }

    // Pitch first, then yaw. Roll is always zero.
    fn rebuild_orientation(&mut self) {
        self.orientation = Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        );
    }

    fn rebuild_view(&mut self) {
        let forward = self.orientation * Vec3::Z;
        let up = self.orientation * Vec3::Y;
        self.view = Mat4::look_at_rh(self.position, self.position + forward, up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraController {
        CameraController::new(Vec3::new(100.0, 125.5, 100.0))
    }

    #[test]
    fn first_pointer_sample_only_seeds() {
        let mut cam = camera();
        let view_before = cam.view();

        cam.pointer_moved(812.0, 431.0);

        assert_eq!(cam.yaw(), 0.0);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.view(), view_before);
    }

    #[test]
    fn pitch_clamps_at_ninety() {
        let mut cam = camera();
        cam.pointer_moved(0.0, 0.0);
        cam.pointer_moved(0.0, 70.0);
        cam.pointer_moved(0.0, 120.0);

        // Cumulative 120 degrees of pitch input stops exactly at the limit.
        assert_eq!(cam.pitch(), 90.0);
    }

    #[test]
    fn pitch_clamps_at_negative_ninety() {
        let mut cam = camera();
        cam.pointer_moved(0.0, 0.0);
        cam.pointer_moved(0.0, -120.0);

        assert_eq!(cam.pitch(), -90.0);
    }

    #[test]
    fn yaw_wraps_into_half_open_range() {
        let mut cam = camera();
        cam.pointer_moved(0.0, 0.0);
        // yaw accumulates as -dx, so a -200 cursor delta yields +200 degrees.
        cam.pointer_moved(-200.0, 0.0);

        assert_eq!(cam.yaw(), -160.0);
    }

    #[test]
    fn forward_step_follows_facing() {
        let mut cam = camera();
        let start = cam.position();

        let mut keys = Input::new();
        keys.press(KeyCode::KeyW);

        // Identity orientation: forward is +Z.
        assert!(cam.process_movement(&keys));
        assert_eq!(cam.position() - start, Vec3::new(0.0, 0.0, 2.0));

        // Turn 90 degrees and the same key moves along a different world axis.
        cam.pointer_moved(0.0, 0.0);
        cam.pointer_moved(-90.0, 0.0);
        let turned = cam.position();
        cam.process_movement(&keys);
        let delta = cam.position() - turned;
        assert!((delta.x - 2.0).abs() < 1e-4, "delta = {delta:?}");
        assert!(delta.z.abs() < 1e-4, "delta = {delta:?}");
    }

    #[test]
    fn strafe_uses_local_right_axis() {
        let mut cam = camera();
        let start = cam.position();

        let mut keys = Input::new();
        keys.press(KeyCode::KeyA);
        cam.process_movement(&keys);
        assert_eq!(cam.position() - start, Vec3::new(2.0, 0.0, 0.0));

        keys.release(KeyCode::KeyA);
        keys.press(KeyCode::KeyD);
        cam.process_movement(&keys);
        assert_eq!(cam.position(), start);
    }

    #[test]
    fn no_keys_means_no_view_change() {
        let mut cam = camera();
        let view = cam.view();
        let keys = Input::new();

        assert!(!cam.process_movement(&keys));
        assert_eq!(cam.view(), view);
    }
}
