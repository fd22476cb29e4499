use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3};

use super::math::{self, Basis, Interpolate};

pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 45.0;
pub const PITCH_LIMIT: f32 = 89.0;

pub const MIN_MOVEMENT_SPEED: f32 = 0.6;
pub const MAX_MOVEMENT_SPEED: f32 = 60.0;

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Half width of the orthographic box at an aspect ratio of 1.
const ORTHO_HALF_WIDTH: f32 = 12.5;
const ORTHO_BOTTOM: f32 = -5.0;
const ORTHO_TOP: f32 = 20.0;
const ORTHO_DEPTH: f32 = 20.0;

/// Orientation smoothing per second, before clamping into
/// `[MIN_SMOOTHING, MAX_SMOOTHING]`.
const SMOOTHING_RATE: f32 = 9.0;
const MIN_SMOOTHING: f32 = 0.01;
const MAX_SMOOTHING: f32 = 1.0;

bitflags! {
    /// Directions the camera is asked to move in this frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MoveFlags: u8 {
        const FORWARD = 1 << 0;
        const BACK = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
    }
}

/// A snapshot of everything needed to restore the camera's view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in *degrees*.
    pub fov: f32,
}

impl Interpolate for CameraState {
    #[inline]
    fn interpolate(left: Self, right: Self, n: f32) -> Self {
        Self {
            position: Interpolate::interpolate(left.position, right.position, n),
            orientation: Interpolate::interpolate(left.orientation, right.orientation, n),
            fov: Interpolate::interpolate(left.fov, right.fov, n),
        }
    }
}

pub struct CameraRig {
    position: Vec3,
    /// The orientation used for rendering. Chases `target_orientation`.
    orientation: Quat,
    /// The orientation requested by mouse input.
    target_orientation: Quat,
    basis: Basis,

    /// Current yaw angle of the camera in *degrees*.
    yaw: f32,
    /// Current pitch angle of the camera in *degrees*.
    pitch: f32,

    /// Vertical field of view in *degrees*.
    fov: f32,
    /// Units per second.
    pub movement_speed: f32,
    /// Degrees per pixel of mouse movement.
    pub mouse_sensitivity: f32,
}

impl CameraRig {
    pub fn new(position: Vec3, movement_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            target_orientation: Quat::IDENTITY,
            basis: Basis::default(),
            yaw: 0.0,
            pitch: 0.0,
            fov: MAX_FOV,
            movement_speed: movement_speed.clamp(MIN_MOVEMENT_SPEED, MAX_MOVEMENT_SPEED),
            mouse_sensitivity,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn target_orientation(&self) -> Quat {
        self.target_orientation
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Move the camera along its own axes. Every active direction contributes a full step, so
    /// diagonal movement is faster than straight movement.
    pub fn process_keyboard(&mut self, flags: MoveFlags, delta_time: f32) {
        let step = self.movement_speed * delta_time;
        let Basis { front, right, up } = self.basis;

        let mut offset = Vec3::ZERO;
        if flags.contains(MoveFlags::FORWARD) {
            offset += front;
        }
        if flags.contains(MoveFlags::BACK) {
            offset -= front;
        }
        if flags.contains(MoveFlags::RIGHT) {
            offset += right;
        }
        if flags.contains(MoveFlags::LEFT) {
            offset -= right;
        }
        if flags.contains(MoveFlags::UP) {
            offset += up;
        }
        if flags.contains(MoveFlags::DOWN) {
            offset -= up;
        }

        self.position += offset * step;
    }

    /// Turn the target orientation by a mouse delta in pixels. Positive `dy` looks up, positive
    /// `dx` looks right.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.mouse_sensitivity;
        self.pitch = (self.pitch + dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.target_orientation = math::from_yaw_pitch(self.yaw, self.pitch);
    }

    /// Move the current orientation towards the target orientation.
    pub fn update_orientation(&mut self, delta_time: f32) {
        let factor = (SMOOTHING_RATE * delta_time).clamp(MIN_SMOOTHING, MAX_SMOOTHING);
        self.orientation = math::slerp(self.orientation, self.target_orientation, factor);
        self.basis = Basis::from_orientation(self.orientation);
    }

    /// Zoom by changing the field of view.
    pub fn process_scroll(&mut self, delta: f32) {
        self.fov = (self.fov - delta).clamp(MIN_FOV, MAX_FOV);
    }

    pub fn adjust_movement_speed(&mut self, delta: f32) {
        self.movement_speed =
            (self.movement_speed + delta).clamp(MIN_MOVEMENT_SPEED, MAX_MOVEMENT_SPEED);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.basis.front, self.basis.up)
    }

    pub fn projection_matrix(&self, aspect: f32, use_perspective: bool) -> Mat4 {
        if use_perspective {
            Mat4::perspective_rh(self.fov.to_radians(), aspect, NEAR, FAR)
        } else {
            let half_width = ORTHO_HALF_WIDTH * aspect;
            Mat4::orthographic_rh(
                -half_width,
                half_width,
                ORTHO_BOTTOM,
                ORTHO_TOP,
                -ORTHO_DEPTH,
                ORTHO_DEPTH,
            )
        }
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            position: self.position,
            orientation: self.orientation,
            fov: self.fov,
        }
    }

    /// Restore a snapshot. The target follows so no smoothing towards a stale target happens
    /// afterwards.
    pub fn set_state(&mut self, state: CameraState) {
        self.position = state.position;
        self.fov = state.fov.clamp(MIN_FOV, MAX_FOV);

        let orientation = if state.orientation.is_normalized() {
            state.orientation
        } else {
            state.orientation.normalize()
        };
        self.snap_orientation(orientation);
    }

    /// Turn the camera towards a point immediately, without smoothing.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(direction) = (target - self.position).try_normalize() else {
            return;
        };

        (self.yaw, self.pitch) = yaw_pitch_of(direction);

        let orientation = math::from_yaw_pitch(self.yaw, self.pitch);
        self.orientation = orientation;
        self.target_orientation = orientation;
        self.basis = Basis::from_orientation(orientation);
    }

    fn snap_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        self.target_orientation = orientation;
        self.basis = Basis::from_orientation(orientation);

        // Keep the mouse accumulators in step, otherwise the next mouse sample would jump back
        // to the old yaw/pitch.
        (self.yaw, self.pitch) = yaw_pitch_of(self.basis.front);
    }
}

/// Yaw and pitch in *degrees* that point the camera's front along a unit `direction`. Pitch is
/// clamped to [PITCH_LIMIT].
fn yaw_pitch_of(direction: Vec3) -> (f32, f32) {
    let yaw = (-direction.x).atan2(-direction.z).to_degrees();
    let pitch = direction
        .y
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees()
        .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    (yaw, pitch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::math::tests::{approx_f, approx_q, approx_v3};

    fn rig() -> CameraRig {
        CameraRig::new(Vec3::new(0.0, 0.0, 15.0), 6.0, 0.1)
    }

    #[test]
    fn orientation_stays_unit_length() {
        let mut rig = rig();

        for i in 0..500 {
            let dx = ((i * 37) % 23) as f32 - 11.0;
            let dy = ((i * 53) % 19) as f32 - 9.0;
            rig.process_mouse_movement(dx * 3.0, dy * 5.0);
            assert!(rig.target_orientation().is_normalized());

            rig.update_orientation(1.0 / 60.0 + (i % 7) as f32 * 0.01);
            assert!(rig.orientation().is_normalized());
        }
    }

    #[test]
    fn pitch_is_clamped() {
        let mut rig = rig();

        for i in 0..200 {
            rig.process_mouse_movement(0.0, i as f32);
            rig.update_orientation(0.1);

            let front = Basis::from_orientation(rig.target_orientation()).front;
            let pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees();
            assert!(pitch <= PITCH_LIMIT + 1e-3);
            assert!(rig.pitch() <= PITCH_LIMIT);
        }

        for i in 0..200 {
            rig.process_mouse_movement(0.0, -(i as f32));
        }
        assert_eq!(rig.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn smoothing_converges_and_is_bounded() {
        let mut rig = rig();
        rig.process_mouse_movement(-300.0, 0.0);

        // A tiny frame still moves a little.
        let before = rig.orientation();
        rig.update_orientation(0.0);
        let crept = before.angle_between(rig.orientation());
        assert!(crept > 0.0);
        assert!(crept < rig.orientation().angle_between(rig.target_orientation()));

        // A huge frame snaps straight to the target.
        rig.update_orientation(10.0);
        assert!(approx_q(rig.orientation(), rig.target_orientation()));
        assert!(approx_v3(
            rig.basis().front,
            rig.target_orientation() * Vec3::NEG_Z
        ));
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut rig = rig();

        rig.process_keyboard(MoveFlags::FORWARD, 0.5);
        assert!(approx_v3(rig.position(), Vec3::new(0.0, 0.0, 12.0)));

        rig.process_keyboard(MoveFlags::RIGHT | MoveFlags::UP, 1.0);
        assert!(approx_v3(rig.position(), Vec3::new(6.0, 6.0, 12.0)));

        // Opposite directions cancel.
        rig.process_keyboard(MoveFlags::LEFT | MoveFlags::RIGHT, 1.0);
        assert!(approx_v3(rig.position(), Vec3::new(6.0, 6.0, 12.0)));
    }

    #[test]
    fn scroll_clamps_fov() {
        let mut rig = rig();
        rig.process_scroll(10.0);
        assert!(approx_f(rig.fov(), 35.0));
        rig.process_scroll(100.0);
        assert_eq!(rig.fov(), MIN_FOV);
        rig.process_scroll(-100.0);
        assert_eq!(rig.fov(), MAX_FOV);
    }

    #[test]
    fn movement_speed_is_clamped() {
        let mut rig = rig();
        rig.adjust_movement_speed(-100.0);
        assert_eq!(rig.movement_speed, MIN_MOVEMENT_SPEED);
        rig.adjust_movement_speed(1000.0);
        assert_eq!(rig.movement_speed, MAX_MOVEMENT_SPEED);
    }

    #[test]
    fn set_state_drops_pending_target() {
        let mut rig = rig();
        rig.process_mouse_movement(200.0, 100.0);

        let state = CameraState {
            position: Vec3::new(1.0, 2.0, 3.0),
            orientation: math::from_yaw_pitch(45.0, 10.0),
            fov: 30.0,
        };
        rig.set_state(state);
        rig.update_orientation(1.0 / 60.0);

        assert!(approx_q(rig.orientation(), state.orientation));
        assert!(approx_q(rig.target_orientation(), state.orientation));
        assert_eq!(rig.position(), state.position);
        assert_eq!(rig.fov(), 30.0);

        // Mouse input continues from the restored direction.
        rig.process_mouse_movement(0.0, 0.0);
        assert!(approx_q(rig.target_orientation(), state.orientation));
    }

    #[test]
    fn look_at_snaps_towards_point() {
        let mut rig = rig();
        rig.set_position(Vec3::new(10.0, 10.0, 0.0));
        rig.look_at(Vec3::ZERO);

        let expected = (Vec3::ZERO - rig.position()).normalize();
        assert!(approx_v3(rig.basis().front, expected));
        assert!(approx_q(rig.orientation(), rig.target_orientation()));

        // Looking at our own position changes nothing.
        let before = rig.orientation();
        rig.look_at(rig.position());
        assert_eq!(before, rig.orientation());
    }

    #[test]
    fn yaw_pitch_round_trip() {
        for (yaw, pitch) in [(0.0, 0.0), (45.0, 10.0), (-120.0, -60.0), (170.0, 80.0)] {
            let front = Basis::from_orientation(math::from_yaw_pitch(yaw, pitch)).front;
            let (y, p) = yaw_pitch_of(front);
            assert!((y - yaw).abs() < 1e-3, "{yaw} {pitch}");
            assert!((p - pitch).abs() < 1e-3, "{yaw} {pitch}");
        }

        let (_, pitch) = yaw_pitch_of(Vec3::Y);
        assert_eq!(pitch, PITCH_LIMIT);
    }

    #[test]
    fn projection_depends_on_mode() {
        let rig = rig();
        let perspective = rig.projection_matrix(1.0, true);
        let orthographic = rig.projection_matrix(1.0, false);

        // Orthographic keeps w at 1, perspective does not.
        assert_eq!(orthographic.w_axis.w, 1.0);
        assert_eq!(perspective.w_axis.w, 0.0);
    }
}
