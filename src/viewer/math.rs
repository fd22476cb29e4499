use glam::{Quat, Vec3};

pub trait Interpolate: Copy {
    fn interpolate(left: Self, right: Self, n: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(left: Self, right: Self, n: f32) -> Self {
        left + (right - left) * n
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(left: Self, right: Self, n: f32) -> Self {
        left.lerp(right, n)
    }
}

impl Interpolate for Quat {
    #[inline]
    fn interpolate(left: Self, right: Self, n: f32) -> Self {
        slerp(left, right, n)
    }
}

/// Build an orientation from a yaw around world up and a pitch around the right axis, both in
/// *degrees*. Yaw is applied first, so the result is `yaw * pitch`.
pub fn from_yaw_pitch(yaw: f32, pitch: f32) -> Quat {
    let yaw = Quat::from_axis_angle(Vec3::Y, yaw.to_radians());
    let pitch = Quat::from_axis_angle(Vec3::X, pitch.to_radians());
    (yaw * pitch).normalize()
}

/// Spherical interpolation along the shortest arc between two unit quaternions.
#[inline]
pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    a.slerp(b, t).normalize()
}

/// Cubic ease with zero velocity at both ends.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The camera axes derived from an orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    pub front: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Basis {
    pub fn from_orientation(orientation: Quat) -> Self {
        Self {
            front: orientation * Vec3::NEG_Z,
            right: orientation * Vec3::X,
            up: orientation * Vec3::Y,
        }
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::from_orientation(Quat::IDENTITY)
    }
}
