//! Pose producers that fill [PoseOverrides] from time or from per-finger toggles.

use std::f32::consts::PI;

use glam::Mat4;
use strum::IntoEnumIterator;

use super::pose::{Finger, Joint, METACARPALS, PoseOverrides};

/// Length of one bend-and-release cycle of the demo animations.
pub const PERIOD: f32 = 2.4;

/// Base angle that the live toggles bend a finger by.
pub const TOGGLE_BEND_ANGLE: f32 = PI / 3.0;

/// How fast the optional idle spin turns the whole hand, in radians per second.
pub const SPIN_SPEED: f32 = PI / 4.0;

/// Divisor used for the wrist sway of the [DemoMode::Fist] demo.
const FIST_SWAY_FRACTION: f32 = 2.3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum DemoMode {
    /// All five fingers close and open together.
    #[default]
    Grip,
    /// Thumb and index meet to form an "OK" sign.
    Ok,
    /// A closing fist with the thumb folding across and the hand swaying.
    Fist,
}

/// Per-joint divisors of PI for a finger. The peak bend of a joint is `PI / fraction`. A fraction
/// of zero leaves the joint alone and a negative fraction bends it the other way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerCurve {
    pub proximal: f32,
    pub intermediate: f32,
    pub distal: f32,
    pub fingertip: f32,
}

impl FingerCurve {
    pub const fn new(proximal: f32, intermediate: f32, distal: f32, fingertip: f32) -> Self {
        Self {
            proximal,
            intermediate,
            distal,
            fingertip,
        }
    }

    fn fraction(&self, joint: Joint) -> f32 {
        match joint {
            Joint::Proximal => self.proximal,
            Joint::Intermediate => self.intermediate,
            Joint::Distal => self.distal,
            Joint::Fingertip => self.fingertip,
        }
    }
}

const CURL: FingerCurve = FingerCurve::new(3.0, 3.0, 2.0, 0.0);

const GRIP: [(Finger, FingerCurve); 5] = [
    (Finger::Thumb, FingerCurve::new(6.0, 12.0, 12.0, 0.0)),
    (Finger::Index, CURL),
    (Finger::Middle, CURL),
    (Finger::Ring, CURL),
    (Finger::Pinky, CURL),
];

const OK: [(Finger, FingerCurve); 2] = [
    (Finger::Thumb, FingerCurve::new(6.0, 12.0, 12.0, 12.0)),
    (Finger::Index, FingerCurve::new(6.0, 6.0, 2.0, 0.0)),
];

const FIST: [(Finger, FingerCurve); 5] = [
    (Finger::Thumb, FingerCurve::new(0.0, -6.0, -4.0, 0.0)),
    (Finger::Index, CURL),
    (Finger::Middle, CURL),
    (Finger::Ring, CURL),
    (Finger::Pinky, CURL),
];

impl DemoMode {
    /// The curve for each finger the mode animates. Fingers not listed stay straight.
    pub fn curves(&self) -> &'static [(Finger, FingerCurve)] {
        match self {
            DemoMode::Grip => &GRIP,
            DemoMode::Ok => &OK,
            DemoMode::Fist => &FIST,
        }
    }

    /// Whether the mode animates the root bone itself.
    pub fn drives_root(&self) -> bool {
        matches!(self, DemoMode::Fist)
    }

    /// Write this mode's pose at `time` seconds into `overrides`.
    pub fn generate(&self, overrides: &mut PoseOverrides, time: f32) {
        let wave = triangle_wave(time, PERIOD);

        if self.drives_root() {
            let sway = wave * (PI / FIST_SWAY_FRACTION);
            overrides.set(METACARPALS, Mat4::from_rotation_y(sway));
        }

        overrides.clear_fingers();
        for (finger, curve) in self.curves() {
            bend_finger(overrides, *finger, curve, wave);
        }
    }
}

/// A wave going `1 -> 0 -> 1` over each period.
pub fn triangle_wave(time: f32, period: f32) -> f32 {
    let time_in_period = time.rem_euclid(period);
    (time_in_period / (period * 0.5) - 1.0).abs()
}

/// The bend angle of a joint for a wave value, or `None` if the joint is not animated.
pub fn joint_angle(wave: f32, fraction: f32) -> Option<f32> {
    (fraction != 0.0).then(|| wave * (PI / fraction))
}

fn bend_finger(overrides: &mut PoseOverrides, finger: Finger, curve: &FingerCurve, wave: f32) {
    for joint in Joint::iter() {
        if let Some(angle) = joint_angle(wave, curve.fraction(joint)) {
            overrides.set_joint(finger, joint, Mat4::from_rotation_z(angle));
        }
    }
}

/// The rotation of the root bone for the idle spin.
pub fn spin(time: f32) -> Mat4 {
    Mat4::from_rotation_x(time * SPIN_SPEED)
}

/// Which fingers are currently bent by the live toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerToggles {
    bent: [bool; 5],
}

impl FingerToggles {
    pub fn is_bent(&self, finger: Finger) -> bool {
        self.bent[finger as usize]
    }

    /// Flip a finger and return its new state.
    pub fn toggle(&mut self, finger: Finger) -> bool {
        let bent = &mut self.bent[finger as usize];
        *bent = !*bent;
        *bent
    }

    /// Write the toggled pose. Bent fingers snap to their fixed bend, straight fingers snap back to
    /// identity. Fingertips are never bent by the toggles.
    pub fn apply(&self, overrides: &mut PoseOverrides) {
        overrides.clear_fingers();

        for finger in Finger::iter() {
            let [proximal, intermediate, distal] = toggle_proportions(finger);
            let bent = self.is_bent(finger);

            for (joint, proportion) in [
                (Joint::Proximal, proximal),
                (Joint::Intermediate, intermediate),
                (Joint::Distal, distal),
            ] {
                let transform = if bent {
                    Mat4::from_rotation_z(TOGGLE_BEND_ANGLE * proportion)
                } else {
                    Mat4::IDENTITY
                };
                overrides.set_joint(finger, joint, transform);
            }
        }
    }
}

/// Share of [TOGGLE_BEND_ANGLE] for the proximal, intermediate and distal joints.
fn toggle_proportions(finger: Finger) -> [f32; 3] {
    match finger {
        Finger::Thumb => [0.2, 0.3, 0.5],
        Finger::Index | Finger::Middle => [1.0, 0.9, 0.8],
        Finger::Ring | Finger::Pinky => [0.9, 0.8, 0.7],
    }
}
