use glam::Mat4;

use super::{
    generators::{self, DemoMode, FingerToggles},
    pose::{METACARPALS, PoseOverrides},
};

/// Where the hand's pose comes from this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Free camera with the fingers driven by the bend toggles.
    LiveInput,
    /// Fixed camera with a procedural animation.
    Demo(DemoMode),
}

impl DisplayMode {
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, DisplayMode::LiveInput)
    }

    /// Live navigation uses a perspective projection, demos use a fixed orthographic box.
    #[inline]
    pub fn use_perspective(&self) -> bool {
        self.is_live()
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::LiveInput => write!(f, "Live input"),
            DisplayMode::Demo(demo) => write!(f, "Demo ({demo})"),
        }
    }
}

/// Reported when a mode switch crosses between live and demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEdge {
    EnteredLive,
    EnteredDemo,
}

pub struct ModeController {
    mode: DisplayMode,
    /// The demo to return to when leaving live input.
    last_demo: DemoMode,
    /// Rotate the root bone continuously when the active producer doesn't own it.
    spin_hand: bool,
}

impl ModeController {
    pub fn new(mode: DisplayMode, spin_hand: bool) -> Self {
        let last_demo = match mode {
            DisplayMode::Demo(demo) => demo,
            DisplayMode::LiveInput => DemoMode::default(),
        };

        Self {
            mode,
            last_demo,
            spin_hand,
        }
    }

    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switch modes. Returns the edge crossed, if any.
    pub fn select(&mut self, mode: DisplayMode) -> Option<ModeEdge> {
        let previous = std::mem::replace(&mut self.mode, mode);
        if let DisplayMode::Demo(demo) = mode {
            self.last_demo = demo;
        }

        match (previous.is_live(), mode.is_live()) {
            (false, true) => Some(ModeEdge::EnteredLive),
            (true, false) => Some(ModeEdge::EnteredDemo),
            _ => None,
        }
    }

    /// Flip between live input and the last demo that was shown.
    pub fn toggle_live(&mut self) -> Option<ModeEdge> {
        let next = if self.mode.is_live() {
            DisplayMode::Demo(self.last_demo)
        } else {
            DisplayMode::LiveInput
        };
        self.select(next)
    }

    /// Run the single pose producer for the current mode. The root bone is rewritten every frame,
    /// so a pose left by the previous mode never carries over.
    pub fn produce(&self, overrides: &mut PoseOverrides, toggles: &FingerToggles, time: f32) {
        let owns_root = matches!(self.mode, DisplayMode::Demo(demo) if demo.drives_root());
        if !owns_root {
            let root = if self.spin_hand {
                generators::spin(time)
            } else {
                Mat4::IDENTITY
            };
            overrides.set(METACARPALS, root);
        }

        match self.mode {
            DisplayMode::LiveInput => toggles.apply(overrides),
            DisplayMode::Demo(demo) => demo.generate(overrides, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::viewer::pose::{Finger, Joint};

    #[test]
    fn edges_only_on_live_boundary() {
        let mut modes = ModeController::new(DisplayMode::Demo(DemoMode::Grip), false);

        assert_eq!(modes.select(DisplayMode::Demo(DemoMode::Ok)), None);
        assert_eq!(
            modes.select(DisplayMode::LiveInput),
            Some(ModeEdge::EnteredLive)
        );
        assert_eq!(modes.select(DisplayMode::LiveInput), None);
        assert_eq!(modes.toggle_live(), Some(ModeEdge::EnteredDemo));

        // Returns to the demo that was active before going live.
        assert_eq!(modes.mode(), DisplayMode::Demo(DemoMode::Ok));
    }

    #[test]
    fn projection_follows_mode() {
        assert!(DisplayMode::LiveInput.use_perspective());
        assert!(!DisplayMode::Demo(DemoMode::Fist).use_perspective());
    }

    #[test]
    fn live_mode_uses_toggles_only() {
        let modes = ModeController::new(DisplayMode::LiveInput, false);
        let mut toggles = FingerToggles::default();
        toggles.toggle(Finger::Pinky);

        let mut overrides = PoseOverrides::default();
        modes.produce(&mut overrides, &toggles, 0.6);

        assert_ne!(overrides.joint(Finger::Pinky, Joint::Distal), Mat4::IDENTITY);
        assert_eq!(overrides.joint(Finger::Index, Joint::Distal), Mat4::IDENTITY);
        assert_eq!(overrides.get(METACARPALS), Mat4::IDENTITY);
    }

    #[test]
    fn fist_sway_does_not_outlive_fist() {
        let toggles = FingerToggles::default();
        let mut modes = ModeController::new(DisplayMode::Demo(DemoMode::Fist), false);
        let mut overrides = PoseOverrides::default();

        modes.produce(&mut overrides, &toggles, 0.3);
        assert_ne!(overrides.get(METACARPALS), Mat4::IDENTITY);

        modes.select(DisplayMode::Demo(DemoMode::Grip));
        modes.produce(&mut overrides, &toggles, 0.4);
        assert_eq!(overrides.get(METACARPALS), Mat4::IDENTITY);
    }

    #[test]
    fn ok_pose_does_not_leak_into_live() {
        let toggles = FingerToggles::default();
        let mut modes = ModeController::new(DisplayMode::Demo(DemoMode::Ok), false);
        let mut overrides = PoseOverrides::default();

        modes.produce(&mut overrides, &toggles, 0.3);
        assert_ne!(
            overrides.joint(Finger::Thumb, Joint::Fingertip),
            Mat4::IDENTITY
        );

        modes.select(DisplayMode::LiveInput);
        modes.produce(&mut overrides, &toggles, 0.4);
        for finger in Finger::iter() {
            for joint in Joint::iter() {
                assert_eq!(overrides.joint(finger, joint), Mat4::IDENTITY);
            }
        }
        assert_eq!(overrides.get(METACARPALS), Mat4::IDENTITY);
    }

    #[test]
    fn spin_skips_modes_that_own_the_root() {
        let toggles = FingerToggles::default();

        let modes = ModeController::new(DisplayMode::Demo(DemoMode::Grip), true);
        let mut overrides = PoseOverrides::default();
        modes.produce(&mut overrides, &toggles, 2.0);
        assert_eq!(overrides.get(METACARPALS), generators::spin(2.0));

        let modes = ModeController::new(DisplayMode::Demo(DemoMode::Fist), true);
        let mut overrides = PoseOverrides::default();
        modes.produce(&mut overrides, &toggles, 2.0);
        assert_ne!(overrides.get(METACARPALS), generators::spin(2.0));
    }
}
