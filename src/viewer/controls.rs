use crate::engine::input::{InputState, KeyCode};

use super::{camera::MoveFlags, generators::DemoMode, pose::Finger};

/// Keys bound to the viewer's actions.
pub struct Controls {
    pub toggle_live: KeyCode,
    pub quit: KeyCode,

    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    /// Held to make the scroll wheel change movement speed instead of zoom.
    pub speed_modifier: KeyCode,

    pub fingers: [(KeyCode, Finger); 5],
    pub demos: [(KeyCode, DemoMode); 3],

    pub record: KeyCode,
    pub play_forward: KeyCode,
    pub play_reverse: KeyCode,
    pub clear_transition: KeyCode,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            toggle_live: KeyCode::KeyF,
            quit: KeyCode::Escape,

            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            up: KeyCode::Space,
            down: KeyCode::ShiftLeft,
            speed_modifier: KeyCode::ControlLeft,

            fingers: [
                (KeyCode::KeyZ, Finger::Thumb),
                (KeyCode::KeyX, Finger::Index),
                (KeyCode::KeyC, Finger::Middle),
                (KeyCode::KeyV, Finger::Ring),
                (KeyCode::KeyB, Finger::Pinky),
            ],
            demos: [
                (KeyCode::Digit1, DemoMode::Grip),
                (KeyCode::Digit2, DemoMode::Ok),
                (KeyCode::Digit3, DemoMode::Fist),
            ],

            record: KeyCode::KeyR,
            play_forward: KeyCode::KeyT,
            play_reverse: KeyCode::KeyG,
            clear_transition: KeyCode::Backspace,
        }
    }
}

impl Controls {
    pub fn move_flags(&self, input: &InputState) -> MoveFlags {
        let mut flags = MoveFlags::empty();

        for (key, flag) in [
            (self.forward, MoveFlags::FORWARD),
            (self.back, MoveFlags::BACK),
            (self.left, MoveFlags::LEFT),
            (self.right, MoveFlags::RIGHT),
            (self.up, MoveFlags::UP),
            (self.down, MoveFlags::DOWN),
        ] {
            flags.set(flag, input.key_pressed(key));
        }

        flags
    }

    /// Lines describing the bindings, printed when the viewer starts.
    pub fn help(&self) -> Vec<String> {
        vec![
            format!("{:?}: toggle live camera control", self.toggle_live),
            format!(
                "{:?}/{:?}/{:?}/{:?}: move forward/left/back/right",
                self.forward, self.left, self.back, self.right
            ),
            format!("{:?}/{:?}: move up/down", self.up, self.down),
            "Mouse: look around, scroll: zoom".to_string(),
            format!("{:?} + scroll: movement speed", self.speed_modifier),
            format!(
                "{}: bend fingers (live)",
                self.fingers
                    .iter()
                    .map(|(key, finger)| format!("{key:?}={finger}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            format!(
                "{}: demo animations",
                self.demos
                    .iter()
                    .map(|(key, demo)| format!("{key:?}={demo}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            format!(
                "{:?}: record camera state, {:?}/{:?}: play A->B / B->A, {:?}: clear",
                self.record, self.play_forward, self.play_reverse, self.clear_transition
            ),
            format!("{:?}: quit", self.quit),
        ]
    }
}
