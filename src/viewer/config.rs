use glam::Vec3;

use super::{generators::DemoMode, mode::DisplayMode};

/// Settings a viewer session is created with.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Mode the session starts in.
    pub initial_mode: DisplayMode,
    /// Where the camera is placed when live input starts.
    pub live_home: Vec3,
    /// Where the camera is placed for the fixed demo view.
    pub demo_eye: Vec3,
    /// The point both views are framed on.
    pub focus: Vec3,
    /// Camera speed in units per second.
    pub movement_speed: f32,
    /// Mouse look speed in degrees per pixel.
    pub mouse_sensitivity: f32,
    /// How much one step of the scroll wheel changes the movement speed while Ctrl is held.
    pub speed_step: f32,
    /// Length of a camera transition in seconds.
    pub transition_duration: f32,
    /// Continuously rotate the whole hand.
    pub spin_hand: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_mode: DisplayMode::Demo(DemoMode::Grip),
            live_home: Vec3::new(0.0, 0.0, 15.0),
            demo_eye: Vec3::new(0.0, 0.0, -1.0),
            focus: Vec3::ZERO,
            movement_speed: 6.0,
            mouse_sensitivity: 0.1,
            speed_step: 1.2,
            transition_duration: 3.0,
            spin_hand: false,
        }
    }
}
