use ahash::HashSet;
use glam::Vec2;
use winit::{
    event::{ElementState, MouseScrollDelta, WindowEvent},
    keyboard::PhysicalKey,
};

pub use winit::keyboard::KeyCode;

/// Pixel-based scroll deltas are scaled down to roughly match line-based ones.
const PIXELS_PER_LINE: f32 = 40.0;

/// Input gathered between two frames.
#[derive(Default)]
pub struct InputState {
    /// Last known cursor position in window pixels. `None` until the first sample after the cursor
    /// was (re)acquired, so that sample only sets the reference point.
    last_cursor_position: Option<Vec2>,
    /// Cursor movement since the last frame, with +Y pointing down the window.
    mouse_delta: Vec2,

    key_pressed: HashSet<KeyCode>,
    key_just_pressed: HashSet<KeyCode>,

    wheel_delta: f32,
}

impl InputState {
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } if !event.repeat => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(delta);
            }

            WindowEvent::Focused(false) => {
                self.key_pressed.clear();
                self.reset_mouse_tracking();
            }

            _ => {}
        }
    }

    pub fn press_key(&mut self, key: KeyCode) {
        if self.key_pressed.insert(key) {
            self.key_just_pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.key_pressed.remove(&key);
    }

    pub fn cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.last_cursor_position {
            self.mouse_delta += position - last;
        }
        self.last_cursor_position = Some(position);
    }

    pub fn scroll(&mut self, delta: f32) {
        self.wheel_delta += delta;
    }

    /// Forget the last cursor position. Call this when the cursor is grabbed again, otherwise the
    /// first movement would report the whole distance travelled while it was released.
    pub fn reset_mouse_tracking(&mut self) {
        self.last_cursor_position = None;
        self.mouse_delta = Vec2::ZERO;
    }

    /// Reset data being tracked per frame.
    pub fn reset_current_frame(&mut self) {
        self.key_just_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
    }
}

impl InputState {
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.key_pressed.contains(&key)
    }

    pub fn key_just_pressed(&self, key: KeyCode) -> bool {
        self.key_just_pressed.contains(&key)
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }
}
