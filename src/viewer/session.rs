use glam::Mat4;
use tracing::{debug, info};

use crate::engine::input::InputState;

use super::{
    camera::CameraRig,
    config::ViewerConfig,
    controls::Controls,
    generators::FingerToggles,
    mode::{DisplayMode, ModeController, ModeEdge},
    pose::PoseOverrides,
    skeleton::SkeletonTransformResolver,
    transition::{Direction, TransitionController},
};

/// Time sampled once at the start of a frame and shared by everything updated in it.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTime {
    /// Seconds since the session started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

/// Requests from the session to the window that hosts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Quit,
    GrabCursor,
    ReleaseCursor,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct Frame {
    pub view: Mat4,
    pub projection: Mat4,
    /// Skinning matrices in shader order. Empty when there is nothing to skin.
    pub bones: Vec<Mat4>,
}

/// One viewer: camera, transitions and the hand's pose.
pub struct ViewerSession<R>
where
    R: SkeletonTransformResolver,
{
    config: ViewerConfig,
    controls: Controls,

    rig: CameraRig,
    transition: TransitionController,
    modes: ModeController,
    toggles: FingerToggles,
    overrides: PoseOverrides,

    resolver: R,
    aspect: f32,

    /// Requests raised outside of [ViewerSession::update], handed out by the next update.
    pending: Vec<Request>,
}

impl<R> ViewerSession<R>
where
    R: SkeletonTransformResolver,
{
    pub fn new(config: ViewerConfig, resolver: R) -> Self {
        let rig = CameraRig::new(
            config.live_home,
            config.movement_speed,
            config.mouse_sensitivity,
        );
        let transition = TransitionController::new(config.transition_duration);
        let modes = ModeController::new(config.initial_mode, config.spin_hand);

        let mut session = Self {
            config,
            controls: Controls::default(),
            rig,
            transition,
            modes,
            toggles: FingerToggles::default(),
            overrides: PoseOverrides::default(),
            resolver,
            aspect: 1.0,
            pending: Vec::new(),
        };

        let edge = if session.modes.mode().is_live() {
            ModeEdge::EnteredLive
        } else {
            ModeEdge::EnteredDemo
        };
        let request = session.frame_camera(edge);
        session.pending.push(request);

        session
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn mode(&self) -> DisplayMode {
        self.modes.mode()
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn transition(&self) -> &TransitionController {
        &self.transition
    }

    pub fn overrides(&self) -> &PoseOverrides {
        &self.overrides
    }

    /// Adjust the aspect ratio of the view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Advance the session by one frame.
    pub fn update(&mut self, input: &InputState, time: FrameTime) -> Vec<Request> {
        let mut requests = std::mem::take(&mut self.pending);
        requests.extend(self.handle_actions(input));

        // A running transition owns the camera for the whole frame.
        if !self.transition.tick(time.delta, &mut self.rig) {
            self.update_rig(input, time.delta);
        }

        self.modes
            .produce(&mut self.overrides, &self.toggles, time.elapsed);

        requests
    }

    /// Matrices for the current state.
    pub fn frame(&self) -> Frame {
        let use_perspective = self.modes.mode().use_perspective();

        Frame {
            view: self.rig.view_matrix(),
            projection: self.rig.projection_matrix(self.aspect, use_perspective),
            bones: self.resolver.resolve(&self.overrides),
        }
    }

    fn handle_actions(&mut self, input: &InputState) -> Vec<Request> {
        let mut requests = Vec::new();
        let controls = &self.controls;

        if input.key_just_pressed(controls.quit) {
            requests.push(Request::Quit);
        }

        if input.key_just_pressed(controls.toggle_live)
            && let Some(edge) = self.modes.toggle_live()
        {
            requests.push(self.frame_camera(edge));
        }

        let controls = &self.controls;
        if self.modes.mode().is_live() {
            for (key, finger) in controls.fingers {
                if input.key_just_pressed(key) {
                    let bent = self.toggles.toggle(finger);
                    info!(
                        "Finger {finger}: {}",
                        if bent { "BENT" } else { "STRAIGHT" }
                    );
                }
            }
        } else {
            for (key, demo) in controls.demos {
                if input.key_just_pressed(key) {
                    self.modes.select(DisplayMode::Demo(demo));
                    info!("Mode: {}", self.modes.mode());
                }
            }
        }

        if input.key_just_pressed(controls.record) {
            self.transition.record(&self.rig);
        }
        if input.key_just_pressed(controls.play_forward) {
            self.transition.play(Direction::Forward);
        }
        if input.key_just_pressed(controls.play_reverse) {
            self.transition.play(Direction::Reverse);
        }
        if input.key_just_pressed(controls.clear_transition) {
            self.transition.clear();
        }

        requests
    }

    fn update_rig(&mut self, input: &InputState, delta_time: f32) {
        if self.modes.mode().is_live() {
            let flags = self.controls.move_flags(input);
            if !flags.is_empty() {
                self.rig.process_keyboard(flags, delta_time);
            }

            let mouse_delta = input.mouse_delta();
            if mouse_delta != glam::Vec2::ZERO {
                // Window +Y points down, looking up is positive.
                self.rig.process_mouse_movement(mouse_delta.x, -mouse_delta.y);
            }

            let wheel = input.wheel_delta();
            if wheel != 0.0 {
                if input.key_pressed(self.controls.speed_modifier) {
                    self.rig.adjust_movement_speed(wheel * self.config.speed_step);
                    info!("Camera speed: {:.2}", self.rig.movement_speed);
                } else {
                    self.rig.process_scroll(wheel);
                    debug!("Field of view: {:.1}", self.rig.fov());
                }
            }
        }

        self.rig.update_orientation(delta_time);
    }

    /// Put the camera at the canonical spot for the mode that was entered.
    fn frame_camera(&mut self, edge: ModeEdge) -> Request {
        match edge {
            ModeEdge::EnteredLive => {
                self.rig.set_position(self.config.live_home);
                self.rig.look_at(self.config.focus);
                info!("Keyboard/mouse control: ENABLED");
                Request::GrabCursor
            }
            ModeEdge::EnteredDemo => {
                self.rig.set_position(self.config.demo_eye);
                self.rig.look_at(self.config.focus);
                info!("Keyboard/mouse control: DISABLED, mode: {}", self.modes.mode());
                Request::ReleaseCursor
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        engine::input::KeyCode,
        viewer::{
            generators::DemoMode,
            math::tests::{approx_q, approx_v3},
            pose::{Finger, Joint},
            skeleton::Skeleton,
            transition::TransitionState,
        },
    };

    const DT: f32 = 0.1;

    fn live_session() -> ViewerSession<Skeleton> {
        let config = ViewerConfig {
            initial_mode: DisplayMode::LiveInput,
            movement_speed: 5.0,
            ..Default::default()
        };
        ViewerSession::new(config, Skeleton::hand().unwrap())
    }

    /// Run one frame with the given input, then clear the per-frame input.
    fn step(
        session: &mut ViewerSession<Skeleton>,
        input: &mut InputState,
        time: &mut FrameTime,
        delta: f32,
    ) -> Vec<Request> {
        time.delta = delta;
        time.elapsed += delta;
        let requests = session.update(input, *time);
        input.reset_current_frame();
        requests
    }

    fn tap(
        session: &mut ViewerSession<Skeleton>,
        input: &mut InputState,
        time: &mut FrameTime,
        key: KeyCode,
    ) -> Vec<Request> {
        input.press_key(key);
        let requests = step(session, input, time, 0.0);
        input.release_key(key);
        requests
    }

    #[test]
    fn starts_framed_on_the_hand() {
        let session = live_session();
        assert!(approx_v3(session.rig().position(), Vec3::new(0.0, 0.0, 15.0)));
        assert!(approx_q(session.rig().orientation(), glam::Quat::IDENTITY));

        let demo = ViewerSession::new(ViewerConfig::default(), Skeleton::hand().unwrap());
        assert!(approx_v3(demo.rig().basis().front, Vec3::Z));
    }

    #[test]
    fn first_update_carries_initial_cursor_request() {
        let mut input = InputState::default();

        let mut time = FrameTime::default();
        let mut session = live_session();
        let requests = step(&mut session, &mut input, &mut time, DT);
        assert_eq!(requests, vec![Request::GrabCursor]);
        assert!(step(&mut session, &mut input, &mut time, DT).is_empty());

        let mut time = FrameTime::default();
        let mut demo = ViewerSession::new(ViewerConfig::default(), Skeleton::hand().unwrap());
        let requests = step(&mut demo, &mut input, &mut time, DT);
        assert_eq!(requests, vec![Request::ReleaseCursor]);
    }

    #[test]
    fn record_move_record_play() {
        let mut session = live_session();
        let mut input = InputState::default();
        let mut time = FrameTime::default();

        tap(&mut session, &mut input, &mut time, KeyCode::KeyR);

        input.press_key(KeyCode::KeyD);
        for _ in 0..10 {
            step(&mut session, &mut input, &mut time, DT);
        }
        input.release_key(KeyCode::KeyD);
        assert!(approx_v3(session.rig().position(), Vec3::new(5.0, 0.0, 15.0)));

        tap(&mut session, &mut input, &mut time, KeyCode::KeyR);
        assert_eq!(session.transition().state(), TransitionState::Ready);

        // Play back towards A first, then forward to B.
        tap(&mut session, &mut input, &mut time, KeyCode::KeyG);
        for _ in 0..30 {
            step(&mut session, &mut input, &mut time, DT);
        }
        assert!(approx_v3(session.rig().position(), Vec3::new(0.0, 0.0, 15.0)));

        tap(&mut session, &mut input, &mut time, KeyCode::KeyT);
        assert_eq!(
            session.transition().state(),
            TransitionState::Playing(Direction::Forward)
        );

        // Movement keys are ignored while the transition runs.
        input.press_key(KeyCode::KeyW);
        for _ in 0..20 {
            step(&mut session, &mut input, &mut time, DT);
        }
        input.release_key(KeyCode::KeyW);
        assert!(session.transition().is_playing());
        for _ in 0..10 {
            step(&mut session, &mut input, &mut time, DT);
        }

        assert!(approx_v3(session.rig().position(), Vec3::new(5.0, 0.0, 15.0)));
        assert_eq!(session.transition().state(), TransitionState::Ready);
    }

    #[test]
    fn mode_switches_keep_transitions() {
        let mut session = live_session();
        let mut input = InputState::default();
        let mut time = FrameTime::default();

        tap(&mut session, &mut input, &mut time, KeyCode::KeyR);
        let requests = tap(&mut session, &mut input, &mut time, KeyCode::KeyF);
        assert_eq!(requests, vec![Request::ReleaseCursor]);
        assert!(!session.mode().is_live());
        assert_eq!(session.transition().state(), TransitionState::HasA);

        tap(&mut session, &mut input, &mut time, KeyCode::Digit3);
        assert_eq!(session.mode(), DisplayMode::Demo(DemoMode::Fist));

        let requests = tap(&mut session, &mut input, &mut time, KeyCode::KeyF);
        assert_eq!(requests, vec![Request::GrabCursor]);
        assert!(session.mode().is_live());
        assert_eq!(session.transition().state(), TransitionState::HasA);
    }

    #[test]
    fn demo_keys_ignored_while_live() {
        let mut session = live_session();
        let mut input = InputState::default();
        let mut time = FrameTime::default();

        tap(&mut session, &mut input, &mut time, KeyCode::Digit2);
        assert_eq!(session.mode(), DisplayMode::LiveInput);

        let requests = tap(&mut session, &mut input, &mut time, KeyCode::Escape);
        assert_eq!(requests, vec![Request::Quit]);
    }

    #[test]
    fn finger_toggle_round_trip() {
        let mut session = live_session();
        let mut input = InputState::default();
        let mut time = FrameTime::default();

        tap(&mut session, &mut input, &mut time, KeyCode::KeyX);
        let bent = session.frame();
        let skeleton = Skeleton::hand().unwrap();
        let index = skeleton.bone_index("index_distal_phalange").unwrap();
        assert!(!bent.bones[index].abs_diff_eq(Mat4::IDENTITY, 1e-4));

        tap(&mut session, &mut input, &mut time, KeyCode::KeyX);
        assert_eq!(
            session.overrides().joint(Finger::Index, Joint::Distal),
            Mat4::IDENTITY
        );
        assert!(session.frame().bones[index].abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn mouse_look_is_smoothed_in_live_mode_only() {
        let mut session = live_session();
        let mut input = InputState::default();
        let mut time = FrameTime::default();

        input.cursor_moved(glam::Vec2::new(100.0, 100.0));
        input.cursor_moved(glam::Vec2::new(100.0, 50.0));
        step(&mut session, &mut input, &mut time, 1.0 / 60.0);

        let rig = session.rig();
        assert!(rig.orientation().is_normalized());
        assert!(rig.basis().front.y > 0.0);
        assert!(!approx_q(rig.orientation(), rig.target_orientation()));

        tap(&mut session, &mut input, &mut time, KeyCode::KeyF);
        let before = session.rig().orientation();
        input.cursor_moved(glam::Vec2::new(300.0, 300.0));
        step(&mut session, &mut input, &mut time, 1.0 / 60.0);
        assert!(approx_q(session.rig().orientation(), before));
    }

    #[test]
    fn projection_matches_mode() {
        let mut session = live_session();
        session.resize(800, 800);
        assert_eq!(session.frame().projection.w_axis.w, 0.0);

        let mut input = InputState::default();
        let mut time = FrameTime::default();
        tap(&mut session, &mut input, &mut time, KeyCode::KeyF);
        assert_eq!(session.frame().projection.w_axis.w, 1.0);
    }
}
