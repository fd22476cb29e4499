use std::{sync::Arc, time::Instant};

use clap::Parser;
use hand_viewer::{
    engine::{
        input::InputState,
        renderer::{BoneVertex, Renderer, RendererError},
    },
    viewer::{
        config::ViewerConfig,
        generators::DemoMode,
        mode::DisplayMode,
        session::{FrameTime, Request, ViewerSession},
        skeleton::{Skeleton, SkeletonError},
    },
};
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum StartMode {
    Live,
    Grip,
    Ok,
    Fist,
}

impl From<StartMode> for DisplayMode {
    fn from(value: StartMode) -> Self {
        match value {
            StartMode::Live => DisplayMode::LiveInput,
            StartMode::Grip => DisplayMode::Demo(DemoMode::Grip),
            StartMode::Ok => DisplayMode::Demo(DemoMode::Ok),
            StartMode::Fist => DisplayMode::Demo(DemoMode::Fist),
        }
    }
}

#[derive(clap::Parser)]
struct Opts {
    /// Mode to start in.
    #[arg(long, value_enum, default_value = "grip")]
    mode: StartMode,

    /// Initial window width.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial window height.
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Camera movement speed in units per second.
    #[arg(long, default_value_t = 6.0)]
    speed: f32,

    /// Mouse look speed in degrees per pixel.
    #[arg(long, default_value_t = 0.1)]
    sensitivity: f32,

    /// Length of a camera transition in seconds.
    #[arg(long, default_value_t = 3.0)]
    transition_duration: f32,

    /// Continuously rotate the whole hand.
    #[arg(long)]
    spin_hand: bool,
}

impl From<&Opts> for ViewerConfig {
    fn from(opts: &Opts) -> Self {
        Self {
            initial_mode: opts.mode.into(),
            movement_speed: opts.speed,
            mouse_sensitivity: opts.sensitivity,
            transition_duration: opts.transition_duration,
            spin_hand: opts.spin_hand,
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum InitError {
    #[error(transparent)]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

enum App {
    Uninitialized(Opts),
    Initialized {
        window: Arc<winit::window::Window>,

        /// The renderer.
        renderer: Renderer,

        session: ViewerSession<Skeleton>,

        input: InputState,

        // The instant the application was initialized.
        started: Instant,

        // The instant that the last frame started to render.
        last_frame_time: Instant,
    },
}

impl App {
    fn initialize(
        opts: &Opts,
        event_loop: &winit::event_loop::ActiveEventLoop,
    ) -> Result<Self, InitError> {
        event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

        let attributes = winit::window::WindowAttributes::default()
            .with_title("Hand viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(opts.width, opts.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let mut renderer = Renderer::new(Arc::clone(&window))?;

        let skeleton = Skeleton::hand()?;
        info!(
            "Loaded scene: skeleton \"{}\" with {} bones",
            skeleton.name(),
            skeleton.bones().len()
        );

        let lines: Vec<BoneVertex> = skeleton
            .bone_segments()
            .into_iter()
            .flatten()
            .map(|(position, bone)| BoneVertex::new(position, bone))
            .collect();
        renderer.set_bone_lines(&lines);

        let mut session = ViewerSession::new(ViewerConfig::from(opts), skeleton);
        let winit::dpi::PhysicalSize { width, height } = window.inner_size();
        session.resize(width, height);

        for line in session.controls().help() {
            info!("{line}");
        }

        info!("Application initialized!");

        let now = Instant::now();
        Ok(App::Initialized {
            window,
            renderer,
            session,
            input: InputState::default(),
            started: now,
            last_frame_time: now,
        })
    }
}

fn grab_cursor(window: &winit::window::Window, input: &mut InputState) {
    use winit::window::CursorGrabMode;

    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    {
        warn!("Could not grab cursor ({err})");
    }
    window.set_cursor_visible(false);
    input.reset_mouse_tracking();
}

fn release_cursor(window: &winit::window::Window) {
    if let Err(err) = window.set_cursor_grab(winit::window::CursorGrabMode::None) {
        warn!("Could not release cursor ({err})");
    }
    window.set_cursor_visible(true);
}

impl winit::application::ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        match self {
            App::Uninitialized(opts) => match App::initialize(opts, event_loop) {
                Ok(app) => *self = app,
                Err(err) => {
                    error!("Could not initialize application! - {err}");
                    event_loop.exit();
                }
            },

            App::Initialized { .. } => {
                warn!("Application already initialized!");
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        use winit::event::WindowEvent;
        match self {
            App::Uninitialized(_) => {
                warn!("Can't process events for uninitialized application.");
            }
            App::Initialized {
                window,
                renderer,
                session,
                input,
                started,
                last_frame_time,
            } => {
                if window_id != window.id() {
                    return;
                }

                input.handle_window_event(&event);

                match event {
                    WindowEvent::CloseRequested => {
                        event_loop.exit();
                    }

                    WindowEvent::Resized(winit::dpi::PhysicalSize { width, height }) => {
                        renderer.resize(width, height);
                        session.resize(width, height);

                        window.request_redraw();
                    }

                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let time = FrameTime {
                            elapsed: (now - *started).as_secs_f32(),
                            delta: (now - *last_frame_time).as_secs_f32(),
                        };
                        *last_frame_time = now;

                        let requests = session.update(input, time);
                        input.reset_current_frame();

                        for request in requests {
                            match request {
                                Request::Quit => {
                                    event_loop.exit();
                                    return;
                                }
                                Request::GrabCursor => grab_cursor(window, input),
                                Request::ReleaseCursor => release_cursor(window),
                            }
                        }

                        renderer.render(&session.frame());

                        window.request_redraw();
                    }

                    _ => {}
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let App::Initialized { .. } = self {
            info!("Scene released");
        }
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    let opts = Opts::parse();

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create event loop! - {err}");
            return;
        }
    };

    let mut app = App::Uninitialized(opts);
    if let Err(err) = event_loop.run_app(&mut app) {
        error!("Event loop failed! - {err}");
    }
}
