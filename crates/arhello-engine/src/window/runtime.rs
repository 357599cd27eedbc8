use anyhow::{Context, Result, anyhow};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::PipelineConfig;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::Tap;
use crate::pipeline::{FrameOutcome, FramePipeline, GpuFrameSink, Renderers};
use crate::render::{RenderTarget, clear_target};
use crate::session::TrackingSession;
use crate::time::FrameClock;

/// Log the frame rate this often.
const FPS_LOG_INTERVAL: u64 = 600;
const SLOW_FRAME_SECS: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "arhello".to_string(),
            initial_size: LogicalSize::new(720.0, 1280.0),
        }
    }
}

/// Entry point for the desktop host.
pub struct Runtime;

impl Runtime {
    /// Configures `session`, opens the window and renders until it closes.
    ///
    /// The session is resumed while the window is active, paused when the
    /// platform suspends the app, and closed before this returns.
    pub fn run<S>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        pipeline: PipelineConfig,
        mut session: S,
    ) -> Result<()>
    where
        S: TrackingSession + 'static,
    {
        session
            .configure(&pipeline.session)
            .map_err(|e| anyhow!("session configuration rejected: {e}"))?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, pipeline, session);

        let run = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        state.shutdown();
        run?;
        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    renderers: Renderers,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<S> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    pipeline: FramePipeline,
    session: S,

    entry: Option<WindowEntry>,
    session_running: bool,
    cursor: Option<PhysicalPosition<f64>>,

    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<S: TrackingSession> AppState<S> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, pipeline: PipelineConfig, session: S) -> Self {
        Self {
            config,
            gpu_init,
            pipeline: FramePipeline::new(pipeline),
            session,
            entry: None,
            session_running: false,
            cursor: None,
            exit_requested: false,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let mut entry = WindowEntryTryBuilder {
            clock: FrameClock::new(),
            renderers: Renderers::new(self.pipeline.config()),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        entry
            .with_mut(|fields| fields.renderers.initialize(&fields.gpu.render_ctx()))
            .context("renderer setup failed")?;

        let size = entry.borrow_gpu().size();
        self.pipeline.geometry().notify_resize(size.width, size.height);
        self.entry = Some(entry);
        Ok(())
    }

    fn resume_session(&mut self) -> Result<()> {
        if self.session_running {
            return Ok(());
        }
        self.session
            .resume()
            .map_err(|e| anyhow!("failed to resume session: {e}"))?;
        self.session_running = true;
        log::info!("session resumed");
        Ok(())
    }

    fn pause_session(&mut self) {
        if !self.session_running {
            return;
        }
        if let Err(e) = self.session.pause() {
            log::warn!("failed to pause session: {e}");
        }
        self.session_running = false;
        self.pipeline.reset_tracking();
        log::info!("session paused");
    }

    fn shutdown(&mut self) {
        self.pause_session();
        self.session.close();
        self.entry = None;
        let stats = self.pipeline.stats();
        log::info!(
            "session closed: {} frames rendered, {} skipped",
            stats.frames_rendered,
            stats.frames_skipped
        );
    }

    fn offer_tap(&self, position: PhysicalPosition<f64>) {
        let tap = Tap::new(position.x as f32, position.y as f32);
        if !self.pipeline.taps().offer(tap) {
            log::debug!(
                "tap queue full, dropped tap at ({:.0}, {:.0})",
                tap.x,
                tap.y
            );
        }
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (pipeline, session) = (&mut self.pipeline, &mut self.session);
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let clear_color = pipeline.config().clear_color;

        let result = entry.with_mut(|fields| {
            let time = fields.clock.tick();
            if time.frame_index % FPS_LOG_INTERVAL == 0 {
                log::debug!("frame {} at {:.1} fps", time.frame_index, time.fps);
            }
            if time.dt >= SLOW_FRAME_SECS {
                log::debug!("slow frame: {:.1} ms", time.dt * 1000.0);
            }

            let mut frame = match fields.gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => return Err(fields.gpu.handle_surface_error(err)),
            };

            let outcome = {
                let ctx = fields.gpu.render_ctx();
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                clear_target(&mut target, clear_color);
                let mut sink = GpuFrameSink::new(&ctx, &mut target, fields.renderers);
                pipeline.tick(session, &mut sink)
            };

            fields.window.pre_present_notify();
            fields.gpu.submit(frame);
            Ok(outcome)
        });

        match result {
            Ok(FrameOutcome::Rendered(report)) => {
                if let Some(state) = report.tracking_changed {
                    log::debug!("tracking state now {state:?}");
                }
            }
            Ok(FrameOutcome::Skipped(_)) => {}
            Err(SurfaceErrorAction::Fatal) => {
                self.fail(event_loop, anyhow!("GPU surface out of memory"));
            }
            Err(SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame) => {}
        }
    }
}

impl<S: TrackingSession> ApplicationHandler for AppState<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_none() {
            if let Err(e) = self.create_window_entry(event_loop) {
                self.fail(event_loop, e);
                return;
            }
        }

        if let Err(e) = self.resume_session() {
            self.fail(event_loop, e);
            return;
        }

        if let Some(entry) = self.entry.as_mut() {
            entry.with_clock_mut(|clock| clock.reset());
            entry.borrow_window().request_redraw();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.pause_session();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous rendering, paced by the FIFO present mode.
        if self.session_running {
            if let Some(entry) = &self.entry {
                entry.borrow_window().request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.borrow_window().request_redraw();
                }
                self.pipeline
                    .geometry()
                    .notify_resize(new_size.width, new_size.height);
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.borrow_window().inner_size();
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
                self.pipeline.geometry().notify_display_changed();
            }

            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(position),
            WindowEvent::CursorLeft { .. } => self.cursor = None,

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(position) = self.cursor {
                    self.offer_tap(position);
                }
            }

            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => {
                self.offer_tap(touch.location);
            }

            WindowEvent::RedrawRequested => {
                if self.session_running {
                    self.render_frame(event_loop);
                }
            }

            _ => {}
        }
    }
}
