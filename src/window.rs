//! The winit application: one window, one engine, one renderer.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::config::WindowConfig;
use crate::engine::Engine;
use crate::error::SimulationError;
use crate::gpu::{GpuRenderer, Projection};
use crate::input::{Command, Input};
use crate::space::Space;
use crate::time::{StatsTicker, Time};

/// Renderer settings that wait for the window to exist.
pub(crate) struct RenderSetup {
    pub projection: Projection,
    pub radius: f32,
    pub vsync: bool,
}

pub(crate) struct App<V: Space> {
    engine: Engine<V>,
    setup: RenderSetup,
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    input: Input,
    time: Time,
    stats: StatsTicker,
    /// First fatal error, handed back once the event loop returns.
    pub error: Option<SimulationError>,
}

impl<V: Space> App<V> {
    pub fn new(engine: Engine<V>, setup: RenderSetup, window_config: WindowConfig) -> Self {
        let input = Input::new(window_config.width, window_config.height);
        Self {
            engine,
            setup,
            window_config,
            window: None,
            renderer: None,
            input,
            time: Time::new(),
            stats: StatsTicker::default(),
            error: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        let renderer = pollster::block_on(GpuRenderer::new(
            window.clone(),
            self.setup.projection.clone(),
            self.setup.radius,
            self.setup.vsync,
        ))?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        log::info!("window open at {}x{}", size.width, size.height);
        Ok(())
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &mut self.renderer {
            self.engine.shutdown(renderer);
            log::debug!("{} render slots still live after shutdown", renderer.live_handles());
        }
        self.renderer = None;
        event_loop.exit();
    }

    fn apply(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        match command {
            Command::Launch(trigger) => {
                if let Some(renderer) = &mut self.renderer {
                    self.engine.trigger(&trigger, renderer);
                }
            }
            Command::ToggleColor(index) => {
                if self.engine.palette_mut().toggle(index).is_none() {
                    log::debug!("no palette entry {}", index + 1);
                }
            }
            Command::ToggleAll => self.engine.palette_mut().toggle_all(),
            Command::Quit => self.close(event_loop),
        }
    }

    fn redraw(&mut self) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        self.time.update();
        self.engine.frame(renderer);

        if let Some(window) = &self.window {
            if self.stats.due(Instant::now()) {
                window.set_title(&format!(
                    "{} | {} particles | {:.0} FPS",
                    self.window_config.title,
                    self.engine.len(),
                    self.time.fps()
                ));
            }
            window.request_redraw();
        }
    }
}

impl<V: Space> ApplicationHandler for App<V> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            log::error!("{e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                self.close(event_loop);
                return;
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(*physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                return;
            }
            _ => {}
        }

        if let Some(command) = self.input.handle_event(&event) {
            self.apply(command, event_loop);
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            self.close(event_loop);
        }
    }
}
