pub mod input;
pub mod time;

use crate::{
    input::{Input, KeyCode},
    time::FrameTimer,
};
use std::{error::Error, sync::Arc};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::ElementState,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::WindowId,
};
pub use winit::{event::WindowEvent, window::Window};

/// Errors that stop the frame loop before or while it starts
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create app resource: {0}")]
    Resource(Box<dyn Error + Send + Sync>),
}

impl AppError {
    /// Wraps any resource setup failure (GPU, assets, ...)
    pub fn resource(err: impl Error + Send + Sync + 'static) -> Self {
        Self::Resource(Box::new(err))
    }
}

pub struct AppConfig {
    pub title: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resizable: bool,
    /// Key that closes the app like the window close button does
    pub exit_key: Option<KeyCode>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Flipbook".to_string(),
            width: None,
            height: None,
            resizable: true,
            exit_key: Some(KeyCode::Escape),
        }
    }
}

/// Trait defining application behavior
///
/// Implement this for your app logic. Hooks are called during window creation,
/// every frame, on resize, & before quitting
#[allow(async_fn_in_trait)]
pub trait AppHandler<R> {
    /// Called once the window exists; should create & return the resource
    async fn with_resource(&mut self, window: Arc<Window>) -> Result<R, AppError>;
    /// Called after the resource is initialized & window is ready
    fn on_ready(&mut self, _window: &Window, _resource: &mut R) {}
    /// Called every frame; an error stops the loop & is returned from `run`
    fn frame(
        &mut self,
        _window: &Window,
        _resource: &mut R,
        _input: &Input,
        _timer: &FrameTimer,
    ) -> Result<(), AppError> {
        Ok(())
    }
    /// Called on window resize
    fn resize(&mut self, _w: u32, _h: u32, _resource: &mut R) {}
    /// Called when the window is requested to close
    fn on_quit(&mut self) {}
}

/// Drives a single window, its resource & the per-frame hooks of an `AppHandler`
///
/// Use `AppRunner::new()` to construct it, then call `.run()` to start the loop
pub struct AppRunner<R, H: AppHandler<R>> {
    handler: H,
    resource: Option<R>,
    window: Option<Arc<Window>>,
    input: Input,
    timer: FrameTimer,
    config: AppConfig,
    error: Option<AppError>,
}

impl<R, H: AppHandler<R>> AppRunner<R, H> {
    /// Creates a new runner with the given handler & configuration
    pub fn new(handler: H, config: AppConfig) -> Self {
        Self {
            handler,
            resource: None,
            window: None,
            input: Input::default(),
            timer: FrameTimer::default(),
            config,
            error: None,
        }
    }

    /// Starts the app & blocks until the window closes
    ///
    /// Returns the first setup error if the window or resource could not be created
    pub fn run(mut self) -> Result<(), AppError> {
        #[cfg(feature = "logger")]
        init_logger();

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::debug!("stopping event loop after failure");
        self.error = Some(err);
        event_loop.exit();
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.handler.on_quit();
        event_loop.exit();
    }
}

#[doc(hidden)]
impl<R, H: AppHandler<R>> ApplicationHandler for AppRunner<R, H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_resizable(self.config.resizable)
            .with_visible(false);
        if let (Some(width), Some(height)) = (self.config.width, self.config.height) {
            attrs = attrs.with_inner_size(PhysicalSize::new(width, height));
        }

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        self.window = Some(window.clone());

        match pollster::block_on(self.handler.with_resource(window.clone())) {
            Ok(mut resource) => {
                self.handler.on_ready(&window, &mut resource);
                self.resource = Some(resource);
                window.set_visible(true);
                window.request_redraw();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::RedrawRequested => {
                let (Some(w), Some(r)) = (self.window.as_ref(), self.resource.as_mut()) else {
                    return;
                };
                self.timer.update();
                let result = self.handler.frame(w, r, &self.input, &self.timer);
                self.input.end_frame();
                match result {
                    Ok(()) => w.request_redraw(),
                    Err(err) => self.fail(event_loop, err),
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(r) = self.resource.as_mut() {
                    self.handler.resize(size.width, size.height, r);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.keyboard(&event);
                if event.state == ElementState::Pressed
                    && self.config.exit_key.is_some_and(|key| self.input.key_pressed(key))
                {
                    self.quit(event_loop);
                }
            }
            _ => {}
        }
    }
}

/// Initializes `env_logger`, defaulting to warnings unless `RUST_LOG` says otherwise
#[cfg(feature = "logger")]
pub fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("warn");
    // a logger installed by the host takes precedence
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_closes_on_escape() {
        let config = AppConfig::default();
        assert_eq!(config.exit_key, Some(KeyCode::Escape));
        assert!(config.width.is_none() && config.height.is_none());
    }

    #[test]
    fn resource_errors_keep_their_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "sprites.png");
        let err = AppError::resource(io);
        assert_eq!(err.to_string(), "failed to create app resource: sprites.png");
    }
}
