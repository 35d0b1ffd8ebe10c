pub mod animation;
pub mod backend;
pub mod camera;
pub mod gpu;
#[cfg(test)]
mod mock;
pub mod pipeline;
pub mod shader;
pub mod sprite;
pub mod texture;
pub mod vertex;

pub use glam::{Mat4, UVec2, Vec2, Vec3, uvec2, vec2};
pub use wgpu::{Device, Queue, RenderPass, TextureFormat};

use wgpu::{
    Color, CommandEncoder, DeviceDescriptor, Instance, LoadOp, Operations, PresentMode,
    RenderPassColorAttachment, RenderPassDescriptor, RequestAdapterOptions, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, SurfaceTarget, SurfaceTexture, TextureView, WindowHandle,
};

use crate::gpu::WgpuBackend;

/// Failures while bringing up or presenting to the GPU surface
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,
    #[error("out of GPU memory")]
    OutOfMemory,
}

struct RenderTarget {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

pub struct Frame {
    pub view: TextureView,
    pub encoder: CommandEncoder,
    surface_texture: SurfaceTexture,
}

/// Owns the window surface & hands out the backend sprites are built on
///
/// A frame is `begin_frame` → `begin_overlay_pass` → sprite renders →
/// `end_frame`.
pub struct Renderer {
    backend: WgpuBackend,
    target: RenderTarget,
    clear_color: Color,
}

impl Renderer {
    /// Creates a new `Renderer` with a configured, vsynced surface
    pub async fn new(
        inner_width: u32,
        inner_height: u32,
        window: impl Into<SurfaceTarget<'static>> + WindowHandle,
    ) -> Result<Renderer, RenderError> {
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                // Force find adapter that can present to this surface
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Flipbook Device"),
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, inner_width.max(1), inner_height.max(1))
            .ok_or(RenderError::UnsupportedSurface)?;
        config.present_mode = PresentMode::AutoVsync;
        surface.configure(&device, &config);

        Ok(Renderer {
            backend: WgpuBackend::new(device, queue, config.format),
            target: RenderTarget { surface, config },
            clear_color: Color::BLACK,
        })
    }

    /// Backend handle for creating sprites that draw to this surface
    pub fn backend(&self) -> WgpuBackend {
        self.backend.clone()
    }

    /// Begins a new frame, returning the surface texture and command encoder
    ///
    /// Returns `Ok(None)` when this frame should be skipped; a lost or
    /// outdated surface is reconfigured for the next one.
    pub fn begin_frame(&mut self) -> Result<Option<Frame>, RenderError> {
        let surface_texture = match self.target.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("reconfiguring surface");
                self.configure_surface();
                return Ok(None);
            }
            Err(SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return Ok(None);
            }
        };

        let view = surface_texture.texture.create_view(&Default::default());
        let encoder = self
            .backend
            .device()
            .create_command_encoder(&Default::default());

        Ok(Some(Frame {
            view,
            encoder,
            surface_texture,
        }))
    }

    /// Opens the pass sprites are drawn into, cleared to the clear color
    ///
    /// There is no depth attachment; sprites composite in the order they render.
    pub fn begin_overlay_pass<'a>(&self, frame: &'a mut Frame) -> RenderPass<'a> {
        frame.encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            ..Default::default()
        })
    }

    /// Ends the frame by submitting commands and presenting
    pub fn end_frame(&mut self, frame: Frame) {
        self.backend.queue().submit(Some(frame.encoder.finish()));
        frame.surface_texture.present();
    }

    /// Resizes the surface, ignoring zero-sized (minimized) windows
    pub fn resize(&mut self, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        (self.target.config.width, self.target.config.height) = (w, h);
        self.configure_surface();
    }

    pub fn set_clear_color(&mut self, color: [f64; 4]) {
        self.clear_color = Color {
            r: color[0],
            g: color[1],
            b: color[2],
            a: color[3],
        };
    }

    fn configure_surface(&self) {
        self.target
            .surface
            .configure(self.backend.device(), &self.target.config);
    }
}
