//! Animated sprite overlays
//!
//! A [`Sprite`] owns every GPU resource it draws with. Each call to
//! [`Sprite::render`] uploads the current transform & frame quad, records one
//! draw, then advances the animation if its frame delay has passed.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use glam::{Vec2, uvec2};

use crate::{
    animation::{AnimationState, SheetLayout},
    backend::{QuadDraw, RenderBackend},
    camera::{OverlayCamera, Transform, TransformUniform},
    shader::{ShaderError, build_pipeline},
    texture::{AtlasImage, SamplerOptions, TextureError, load_texture},
    vertex::quad_vertices,
};

#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// What to do when the atlas cannot be loaded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingAtlas {
    /// Sprite creation fails with the texture error
    #[default]
    Fail,
    /// Draw with a 1×1 white texture instead
    Placeholder,
}

/// How the per-frame quad reaches the GPU
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexBufferPolicy {
    /// Create a fresh vertex buffer on every render, releasing the previous one
    #[default]
    Rebuild,
    /// Create one buffer & overwrite it in place on later renders
    Reuse,
}

/// Files & options a sprite is built from
#[derive(Clone, Debug)]
pub struct SpriteAssets {
    pub atlas: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub sampler: SamplerOptions,
    pub missing_atlas: MissingAtlas,
    pub vertex_buffers: VertexBufferPolicy,
}

impl Default for SpriteAssets {
    fn default() -> Self {
        Self {
            atlas: "sprites.png".into(),
            vertex_shader: "sprite.vert.wgsl".into(),
            fragment_shader: "sprite.frag.wgsl".into(),
            sampler: SamplerOptions::default(),
            missing_atlas: MissingAtlas::default(),
            vertex_buffers: VertexBufferPolicy::default(),
        }
    }
}

impl SpriteAssets {
    /// Default file names resolved against `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Self {
            atlas: dir.join(defaults.atlas),
            vertex_shader: dir.join(defaults.vertex_shader),
            fragment_shader: dir.join(defaults.fragment_shader),
            ..defaults
        }
    }
}

/// An animated, textured quad drawn over the scene
pub struct Sprite<B: RenderBackend> {
    backend: B,
    pipeline: B::Pipeline,
    uniform: B::Uniform,
    binding: B::Binding,
    texture: B::Texture,
    vertex_buffer: Option<B::VertexBuffer>,
    vertex_policy: VertexBufferPolicy,
    layout: SheetLayout,
    animation: AnimationState,
    transform: Transform,
    camera: OverlayCamera,
}

impl<B: RenderBackend> Sprite<B> {
    /// Builds the pipeline, transform uniform, quad binding & atlas texture
    ///
    /// The layout defaults to a single 256×256 frame until [`Sprite::configure`]
    /// is called.
    pub fn new(backend: B, assets: &SpriteAssets) -> Result<Self, SpriteError> {
        let pipeline = build_pipeline(&backend, &assets.vertex_shader, &assets.fragment_shader)?;
        let uniform = backend.create_uniform();
        let binding = backend.create_binding();

        let texture = match load_texture(&backend, &assets.atlas, &assets.sampler) {
            Ok(texture) => texture,
            Err(err) if assets.missing_atlas == MissingAtlas::Placeholder => {
                log::warn!("drawing {} with a placeholder: {err}", assets.atlas.display());
                backend.create_texture(&AtlasImage::placeholder(), &assets.sampler)
            }
            Err(err) => return Err(err.into()),
        };

        log::debug!("created sprite for {}", assets.atlas.display());
        Ok(Self {
            backend,
            pipeline,
            uniform,
            binding,
            texture,
            vertex_buffer: None,
            vertex_policy: assets.vertex_buffers,
            layout: SheetLayout::default(),
            animation: AnimationState::default(),
            transform: Transform::default(),
            camera: OverlayCamera::default(),
        })
    }

    /// Sets the sheet geometry in pixels & restarts the animation
    ///
    /// The geometry is not checked against the loaded atlas.
    #[allow(clippy::too_many_arguments)]
    pub fn configure(
        &mut self,
        atlas_width: u32,
        atlas_height: u32,
        frame_width: u32,
        frame_height: u32,
        columns: u32,
        rows: u32,
        total_frames: u32,
        offset_x: u32,
        offset_y: u32,
    ) {
        let layout = SheetLayout::new(
            uvec2(atlas_width, atlas_height),
            uvec2(frame_width, frame_height),
            columns,
            rows,
            total_frames,
        )
        .with_offset(uvec2(offset_x, offset_y));
        self.configure_layout(layout);
    }

    pub fn configure_layout(&mut self, layout: SheetLayout) {
        self.layout = layout;
        self.animation.rewind();
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.transform.size = size;
    }

    pub fn size(&self) -> Vec2 {
        self.transform.size
    }

    /// Counter-clockwise rotation in radians
    pub fn set_rotation(&mut self, radians: f32) {
        self.transform.rotation = radians;
    }

    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    pub fn set_frame_delay(&mut self, seconds: f32) {
        self.animation.set_frame_delay(seconds);
    }

    pub fn frame_delay(&self) -> f32 {
        self.animation.frame_delay()
    }

    pub fn set_camera(&mut self, camera: OverlayCamera) {
        self.camera = camera;
    }

    pub fn camera(&self) -> &OverlayCamera {
        &self.camera
    }

    /// Linear index of the frame drawn by the next render
    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn row(&self) -> u32 {
        self.layout.cell(self.frame()).0
    }

    pub fn column(&self) -> u32 {
        self.layout.cell(self.frame()).1
    }

    /// Grid cell of the current frame as `(row, column)`, like [`SheetLayout::cell`]
    pub fn cell(&self) -> (u32, u32) {
        self.layout.cell(self.frame())
    }

    /// Draws the current frame into `pass` & advances the animation if due
    pub fn render(&mut self, pass: &mut B::Pass<'_>) {
        self.render_at(pass, Instant::now());
    }

    /// [`Sprite::render`] with an explicit clock reading
    pub fn render_at(&mut self, pass: &mut B::Pass<'_>, now: Instant) {
        let uniform = TransformUniform::new(&self.camera, &self.transform);
        self.backend.write_uniform(&self.uniform, &uniform);

        let uv = self.layout.frame_uv(self.animation.frame());
        let quad = quad_vertices(self.transform.size, &uv);

        let buffer = match self.vertex_buffer.take() {
            Some(buffer) if self.vertex_policy == VertexBufferPolicy::Reuse => {
                self.backend.write_vertex_buffer(&buffer, &quad);
                buffer
            }
            // any previous buffer is released here
            _ => self.backend.create_vertex_buffer(&quad),
        };
        let vertices = self.vertex_buffer.insert(buffer);

        self.backend.draw_quad(
            pass,
            QuadDraw {
                pipeline: &self.pipeline,
                texture: &self.texture,
                uniform: &self.uniform,
                binding: &self.binding,
                vertices,
            },
        );

        self.animation.tick(now, &self.layout);
    }
}

impl<B: RenderBackend> Drop for Sprite<B> {
    fn drop(&mut self) {
        log::debug!(
            "releasing sprite resources ({} frames)",
            self.layout.total_frames()
        );
    }
}
