use std::rc::Rc;

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindingResource, Buffer, BufferUsages,
    CompilationMessageType, Device, ErrorFilter, Extent3d, IndexFormat, Origin3d, Queue,
    RenderPass, RenderPipeline, ShaderModule, ShaderModuleDescriptor, ShaderSource,
    TexelCopyBufferLayout, TexelCopyTextureInfo, TextureAspect, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages,
    util::{BufferInitDescriptor, DeviceExt},
};

use crate::{
    backend::{QuadDraw, RenderBackend},
    camera::{OverlayCamera, Transform, TransformUniform},
    pipeline::{Layouts, create_sprite_pipeline},
    shader::{ShaderError, ShaderSources, ShaderStage},
    texture::{AtlasImage, SamplerOptions},
    vertex::{FAN_INDICES, Vertex},
};

/// [`RenderBackend`] that records into `wgpu` render passes
///
/// Cheap to clone: device & queue are reference counted and the bind group
/// layouts are shared between clones.
#[derive(Clone)]
pub struct WgpuBackend {
    device: Device,
    queue: Queue,
    format: TextureFormat,
    layouts: Rc<Layouts>,
}

impl WgpuBackend {
    pub fn new(device: Device, queue: Queue, format: TextureFormat) -> Self {
        let layouts = Rc::new(Layouts::new(&device));
        Self {
            device,
            queue,
            format,
            layouts,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Builds one stage, failing on any compilation error it reports
    fn compile(&self, stage: ShaderStage, source: &str) -> Result<ShaderModule, ShaderError> {
        self.device.push_error_scope(ErrorFilter::Validation);
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(match stage {
                ShaderStage::Vertex => "Sprite Vertex Shader",
                ShaderStage::Fragment => "Sprite Fragment Shader",
            }),
            source: ShaderSource::Wgsl(source.into()),
        });
        let info = pollster::block_on(module.get_compilation_info());
        let scope_error = pollster::block_on(self.device.pop_error_scope());

        let mut log = String::new();
        let mut failed = false;
        for message in &info.messages {
            let line = match &message.location {
                Some(at) => format!("{}:{}: {}", at.line_number, at.line_position, message.message),
                None => message.message.clone(),
            };
            match message.message_type {
                CompilationMessageType::Error => {
                    log::error!("{stage} shader: {line}");
                    failed = true;
                }
                CompilationMessageType::Warning => log::warn!("{stage} shader: {line}"),
                CompilationMessageType::Info => log::debug!("{stage} shader: {line}"),
            }
            log.push_str(&line);
            log.push('\n');
        }

        if let Some(err) = scope_error {
            failed = true;
            log.push_str(&err.to_string());
        }

        if failed {
            return Err(ShaderError::Compile { stage, log });
        }
        Ok(module)
    }
}

/// Uploaded atlas with the sampler & bind group used to read it
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    bind_group: BindGroup,
}

impl GpuTexture {
    /// Binds this texture at the given index in the render pass
    pub fn bind(&self, pass: &mut RenderPass<'_>, index: u32) {
        pass.set_bind_group(index, &self.bind_group, &[]);
    }
}

pub struct GpuPipeline {
    pipeline: RenderPipeline,
}

/// Per-sprite transform buffer, written every frame & never read back
pub struct GpuUniform {
    buffer: Buffer,
    bind_group: BindGroup,
}

pub struct GpuBinding {
    indices: Buffer,
}

pub struct GpuVertexBuffer {
    buffer: Buffer,
}

impl RenderBackend for WgpuBackend {
    type Texture = GpuTexture;
    type Pipeline = GpuPipeline;
    type Uniform = GpuUniform;
    type Binding = GpuBinding;
    type VertexBuffer = GpuVertexBuffer;
    type Pass<'p> = RenderPass<'p>;

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_texture(&self, image: &AtlasImage, sampler: &SamplerOptions) -> GpuTexture {
        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("Sprite Atlas"),
            size: Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: image.levels().len() as u32,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in image.levels().iter().enumerate() {
            let (width, height) = level.dimensions();
            self.queue.write_texture(
                TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: Origin3d::ZERO,
                    aspect: TextureAspect::All,
                },
                level.as_raw(),
                TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&Default::default());
        let sampler = self.device.create_sampler(&sampler.descriptor());
        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("Atlas Bind Group"),
            layout: &self.layouts.texture,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        GpuTexture {
            texture,
            view,
            sampler,
            bind_group,
        }
    }

    fn create_pipeline(&self, sources: &ShaderSources) -> Result<GpuPipeline, ShaderError> {
        let vertex = self.compile(ShaderStage::Vertex, sources.stage(ShaderStage::Vertex))?;
        let fragment = self.compile(ShaderStage::Fragment, sources.stage(ShaderStage::Fragment))?;

        // interface mismatches between the stages only surface here
        self.device.push_error_scope(ErrorFilter::Validation);
        let pipeline =
            create_sprite_pipeline(&self.device, self.format, &self.layouts, &vertex, &fragment);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ShaderError::Link(err.to_string()));
        }

        log::debug!("created sprite pipeline");
        Ok(GpuPipeline { pipeline })
    }

    fn create_uniform(&self) -> GpuUniform {
        let initial = TransformUniform::new(&OverlayCamera::default(), &Transform::default());
        let buffer = self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Sprite Transform Buffer"),
            contents: bytemuck::bytes_of(&initial),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("Sprite Transform Bind Group"),
            layout: &self.layouts.transform,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        GpuUniform { buffer, bind_group }
    }

    fn write_uniform(&self, uniform: &GpuUniform, data: &TransformUniform) {
        self.queue
            .write_buffer(&uniform.buffer, 0, bytemuck::bytes_of(data));
    }

    fn create_binding(&self) -> GpuBinding {
        let indices = self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Sprite Quad Indices"),
            contents: bytemuck::cast_slice(&FAN_INDICES),
            usage: BufferUsages::INDEX,
        });
        GpuBinding { indices }
    }

    fn create_vertex_buffer(&self, vertices: &[Vertex; 4]) -> GpuVertexBuffer {
        let buffer = self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Sprite Quad Vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        });
        GpuVertexBuffer { buffer }
    }

    fn write_vertex_buffer(&self, buffer: &GpuVertexBuffer, vertices: &[Vertex; 4]) {
        self.queue
            .write_buffer(&buffer.buffer, 0, bytemuck::cast_slice(vertices));
    }

    fn draw_quad(&self, pass: &mut RenderPass<'_>, draw: QuadDraw<'_, Self>) {
        pass.set_pipeline(&draw.pipeline.pipeline);
        draw.texture.bind(pass, 0);
        pass.set_bind_group(1, &draw.uniform.bind_group, &[]);
        pass.set_vertex_buffer(0, draw.vertices.buffer.slice(..));
        pass.set_index_buffer(draw.binding.indices.slice(..), IndexFormat::Uint16);
        pass.draw_indexed(0..FAN_INDICES.len() as u32, 0, 0..1);
    }
}
