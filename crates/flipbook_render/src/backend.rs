use crate::{
    camera::TransformUniform,
    shader::{ShaderError, ShaderSources},
    texture::{AtlasImage, SamplerOptions},
    vertex::Vertex,
};

/// GPU operations a [`Sprite`](crate::sprite::Sprite) needs
///
/// Every associated handle type owns its GPU object & releases it when
/// dropped, so a sprite releases each resource exactly once by dropping its
/// fields. [`WgpuBackend`](crate::gpu::WgpuBackend) is the real implementation.
pub trait RenderBackend {
    type Texture;
    type Pipeline;
    type Uniform;
    /// Per-sprite quad index data matching the vertex layout
    type Binding;
    type VertexBuffer;
    /// Recording context handed to [`RenderBackend::draw_quad`]
    type Pass<'p>;

    /// Largest width or height an uploaded texture may have
    fn max_texture_dimension(&self) -> u32;

    /// Uploads every mip level of `image` as an immutable texture
    fn create_texture(&self, image: &AtlasImage, sampler: &SamplerOptions) -> Self::Texture;

    /// Compiles both stages & links them into a sprite pipeline
    fn create_pipeline(&self, sources: &ShaderSources) -> Result<Self::Pipeline, ShaderError>;

    fn create_uniform(&self) -> Self::Uniform;

    fn write_uniform(&self, uniform: &Self::Uniform, data: &TransformUniform);

    fn create_binding(&self) -> Self::Binding;

    fn create_vertex_buffer(&self, vertices: &[Vertex; 4]) -> Self::VertexBuffer;

    /// Overwrites an existing vertex buffer in place
    fn write_vertex_buffer(&self, buffer: &Self::VertexBuffer, vertices: &[Vertex; 4]);

    /// Records one indexed draw of the textured quad
    fn draw_quad(&self, pass: &mut Self::Pass<'_>, draw: QuadDraw<'_, Self>);
}

/// Resources bound for a single quad draw
pub struct QuadDraw<'a, B: RenderBackend + ?Sized> {
    pub pipeline: &'a B::Pipeline,
    pub texture: &'a B::Texture,
    pub uniform: &'a B::Uniform,
    pub binding: &'a B::Binding,
    pub vertices: &'a B::VertexBuffer,
}
