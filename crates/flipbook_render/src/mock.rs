//! Recording backend for exercising sprites without a GPU

use std::{cell::RefCell, rc::Rc};

use crate::{
    backend::{QuadDraw, RenderBackend},
    camera::TransformUniform,
    shader::{ShaderError, ShaderSources, ShaderStage},
    texture::{AtlasImage, SamplerOptions},
    vertex::Vertex,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Texture,
    Pipeline,
    Uniform,
    Binding,
    VertexBuffer,
}

#[derive(Default)]
pub struct Ledger {
    pub created: Vec<(Kind, usize)>,
    pub released: Vec<(Kind, usize)>,
    /// `(width, height)` of every uploaded texture
    pub textures: Vec<(u32, u32)>,
    pub uniform_writes: Vec<(usize, TransformUniform)>,
    pub vertex_writes: Vec<(usize, [Vertex; 4])>,
}

impl Ledger {
    pub fn count(list: &[(Kind, usize)], kind: Kind) -> usize {
        list.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn live(&self, kind: Kind) -> usize {
        Self::count(&self.created, kind) - Self::count(&self.released, kind)
    }
}

/// Handle that reports its own release to the ledger
pub struct Handle {
    pub kind: Kind,
    pub id: usize,
    ledger: Rc<RefCell<Ledger>>,
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.ledger.borrow_mut().released.push((self.kind, self.id));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub pipeline: usize,
    pub texture: usize,
    pub uniform: usize,
    pub binding: usize,
    pub vertices: usize,
}

#[derive(Default)]
pub struct MockPass {
    pub draws: Vec<DrawCall>,
}

#[derive(Clone)]
pub struct MockBackend {
    pub ledger: Rc<RefCell<Ledger>>,
    pub max_texture_dimension: u32,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            ledger: Rc::default(),
            max_texture_dimension: 8192,
        }
    }
}

impl MockBackend {
    fn handle(&self, kind: Kind) -> Handle {
        let mut ledger = self.ledger.borrow_mut();
        let id = ledger.created.len();
        ledger.created.push((kind, id));
        Handle {
            kind,
            id,
            ledger: self.ledger.clone(),
        }
    }
}

impl RenderBackend for MockBackend {
    type Texture = Handle;
    type Pipeline = Handle;
    type Uniform = Handle;
    type Binding = Handle;
    type VertexBuffer = Handle;
    type Pass<'p> = MockPass;

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn create_texture(&self, image: &AtlasImage, _sampler: &SamplerOptions) -> Handle {
        self.ledger
            .borrow_mut()
            .textures
            .push((image.width(), image.height()));
        self.handle(Kind::Texture)
    }

    fn create_pipeline(&self, sources: &ShaderSources) -> Result<Handle, ShaderError> {
        // stands in for the compiler: a stage must at least export its entry point
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let entry = format!("fn {}", stage.entry_point());
            if !sources.stage(stage).contains(&entry) {
                return Err(ShaderError::Compile {
                    stage,
                    log: format!("missing entry point `{}`", stage.entry_point()),
                });
            }
        }
        Ok(self.handle(Kind::Pipeline))
    }

    fn create_uniform(&self) -> Handle {
        self.handle(Kind::Uniform)
    }

    fn write_uniform(&self, uniform: &Handle, data: &TransformUniform) {
        self.ledger
            .borrow_mut()
            .uniform_writes
            .push((uniform.id, *data));
    }

    fn create_binding(&self) -> Handle {
        self.handle(Kind::Binding)
    }

    fn create_vertex_buffer(&self, vertices: &[Vertex; 4]) -> Handle {
        let handle = self.handle(Kind::VertexBuffer);
        self.ledger
            .borrow_mut()
            .vertex_writes
            .push((handle.id, *vertices));
        handle
    }

    fn write_vertex_buffer(&self, buffer: &Handle, vertices: &[Vertex; 4]) {
        self.ledger
            .borrow_mut()
            .vertex_writes
            .push((buffer.id, *vertices));
    }

    fn draw_quad(&self, pass: &mut MockPass, draw: QuadDraw<'_, Self>) {
        pass.draws.push(DrawCall {
            pipeline: draw.pipeline.id,
            texture: draw.texture.id,
            uniform: draw.uniform.id,
            binding: draw.binding.id,
            vertices: draw.vertices.id,
        });
    }
}
