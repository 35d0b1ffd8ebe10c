pub mod app {
    pub use flipbook_app::{AppConfig, AppError, AppHandler, AppRunner, Window, time::FrameTimer};

    #[cfg(feature = "logger")]
    pub use flipbook_app::init_logger;
}

pub mod input {
    pub use flipbook_app::input::{Input, KeyCode};
}

pub mod render {
    pub use flipbook_render::{
        Frame, RenderError, Renderer,
        camera::{OverlayCamera, Transform},
        gpu::WgpuBackend,
    };
}

pub mod sprite {
    pub use flipbook_render::{
        animation::{AnimationState, FrameUv, SheetLayout},
        backend::RenderBackend,
        shader::{ShaderError, ShaderStage},
        sprite::{MissingAtlas, Sprite, SpriteAssets, SpriteError, VertexBufferPolicy},
        texture::{FilterMode, MinFilter, SamplerOptions, TextureError, WrapMode},
    };
}

pub mod math {
    pub use flipbook_render::{Mat4, UVec2, Vec2, Vec3, uvec2, vec2};
}
