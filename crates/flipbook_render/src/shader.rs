use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::backend::RenderBackend;

/// Programmable pipeline stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// WGSL function each stage must export
    pub fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "vs_main",
            Self::Fragment => "fs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader pipeline failed to link:\n{0}")]
    Link(String),
}

/// WGSL text of both stages
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn load(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_source(vertex.as_ref())?,
            fragment: read_source(fragment.as_ref())?,
        })
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads both stage files & builds a sprite pipeline from them
///
/// The backend never hands out a pipeline whose stages failed; every failure
/// is logged before it is returned.
pub fn build_pipeline<B: RenderBackend>(
    backend: &B,
    vertex: impl AsRef<Path>,
    fragment: impl AsRef<Path>,
) -> Result<B::Pipeline, ShaderError> {
    ShaderSources::load(vertex, fragment)
        .and_then(|sources| backend.create_pipeline(&sources))
        .inspect_err(|err| log::error!("{err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../assets")
            .join(name)
    }

    #[test]
    fn loads_bundled_sources() {
        let sources =
            ShaderSources::load(asset("sprite.vert.wgsl"), asset("sprite.frag.wgsl")).unwrap();
        assert!(sources.stage(ShaderStage::Vertex).contains("fn vs_main"));
        assert!(sources.stage(ShaderStage::Fragment).contains("fn fs_main"));
    }

    #[test]
    fn missing_fragment_file_is_an_io_error() {
        let err = ShaderSources::load(asset("sprite.vert.wgsl"), asset("nope.frag.wgsl"))
            .unwrap_err();
        match err {
            ShaderError::Io { path, .. } => assert!(path.ends_with("nope.frag.wgsl")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn compile_errors_name_their_stage() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: "1:1: unexpected token".into(),
        };
        assert!(err.to_string().starts_with("fragment shader failed to compile"));
        assert_eq!(ShaderStage::Vertex.entry_point(), "vs_main");
    }
}
