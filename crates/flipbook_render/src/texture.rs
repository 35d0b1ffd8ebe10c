//! Atlas decoding & sampler configuration
//!
//! Atlases are decoded on the CPU into an [`AtlasImage`] holding every mip
//! level, then handed to a [`RenderBackend`] for upload.

use std::path::{Path, PathBuf};

use image::{RgbaImage, imageops};

use crate::backend::RenderBackend;

/// Magnification filter, also the base of [`MinFilter`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Minification filter, optionally blending between mip levels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    /// Whether sampling reads from levels other than the base one
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }

    /// wgpu `(min_filter, mipmap_filter)` pair
    pub(crate) fn to_wgpu(self) -> (wgpu::FilterMode, wgpu::FilterMode) {
        use wgpu::FilterMode::{Linear, Nearest};

        match self {
            Self::Nearest => (Nearest, Nearest),
            Self::Linear => (Linear, Nearest),
            Self::NearestMipmapNearest => (Nearest, Nearest),
            Self::LinearMipmapNearest => (Linear, Nearest),
            Self::NearestMipmapLinear => (Nearest, Linear),
            Self::LinearMipmapLinear => (Linear, Linear),
        }
    }

    /// Highest level of detail the sampler may pick
    pub(crate) fn lod_max_clamp(self) -> f32 {
        if self.uses_mipmaps() { 32.0 } else { 0.0 }
    }
}

impl FilterMode {
    pub(crate) fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            Self::Nearest => wgpu::FilterMode::Nearest,
            Self::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Behaviour for coordinates outside `0..1`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

impl WrapMode {
    pub(crate) fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            Self::Repeat => wgpu::AddressMode::Repeat,
            Self::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            Self::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Sampling parameters baked into an uploaded atlas
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerOptions {
    pub min_filter: MinFilter,
    pub mag_filter: FilterMode,
    /// Applied to both `u` & `v`
    pub wrap: WrapMode,
}

impl SamplerOptions {
    pub(crate) fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let (min_filter, mipmap_filter) = self.min_filter.to_wgpu();
        let address_mode = self.wrap.to_wgpu();

        wgpu::SamplerDescriptor {
            label: Some("Atlas Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: self.mag_filter.to_wgpu(),
            min_filter,
            mipmap_filter,
            lod_min_clamp: 0.0,
            lod_max_clamp: self.min_filter.lod_max_clamp(),
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read atlas {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode atlas: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid atlas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Decoded 8-bit RGBA atlas with its full mip chain
///
/// Rows are stored bottom-up so that `v = 1.0` addresses the top of the
/// picture. `levels()[0]` is the full-size image; each following level halves
/// both sides (never below 1) until 1×1.
#[derive(Clone, Debug)]
pub struct AtlasImage {
    levels: Vec<RgbaImage>,
}

impl AtlasImage {
    /// Reads & decodes an image file of any supported format
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_memory(&bytes)
    }

    /// Decodes an encoded image (PNG, ...) held in memory
    pub fn from_memory(bytes: &[u8]) -> Result<Self, TextureError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba(image)
    }

    /// Wraps a top-down RGBA image, flipping it & generating mip levels
    pub fn from_rgba(mut image: RgbaImage) -> Result<Self, TextureError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions { width, height });
        }

        imageops::flip_vertical_in_place(&mut image);
        Ok(Self {
            levels: mip_chain(image),
        })
    }

    /// 1×1 opaque white image used when the atlas is missing
    pub fn placeholder() -> Self {
        Self {
            levels: vec![RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))],
        }
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width()
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height()
    }

    pub fn levels(&self) -> &[RgbaImage] {
        &self.levels
    }
}

fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base];
    loop {
        let last = &levels[levels.len() - 1];
        let (width, height) = last.dimensions();
        if width == 1 && height == 1 {
            break levels;
        }

        let next = imageops::resize(
            last,
            (width / 2).max(1),
            (height / 2).max(1),
            imageops::FilterType::Triangle,
        );
        levels.push(next);
    }
}

fn fits_backend(image: AtlasImage, max_dimension: u32) -> Result<AtlasImage, TextureError> {
    let (width, height) = (image.width(), image.height());
    if width > max_dimension || height > max_dimension {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    Ok(image)
}

/// Decodes the atlas at `path` & uploads it with the given sampling parameters
///
/// Images larger than the backend's texture limit are rejected. Failures are
/// logged before being returned, so callers that fall back to
/// [`AtlasImage::placeholder`] still leave a trace of what went wrong.
pub fn load_texture<B: RenderBackend>(
    backend: &B,
    path: impl AsRef<Path>,
    sampler: &SamplerOptions,
) -> Result<B::Texture, TextureError> {
    let path = path.as_ref();
    let image = AtlasImage::open(path)
        .and_then(|image| fits_backend(image, backend.max_texture_dimension()))
        .inspect_err(|err| log::error!("{}: {err}", path.display()))?;

    log::debug!(
        "uploading atlas {} ({}x{}, {} mip levels)",
        path.display(),
        image.width(),
        image.height(),
        image.levels().len()
    );
    Ok(backend.create_texture(&image, sampler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let atlas = AtlasImage::from_rgba(RgbaImage::new(8, 2)).unwrap();
        let sizes: Vec<_> = atlas.levels().iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, [(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn rows_are_flipped_bottom_up() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255])); // top
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255])); // bottom

        let atlas = AtlasImage::from_rgba(image).unwrap();
        let base = &atlas.levels()[0];
        assert_eq!(*base.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*base.get_pixel(0, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn decodes_png_from_memory() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let atlas = AtlasImage::from_memory(&bytes).unwrap();
        assert_eq!((atlas.width(), atlas.height()), (4, 4));
        assert_eq!(atlas.levels().len(), 3);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = AtlasImage::from_memory(b"not an image").unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = AtlasImage::from_rgba(RgbaImage::new(0, 4)).unwrap_err();
        assert!(matches!(
            err,
            TextureError::InvalidDimensions {
                width: 0,
                height: 4
            }
        ));
    }

    #[test]
    fn images_over_the_texture_limit_are_rejected() {
        let image = AtlasImage::from_rgba(RgbaImage::new(9000, 16)).unwrap();
        let err = fits_backend(image, 8192).unwrap_err();
        assert!(matches!(
            err,
            TextureError::InvalidDimensions {
                width: 9000,
                height: 16
            }
        ));

        let image = AtlasImage::from_rgba(RgbaImage::new(8192, 16)).unwrap();
        assert!(fits_backend(image, 8192).is_ok());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = AtlasImage::open("definitely/not/here.png").unwrap_err();
        match err {
            TextureError::Io { path, .. } => assert_eq!(path, Path::new("definitely/not/here.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn placeholder_is_single_white_pixel() {
        let atlas = AtlasImage::placeholder();
        assert_eq!(atlas.levels().len(), 1);
        assert_eq!(*atlas.levels()[0].get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn sampler_defaults_are_linear_repeat() {
        let desc = SamplerOptions::default().descriptor();
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        // no mip blending without a mipmap filter
        assert_eq!(desc.lod_max_clamp, 0.0);
    }

    #[test]
    fn mipmapped_min_filters_split_into_two_modes() {
        use wgpu::FilterMode::{Linear, Nearest};

        assert_eq!(MinFilter::LinearMipmapNearest.to_wgpu(), (Linear, Nearest));
        assert_eq!(MinFilter::NearestMipmapLinear.to_wgpu(), (Nearest, Linear));
        assert!(MinFilter::LinearMipmapLinear.lod_max_clamp() > 0.0);
        assert_eq!(WrapMode::MirroredRepeat.to_wgpu(), wgpu::AddressMode::MirrorRepeat);
    }
}
