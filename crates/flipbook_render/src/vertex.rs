use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::animation::FrameUv;

/// Index list expanding the 4-vertex fan into two triangles
pub const FAN_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// A single corner of a sprite quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex
    ///
    /// - `position`: `[x, y]` in the sprite's local space
    /// - `tex_coords`: `[u, v]` in normalized (0–1) atlas space, `v = 1` at the top
    pub fn new(position: [f32; 2], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            tex_coords,
        }
    }

    /// Returns the vertex buffer layout
    ///
    /// This must match the vertex shader input layout:
    /// - location 0: `vec2<f32>` (position)
    /// - location 1: `vec2<f32>` (texture coordinates)
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Builds the fan-ordered quad of `size` centred on the local origin
///
/// Corners are lower-left, lower-right, upper-right, upper-left, each paired
/// with the matching corner of `uv`.
pub fn quad_vertices(size: Vec2, uv: &FrameUv) -> [Vertex; 4] {
    let half = size * 0.5;
    let positions = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ];

    let corners = uv.corners();
    std::array::from_fn(|i| Vertex::new(positions[i].to_array(), corners[i].to_array()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn layout_matches_shader_inputs() {
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 16);
        assert_eq!(desc.attributes[0].offset, 0);
        assert_eq!(desc.attributes[1].offset, 8);
        assert_eq!(desc.attributes[1].shader_location, 1);
    }

    #[test]
    fn quad_is_centred_and_fan_ordered() {
        let uv = FrameUv {
            lower_left: vec2(0.0, 0.5),
            lower_right: vec2(0.5, 0.5),
            upper_right: vec2(0.5, 1.0),
            upper_left: vec2(0.0, 1.0),
        };
        let quad = quad_vertices(vec2(2.0, 4.0), &uv);

        assert_eq!(quad[0], Vertex::new([-1.0, -2.0], [0.0, 0.5]));
        assert_eq!(quad[1], Vertex::new([1.0, -2.0], [0.5, 0.5]));
        assert_eq!(quad[2], Vertex::new([1.0, 2.0], [0.5, 1.0]));
        assert_eq!(quad[3], Vertex::new([-1.0, 2.0], [0.0, 1.0]));
    }

    #[test]
    fn fan_indices_cover_both_triangles() {
        // both triangles share the first and third corner
        assert_eq!(&FAN_INDICES[..3], &[0, 1, 2]);
        assert_eq!(&FAN_INDICES[3..], &[0, 2, 3]);
    }
}
