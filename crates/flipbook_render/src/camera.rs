use glam::{Mat4, Vec2, Vec3};

/// Fixed perspective camera looking at the overlay plane
///
/// Sprites live on the `z = 0` plane; the default camera sits 10 units in
/// front of it, so roughly `x ∈ [-5.5, 5.5]`, `y ∈ [-4.1, 4.1]` is visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayCamera {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for OverlayCamera {
    fn default() -> Self {
        Self {
            fov_y: 45f32.to_radians(),
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl OverlayCamera {
    /// Returns the perspective view-projection matrix (wgpu depth range 0..1)
    pub fn view_proj(&self) -> Mat4 {
        let projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        projection * view
    }
}

/// Placement of a sprite on the overlay plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Width & height of the quad in world units
    pub size: Vec2,
    /// Counter-clockwise rotation around the sprite centre, in radians
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Model matrix; size is baked into the quad vertices, not this matrix
    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.position.extend(0.0)) * Mat4::from_rotation_z(self.rotation)
    }
}

/// Uniform block consumed by the sprite vertex shader at group 1
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub mvp: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(camera: &OverlayCamera, transform: &Transform) -> Self {
        Self {
            mvp: (camera.view_proj() * transform.model()).to_cols_array_2d(),
        }
    }
}
