//! Drawable objects: a GPU mesh placed in the world, spinning about an axis.

use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use crate::{gpu::Gpu, mesh::Mesh, shader::ShaderProgram, texture::Texture};

/// Constant angular velocity about an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub axis: Vec3,
    pub degrees_per_second: f32,
}

impl Spin {
    pub const NONE: Spin = Spin {
        axis: Vec3::Z,
        degrees_per_second: 0.0,
    };

    pub fn new(degrees_per_second: f32, axis: Vec3) -> Self {
        Self {
            axis,
            degrees_per_second,
        }
    }

    /// Rotation angle in degrees after `elapsed` seconds.
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        self.degrees_per_second * elapsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub location: Vec3,
    pub scale: Vec3,
    pub spin: Spin,
}

impl Transform {
    /// Builds `translate * rotate * scale` for the given rotation angle in degrees.
    pub fn model_matrix(&self, angle: f32) -> Mat4 {
        let axis = self.spin.axis.try_normalize().unwrap_or(Vec3::Z);
        Mat4::from_translation(self.location)
            * Mat4::from_quat(Quat::from_axis_angle(axis, angle.to_radians()))
            * Mat4::from_scale(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            scale: Vec3::ONE,
            spin: Spin::NONE,
        }
    }
}

/// A texture attached to a drawable and the sampler uniform that reads it.
pub struct TextureBinding<G: Gpu = glow::Context> {
    pub texture: Rc<Texture<G>>,
    pub sampler: String,
}

/// A mesh with its transform, a shared program and an optional texture.
pub struct Drawable<G: Gpu = glow::Context> {
    mesh: Mesh<G>,
    program: Rc<ShaderProgram<G>>,
    texture: Option<TextureBinding<G>>,
    pub transform: Transform,
    angle: f32,
}

impl<G: Gpu> Drawable<G> {
    pub fn new(mesh: Mesh<G>, program: Rc<ShaderProgram<G>>, transform: Transform) -> Self {
        Self {
            mesh,
            program,
            texture: None,
            transform,
            angle: 0.0,
        }
    }

    /// Attaches a texture read through the sampler uniform `sampler`.
    pub fn with_texture(mut self, texture: Rc<Texture<G>>, sampler: &str) -> Self {
        self.texture = Some(TextureBinding {
            texture,
            sampler: sampler.to_string(),
        });
        self
    }

    pub fn program(&self) -> &Rc<ShaderProgram<G>> {
        &self.program
    }

    pub fn texture(&self) -> Option<&TextureBinding<G>> {
        self.texture.as_ref()
    }

    /// Rotation angle in degrees used by the last draw.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix(self.angle)
    }

    /// Uploads `model_mat` and issues the draw call.
    ///
    /// The drawable's program must already be current.
    pub fn draw(&mut self, elapsed: f32) {
        self.angle = self.transform.spin.angle_at(elapsed);
        self.program.set_uniform("model_mat", self.model_matrix());
        self.mesh.draw();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec4;

    use super::*;
    use crate::{
        mesh::MeshData,
        shader::ShaderProgramBuilder,
        testing::{FRAGMENT_SHADER, MockGpu, Recorded, VERTEX_SHADER},
    };

    fn triangle() -> MeshData {
        MeshData::parse_obj(&mut "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_angle_is_linear_in_elapsed_time() {
        let spin = Spin::new(1.0, Vec3::Z);
        assert_eq!(spin.angle_at(2.0), 2.0 * spin.angle_at(1.0));

        let spin = Spin::new(37.3, Vec3::Z);
        assert_eq!(spin.angle_at(2.0), 2.0 * spin.angle_at(1.0));
    }

    #[test]
    fn test_model_matrix_order() {
        let transform = Transform {
            location: Vec3::new(10.0, 0.0, 0.0),
            scale: Vec3::splat(2.0),
            spin: Spin::new(90.0, Vec3::Z),
        };
        let point = transform.model_matrix(90.0) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(point.abs_diff_eq(Vec4::new(10.0, 2.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn test_zero_axis_falls_back() {
        let transform = Transform {
            spin: Spin::new(45.0, Vec3::ZERO),
            ..Default::default()
        };
        assert!(transform.model_matrix(45.0).is_finite());
    }

    #[test]
    fn test_draw_uploads_model_matrix() {
        let gpu = Arc::new(MockGpu::new());
        let program = Rc::new(
            ShaderProgramBuilder::new(&gpu)
                .vertex(VERTEX_SHADER)
                .fragment(FRAGMENT_SHADER)
                .build()
                .unwrap(),
        );
        let mesh = Mesh::new(&gpu, &triangle()).unwrap();
        let mut drawable = Drawable::new(
            mesh,
            Rc::clone(&program),
            Transform {
                spin: Spin::new(1.0, Vec3::Z),
                ..Default::default()
            },
        );

        program.use_program();
        drawable.draw(1.0);
        let after_one = drawable.angle();
        drawable.draw(2.0);
        assert_eq!(drawable.angle(), 2.0 * after_one);

        let draws = gpu.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].index_count, 3);
        assert_eq!(
            draws[1].uniforms.get("model_mat"),
            Some(&Recorded::Mat4(drawable.model_matrix()))
        );
    }
}
