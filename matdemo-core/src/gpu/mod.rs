//! Graphics context abstraction.
//!
//! The [`Gpu`] trait is the narrow set of OpenGL operations issued by the rest of the crate.
//! Every component holds the context explicitly instead of reaching for global GL state, and
//! [`glow::Context`] implements the trait in the `gl` submodule.

mod gl;

pub use gl::GlMesh;

use glam::{Mat4, Vec3, Vec4};

use crate::mesh::Vertex;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Texture coordinate wrapping mode, applied to both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl Filter {
    /// Returns whether sampling with this filter reads from the mipmap chain.
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, Filter::Nearest | Filter::Linear)
    }
}

/// Sampling parameters baked into a texture at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub wrap: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
}

impl Default for Sampling {
    /// Repeat wrapping with trilinear minification and linear magnification.
    fn default() -> Self {
        Self {
            wrap: Wrap::Repeat,
            min_filter: Filter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
        }
    }
}

/// The operations the demo needs from a graphics context.
///
/// Uniform uploads always target the program made current by the last
/// [`Gpu::use_program`] call, mirroring OpenGL's addressing model.
pub trait Gpu {
    type Shader: Copy;
    type Program: Copy + PartialEq + std::fmt::Debug;
    type Texture: Copy + PartialEq + std::fmt::Debug;
    type UniformLocation: Clone;
    type Mesh;

    /// Compiles a single stage. On failure the compiler log is returned.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    fn delete_shader(&self, shader: Self::Shader);

    /// Links the given stages into a program. On failure the linker log is returned.
    fn link_program(&self, shaders: &[Self::Shader]) -> Result<Self::Program, String>;

    fn delete_program(&self, program: Self::Program);

    /// Makes `program` current, or unbinds any program when `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Looks up a uniform by name. Uniforms the program does not declare (or that the driver
    /// optimised away) yield `None`.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    fn uniform_f32(&self, location: &Self::UniformLocation, value: f32);

    fn uniform_i32(&self, location: &Self::UniformLocation, value: i32);

    fn uniform_vec3(&self, location: &Self::UniformLocation, value: Vec3);

    fn uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4);

    /// Uploads tightly packed RGB8 pixels as a 2D texture, generating mipmaps when the
    /// sampling configuration needs them.
    fn create_texture_rgb(
        &self,
        width: u32,
        height: u32,
        pixels: &[u8],
        sampling: Sampling,
    ) -> Result<Self::Texture, String>;

    /// Binds `texture` (or nothing) to the given texture unit.
    fn bind_texture(&self, unit: u32, texture: Option<Self::Texture>);

    fn delete_texture(&self, texture: Self::Texture);

    /// Uploads interleaved vertices and triangle indices.
    fn create_mesh(&self, vertices: &[Vertex], indices: &[u32]) -> Result<Self::Mesh, String>;

    /// Issues an indexed triangle draw of `index_count` indices.
    fn draw_mesh(&self, mesh: &Self::Mesh, index_count: usize);

    fn delete_mesh(&self, mesh: &Self::Mesh);

    /// Clears the colour and depth buffers.
    fn clear(&self, color: Vec4);
}
