//! The core of the material demo. This crate contains everything between the window and the
//! GPU: shader program building, texture and mesh loading, drawables, the camera and the
//! per-frame material uniform binding.
//!
//! All GPU work goes through the [`gpu::Gpu`] trait, implemented for [`glow::Context`].

pub mod binder;
pub mod camera;
pub mod drawable;
pub mod gpu;
pub mod material;
pub mod mesh;
pub mod shader;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;

pub use binder::{FrameUniforms, MaterialBinder, RenderItem, TEXTURE_UNIT};
pub use camera::{Camera, Projection};
pub use drawable::{Drawable, Spin, Transform};
pub use gpu::{Filter, Gpu, Sampling, ShaderStage, Wrap};
pub use material::{MaterialSlot, UniformValue};
pub use mesh::{Mesh, MeshData, MeshError, Vertex};
pub use shader::{Shader, ShaderError, ShaderProgram, ShaderProgramBuilder, Uniform};
pub use texture::{Texture, TextureError};
