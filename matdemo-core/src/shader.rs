//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing shader programs,
//! the [`ShaderProgramBuilder`] that compiles and links a vertex/fragment pair, and the
//! [`Uniform`] trait for values that can be uploaded as uniforms.
//!
//! Setting a uniform the program does not declare is a silent no-op. Shader variants are free to
//! leave out uniforms they do not use.

use std::{cell::RefCell, sync::Arc};

use fxhash::FxHashMap;
use glam::{Mat4, Vec3};

use crate::gpu::{Gpu, ShaderStage};

/// Errors raised while building a shader program. All of them are fatal for the demo.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("Failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("Failed to link shader program: {log}")]
    Link { log: String },

    #[error("Shader program is missing a {0} stage")]
    MissingStage(ShaderStage),
}

/// Represents an individual compiled shader stage.
pub struct Shader<G: Gpu = glow::Context> {
    gpu: Arc<G>,
    id: G::Shader,
    stage: ShaderStage,
}

impl<G: Gpu> Shader<G> {
    /// Compiles a new shader from the given source code.
    pub fn new(gpu: &Arc<G>, stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let id = gpu
            .compile_shader(stage, source)
            .map_err(|log| ShaderError::Compile { stage, log })?;

        Ok(Self {
            gpu: Arc::clone(gpu),
            id,
            stage,
        })
    }

    /// Returns the stage this shader was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<G: Gpu> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gpu.delete_shader(self.id);
    }
}

/// A value that can be uploaded to a uniform location.
pub trait Uniform {
    /// Uploads the value to `location` of the currently bound program.
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation);
}

impl Uniform for bool {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_i32(location, *self as i32);
    }
}

impl Uniform for f32 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_f32(location, *self);
    }
}

impl Uniform for i32 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_i32(location, *self);
    }
}

impl Uniform for Vec3 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_vec3(location, *self);
    }
}

impl Uniform for Mat4 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_mat4(location, self);
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        (*self).set_uniform(gpu, location);
    }
}

/// Represents a linked shader program.
///
/// Uniform locations are looked up once per name and cached, including names the program does
/// not declare.
pub struct ShaderProgram<G: Gpu = glow::Context> {
    gpu: Arc<G>,
    id: G::Program,
    label: String,
    locations: RefCell<FxHashMap<String, Option<G::UniformLocation>>>,
}

impl<G: Gpu> ShaderProgram<G> {
    /// Links a new shader program from the given shaders.
    pub fn new(gpu: &Arc<G>, label: &str, shaders: &[&Shader<G>]) -> Result<Self, ShaderError> {
        let ids: Vec<G::Shader> = shaders.iter().map(|shader| shader.id).collect();
        let id = gpu
            .link_program(&ids)
            .map_err(|log| ShaderError::Link { log })?;

        Ok(Self {
            gpu: Arc::clone(gpu),
            id,
            label: label.to_string(),
            locations: RefCell::new(FxHashMap::default()),
        })
    }

    /// Returns the raw program handle.
    pub fn id(&self) -> G::Program {
        self.id
    }

    /// Returns the name the program was built with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.gpu.use_program(Some(self.id));
    }

    fn location(&self, name: &str) -> Option<G::UniformLocation> {
        if let Some(cached) = self.locations.borrow().get(name) {
            return cached.clone();
        }
        let location = self.gpu.uniform_location(self.id, name);
        self.locations
            .borrow_mut()
            .insert(name.to_string(), location.clone());
        location
    }

    /// Returns whether the program declares an active uniform called `name`.
    pub fn has_uniform(&self, name: &str) -> bool {
        self.location(name).is_some()
    }

    /// Sets a uniform variable in the shader program. The program must be current.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.location(name) {
            value.set_uniform(&*self.gpu, &location);
        }
    }
}

impl<G: Gpu> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gpu.delete_program(self.id);
    }
}

/// Compiles a vertex/fragment source pair and links it into a [`ShaderProgram`].
pub struct ShaderProgramBuilder<'a, G: Gpu = glow::Context> {
    gpu: &'a Arc<G>,
    label: &'a str,
    vertex: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a, G: Gpu> ShaderProgramBuilder<'a, G> {
    pub fn new(gpu: &'a Arc<G>) -> Self {
        Self {
            gpu,
            label: "unnamed",
            vertex: None,
            fragment: None,
        }
    }

    /// Names the program in logs.
    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn vertex(mut self, source: &'a str) -> Self {
        self.vertex = Some(source);
        self
    }

    pub fn fragment(mut self, source: &'a str) -> Self {
        self.fragment = Some(source);
        self
    }

    /// Compiles both stages and links them. Stops at the first failure.
    pub fn build(self) -> Result<ShaderProgram<G>, ShaderError> {
        let vertex_source = self
            .vertex
            .ok_or(ShaderError::MissingStage(ShaderStage::Vertex))?;
        let fragment_source = self
            .fragment
            .ok_or(ShaderError::MissingStage(ShaderStage::Fragment))?;

        let vertex = Shader::new(self.gpu, ShaderStage::Vertex, vertex_source)?;
        let fragment = Shader::new(self.gpu, ShaderStage::Fragment, fragment_source)?;
        let program = ShaderProgram::new(self.gpu, self.label, &[&vertex, &fragment])?;

        log::debug!("Linked shader program '{}'", self.label);
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BROKEN_SHADER, FRAGMENT_SHADER, MockGpu, Recorded, VERTEX_SHADER};

    fn build(
        gpu: &Arc<MockGpu>,
        vertex: &str,
        fragment: &str,
    ) -> Result<ShaderProgram<MockGpu>, ShaderError> {
        ShaderProgramBuilder::new(gpu)
            .label("test")
            .vertex(vertex)
            .fragment(fragment)
            .build()
    }

    #[test]
    fn test_build_valid_program() {
        let gpu = Arc::new(MockGpu::new());
        let program = build(&gpu, VERTEX_SHADER, FRAGMENT_SHADER).unwrap();
        assert_eq!(program.label(), "test");
        assert!(program.has_uniform("model_mat"));
        assert!(program.has_uniform("metalness"));
        assert!(!program.has_uniform("roughness"));
    }

    #[test]
    fn test_compile_error_reports_stage_and_log() {
        let gpu = Arc::new(MockGpu::new());

        match build(&gpu, VERTEX_SHADER, BROKEN_SHADER) {
            Err(ShaderError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("error"));
            }
            _ => panic!("expected a fragment compile error"),
        }

        match build(&gpu, BROKEN_SHADER, FRAGMENT_SHADER) {
            Err(ShaderError::Compile { stage, .. }) => assert_eq!(stage, ShaderStage::Vertex),
            _ => panic!("expected a vertex compile error"),
        }

        assert_eq!(gpu.program_count(), 0);
    }

    #[test]
    fn test_link_error() {
        let gpu = Arc::new(MockGpu::new());
        let no_main = "#version 330 core\nuniform float time;\n";
        let result = build(&gpu, no_main, FRAGMENT_SHADER);
        assert!(matches!(result, Err(ShaderError::Link { .. })));
        assert_eq!(gpu.program_count(), 0);
    }

    #[test]
    fn test_missing_stage() {
        let gpu = Arc::new(MockGpu::new());
        let result = ShaderProgramBuilder::new(&gpu).vertex(VERTEX_SHADER).build();
        assert!(matches!(
            result,
            Err(ShaderError::MissingStage(ShaderStage::Fragment))
        ));
    }

    #[test]
    fn test_missing_uniform_is_a_no_op() {
        let gpu = Arc::new(MockGpu::new());
        let program = build(&gpu, VERTEX_SHADER, FRAGMENT_SHADER).unwrap();
        program.use_program();
        program.set_uniform("metalness", 0.5f32);

        let before = gpu.uniforms(program.id());
        program.set_uniform("roughness", 0.25f32);
        program.set_uniform("does_not_exist", Vec3::ONE);
        assert_eq!(gpu.uniforms(program.id()), before);
        assert_eq!(before.get("metalness"), Some(&Recorded::Float(0.5)));
    }

    #[test]
    fn test_uniform_locations_are_cached() {
        let gpu = Arc::new(MockGpu::new());
        let program = build(&gpu, VERTEX_SHADER, FRAGMENT_SHADER).unwrap();
        program.use_program();
        for _ in 0..3 {
            program.set_uniform("metalness", 1.0f32);
            program.set_uniform("roughness", 1.0f32);
        }
        assert_eq!(gpu.location_lookups(), 2);
    }

    #[test]
    fn test_bool_uploads_as_int() {
        let gpu = Arc::new(MockGpu::new());
        let program = build(&gpu, VERTEX_SHADER, FRAGMENT_SHADER).unwrap();
        program.use_program();
        program.set_uniform("use_texture", true);
        assert_eq!(
            gpu.uniforms(program.id()).get("use_texture"),
            Some(&Recorded::Int(1))
        );
    }
}
