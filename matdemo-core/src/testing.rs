//! A recording [`Gpu`] used by the unit tests.
//!
//! Shader "compilation" only checks brace balance and scans `uniform` declarations, linking
//! requires a `main` in every stage. Uniform uploads are written into the table of the program
//! the location belongs to, and uploads made while a different program is current are counted
//! as misdirected.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

use glam::{Mat4, Vec3, Vec4};

use crate::{
    gpu::{Gpu, Sampling, ShaderStage},
    mesh::Vertex,
};

pub const VERTEX_SHADER: &str = "\
#version 330 core
layout (location = 0) in vec3 position;
uniform mat4 model_mat;
uniform mat4 view_mat;
uniform mat4 projection_mat;
void main() {
    gl_Position = projection_mat * view_mat * model_mat * vec4(position, 1.0);
}
";

pub const FRAGMENT_SHADER: &str = "\
#version 330 core
uniform float metalness;
uniform bool use_texture;
uniform vec3 light_position;
uniform vec3 view_pos;
uniform float time;
uniform sampler2D water_wave_map;
out vec4 color;
void main() {
    color = vec4(vec3(metalness), 1.0);
}
";

pub const BROKEN_SHADER: &str = "\
#version 330 core
void main() {
    gl_Position = vec4(0.0;
";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recorded {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
    Mat4(Mat4),
}

#[derive(Debug, Clone)]
pub struct MockLocation {
    program: u32,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub sampling: Sampling,
    pub mipmapped: bool,
}

/// A draw call together with the state that was visible when it was issued.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub program: Option<u32>,
    pub index_count: usize,
    pub uniforms: BTreeMap<String, Recorded>,
    pub texture_unit0: Option<u32>,
}

struct MockShader {
    uniforms: Vec<String>,
    has_main: bool,
}

#[derive(Default)]
struct MockProgram {
    declared: Vec<String>,
    values: BTreeMap<String, Recorded>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    current: Option<u32>,
    textures: HashMap<u32, MockTexture>,
    units: HashMap<u32, Option<u32>>,
    meshes: HashMap<u32, usize>,
    draws: Vec<DrawCall>,
    lookups: usize,
    misdirected: usize,
    clears: usize,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MockGpu {
    state: RefCell<State>,
}

fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim().split_whitespace();
            if parts.next() != Some("uniform") {
                return None;
            }
            let _ty = parts.next()?;
            let name = parts.next()?.trim_end_matches(';');
            Some(name.split('[').next().unwrap_or(name).to_string())
        })
        .collect()
}

impl MockGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform values last uploaded to `program`.
    pub fn uniforms(&self, program: u32) -> BTreeMap<String, Recorded> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.values.clone())
            .unwrap_or_default()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    pub fn program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn location_lookups(&self) -> usize {
        self.state.borrow().lookups
    }

    pub fn misdirected_uploads(&self) -> usize {
        self.state.borrow().misdirected
    }

    pub fn texture(&self, texture: u32) -> Option<MockTexture> {
        self.state.borrow().textures.get(&texture).cloned()
    }

    pub fn bound_texture(&self, unit: u32) -> Option<u32> {
        self.state.borrow().units.get(&unit).copied().flatten()
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    fn upload(&self, location: &MockLocation, value: Recorded) {
        let mut state = self.state.borrow_mut();
        if state.current != Some(location.program) {
            state.misdirected += 1;
            return;
        }
        if let Some(program) = state.programs.get_mut(&location.program) {
            program.values.insert(location.name.clone(), value);
        }
    }
}

impl Gpu for MockGpu {
    type Shader = u32;
    type Program = u32;
    type Texture = u32;
    type UniformLocation = MockLocation;
    type Mesh = u32;

    fn compile_shader(&self, _stage: ShaderStage, source: &str) -> Result<u32, String> {
        if source.matches('{').count() != source.matches('}').count()
            || source.matches('(').count() != source.matches(')').count()
        {
            return Err("0:1: error: syntax error, unexpected end of file".to_string());
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.shaders.insert(
            id,
            MockShader {
                uniforms: declared_uniforms(source),
                has_main: source.contains("void main"),
            },
        );
        Ok(id)
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn link_program(&self, shaders: &[u32]) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let mut declared = Vec::new();
        for id in shaders {
            let shader = state
                .shaders
                .get(id)
                .ok_or_else(|| format!("error: unknown shader {id}"))?;
            if !shader.has_main {
                return Err("error: missing main function".to_string());
            }
            declared.extend(shader.uniforms.iter().cloned());
        }
        let id = state.next_id();
        state.programs.insert(
            id,
            MockProgram {
                declared,
                ..Default::default()
            },
        );
        Ok(id)
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<MockLocation> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        let declared = state
            .programs
            .get(&program)
            .is_some_and(|p| p.declared.iter().any(|d| d == name));
        declared.then(|| MockLocation {
            program,
            name: name.to_string(),
        })
    }

    fn uniform_f32(&self, location: &MockLocation, value: f32) {
        self.upload(location, Recorded::Float(value));
    }

    fn uniform_i32(&self, location: &MockLocation, value: i32) {
        self.upload(location, Recorded::Int(value));
    }

    fn uniform_vec3(&self, location: &MockLocation, value: Vec3) {
        self.upload(location, Recorded::Vec3(value));
    }

    fn uniform_mat4(&self, location: &MockLocation, value: &Mat4) {
        self.upload(location, Recorded::Mat4(*value));
    }

    fn create_texture_rgb(
        &self,
        width: u32,
        height: u32,
        pixels: &[u8],
        sampling: Sampling,
    ) -> Result<u32, String> {
        if pixels.len() != (width * height * 3) as usize {
            return Err(format!(
                "expected {} bytes of pixel data, got {}",
                width * height * 3,
                pixels.len()
            ));
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.textures.insert(
            id,
            MockTexture {
                width,
                height,
                pixels: pixels.to_vec(),
                sampling,
                mipmapped: sampling.min_filter.uses_mipmaps(),
            },
        );
        Ok(id)
    }

    fn bind_texture(&self, unit: u32, texture: Option<u32>) {
        self.state.borrow_mut().units.insert(unit, texture);
    }

    fn delete_texture(&self, texture: u32) {
        self.state.borrow_mut().textures.remove(&texture);
    }

    fn create_mesh(&self, _vertices: &[Vertex], indices: &[u32]) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.meshes.insert(id, indices.len());
        Ok(id)
    }

    fn draw_mesh(&self, _mesh: &u32, index_count: usize) {
        let mut state = self.state.borrow_mut();
        let program = state.current;
        let uniforms = program
            .and_then(|id| state.programs.get(&id))
            .map(|p| p.values.clone())
            .unwrap_or_default();
        let texture_unit0 = state.units.get(&0).copied().flatten();
        state.draws.push(DrawCall {
            program,
            index_count,
            uniforms,
            texture_unit0,
        });
    }

    fn delete_mesh(&self, mesh: &u32) {
        self.state.borrow_mut().meshes.remove(mesh);
    }

    fn clear(&self, _color: Vec4) {
        self.state.borrow_mut().clears += 1;
    }
}
