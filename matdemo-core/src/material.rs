//! Material tables.
//!
//! A [`MaterialSlot`] is an ordered list of named uniform values describing the surface of one
//! drawable. Values are tagged with their upload type up front instead of being inspected when
//! they are bound.

use glam::Vec3;
use indexmap::IndexMap;

use crate::{
    gpu::Gpu,
    shader::{ShaderProgram, Uniform},
};

/// A uniform value with its upload type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Int(i32),
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

/// Narrowed to `f32`; lets untyped float literals be used directly.
impl From<f64> for UniformValue {
    fn from(value: f64) -> Self {
        UniformValue::Float(value as f32)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Int(value as i32)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(value: [f32; 3]) -> Self {
        UniformValue::Vec3(Vec3::from(value))
    }
}

impl Uniform for UniformValue {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        match self {
            UniformValue::Float(value) => value.set_uniform(gpu, location),
            UniformValue::Vec3(value) => value.set_uniform(gpu, location),
            UniformValue::Int(value) => value.set_uniform(gpu, location),
        }
    }
}

/// Uniform name to value table, bound in insertion order.
///
/// Inserting a name twice keeps its original position and the latest value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialSlot {
    uniforms: IndexMap<String, UniformValue>,
}

impl MaterialSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a uniform, builder style.
    pub fn with(mut self, name: &str, value: impl Into<UniformValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.uniforms.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.uniforms.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.uniforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty()
    }

    /// Uploads every entry to `program`, which must be current. Names the program does not
    /// declare are skipped.
    pub fn apply<G: Gpu>(&self, program: &ShaderProgram<G>) {
        for (name, value) in &self.uniforms {
            program.set_uniform(name, value);
        }
    }
}

impl<S: Into<String>, V: Into<UniformValue>> FromIterator<(S, V)> for MaterialSlot {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self {
            uniforms: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
