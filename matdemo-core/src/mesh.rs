//! Mesh management module.
//!
//! [`MeshData`] is the CPU side of a mesh, parsed from Wavefront OBJ files. [`Mesh`] is the same
//! geometry uploaded to the GPU.

use std::{io::BufRead, path::Path, sync::Arc};

use glam::Vec3;

use crate::gpu::Gpu;

/// Errors that can occur while loading or uploading a mesh.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("OBJ loading error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("No mesh data found")]
    NoMeshData,

    #[error("Failed to upload mesh: {0}")]
    Create(String),
}

/// Interleaved vertex layout shared by every mesh in the demo.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// `(component count, byte offset)` of each attribute, in attribute-location order.
    pub const ATTRIBUTES: [(i32, i32); 3] = [(3, 0), (3, 12), (2, 24)];
}

/// Triangle geometry on the CPU side.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

impl MeshData {
    /// Loads every model of an OBJ file into a single mesh.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        log::debug!("Loading OBJ file {}", path.display());
        let (models, _materials) = tobj::load_obj(path, &load_options())?;
        Self::from_models(&models)
    }

    /// Parses OBJ text from a reader. Material libraries are ignored.
    pub fn parse_obj<R: BufRead>(reader: &mut R) -> Result<Self, MeshError> {
        let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        Self::from_models(&models)
    }

    fn from_models(models: &[tobj::Model]) -> Result<Self, MeshError> {
        let mut data = MeshData::default();

        for model in models {
            let mesh = &model.mesh;
            let base = data.vertices.len() as u32;
            let vertex_count = mesh.positions.len() / 3;
            let has_normals = mesh.normals.len() == mesh.positions.len();
            let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

            for i in 0..vertex_count {
                let position = [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ];
                let normal = if has_normals {
                    [
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                    ]
                } else {
                    [0.0; 3]
                };
                let uv = if has_uvs {
                    [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0; 2]
                };
                data.vertices.push(Vertex {
                    position,
                    normal,
                    uv,
                });
            }

            let first_index = data.indices.len();
            data.indices.extend(mesh.indices.iter().map(|i| i + base));

            if !has_normals {
                compute_normals(&mut data.vertices, &data.indices[first_index..]);
            }

            log::debug!(
                "OBJ model '{}': {} vertices, {} indices",
                model.name,
                vertex_count,
                mesh.indices.len()
            );
        }

        if data.indices.is_empty() {
            return Err(MeshError::NoMeshData);
        }

        Ok(data)
    }

    /// Returns the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Accumulates area-weighted face normals into the referenced vertices.
fn compute_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let pa = Vec3::from(vertices[triangle[0] as usize].position);
        let pb = Vec3::from(vertices[triangle[1] as usize].position);
        let pc = Vec3::from(vertices[triangle[2] as usize].position);
        let face = (pb - pa).cross(pc - pa);
        for &index in triangle {
            let vertex = &mut vertices[index as usize];
            vertex.normal = (Vec3::from(vertex.normal) + face).into();
        }
    }

    for &index in indices {
        let vertex = &mut vertices[index as usize];
        vertex.normal = Vec3::from(vertex.normal).normalize_or_zero().into();
    }
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh<G: Gpu = glow::Context> {
    gpu: Arc<G>,
    raw: G::Mesh,
    index_count: usize,
}

impl<G: Gpu> Mesh<G> {
    /// Uploads the given geometry.
    pub fn new(gpu: &Arc<G>, data: &MeshData) -> Result<Self, MeshError> {
        let raw = gpu
            .create_mesh(&data.vertices, &data.indices)
            .map_err(MeshError::Create)?;

        Ok(Self {
            gpu: Arc::clone(gpu),
            raw,
            index_count: data.indices.len(),
        })
    }

    /// Issues the draw call. The caller must have a program current.
    pub fn draw(&self) {
        self.gpu.draw_mesh(&self.raw, self.index_count);
    }

    /// Returns the number of indices drawn per call.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl<G: Gpu> Drop for Mesh<G> {
    fn drop(&mut self) {
        self.gpu.delete_mesh(&self.raw);
    }
}
