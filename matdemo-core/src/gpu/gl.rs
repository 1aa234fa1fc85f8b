//! [`Gpu`] implementation on top of [`glow`].

use glam::{Mat4, Vec3, Vec4};
use glow::HasContext;

use super::{Filter, Gpu, Sampling, ShaderStage, Wrap};
use crate::{mesh::Vertex, texture::rgb_len};

/// GPU-side buffers of an uploaded mesh.
#[derive(Debug, Clone, Copy)]
pub struct GlMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn wrap_enum(wrap: Wrap) -> i32 {
    (match wrap {
        Wrap::Repeat => glow::REPEAT,
        Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
    }) as i32
}

fn filter_enum(filter: Filter) -> i32 {
    (match filter {
        Filter::Nearest => glow::NEAREST,
        Filter::Linear => glow::LINEAR,
        Filter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        Filter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        Filter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        Filter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

impl Gpu for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;
    type Mesh = GlMesh;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        unsafe {
            let shader = self.create_shader(stage_enum(stage))?;
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);

            if !self.get_shader_compile_status(shader) {
                let log = self.get_shader_info_log(shader);
                HasContext::delete_shader(self, shader);
                return Err(log);
            }

            Ok(shader)
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe {
            HasContext::delete_shader(self, shader);
        }
    }

    fn link_program(&self, shaders: &[Self::Shader]) -> Result<Self::Program, String> {
        unsafe {
            let program = self.create_program()?;

            for shader in shaders {
                self.attach_shader(program, *shader);
            }

            HasContext::link_program(self, program);

            for shader in shaders {
                self.detach_shader(program, *shader);
            }

            if !self.get_program_link_status(program) {
                let log = self.get_program_info_log(program);
                HasContext::delete_program(self, program);
                return Err(log);
            }

            Ok(program)
        }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe {
            HasContext::delete_program(self, program);
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe {
            HasContext::use_program(self, program);
        }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn uniform_f32(&self, location: &Self::UniformLocation, value: f32) {
        unsafe {
            self.uniform_1_f32(Some(location), value);
        }
    }

    fn uniform_i32(&self, location: &Self::UniformLocation, value: i32) {
        unsafe {
            self.uniform_1_i32(Some(location), value);
        }
    }

    fn uniform_vec3(&self, location: &Self::UniformLocation, value: Vec3) {
        unsafe {
            self.uniform_3_f32(Some(location), value.x, value.y, value.z);
        }
    }

    fn uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4) {
        unsafe {
            self.uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array());
        }
    }

    fn create_texture_rgb(
        &self,
        width: u32,
        height: u32,
        pixels: &[u8],
        sampling: Sampling,
    ) -> Result<Self::Texture, String> {
        let expected = rgb_len(width, height);
        if pixels.len() != expected {
            return Err(format!(
                "expected {expected} bytes of RGB data, got {}",
                pixels.len()
            ));
        }

        unsafe {
            let texture = self.create_texture()?;
            HasContext::bind_texture(self, glow::TEXTURE_2D, Some(texture));

            let wrap = wrap_enum(sampling.wrap);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            self.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                filter_enum(sampling.min_filter),
            );
            self.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                filter_enum(sampling.mag_filter),
            );

            // RGB rows are not 4-byte aligned for odd widths
            self.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB as i32,
                width as i32,
                height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
            self.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);

            if sampling.min_filter.uses_mipmaps() {
                self.generate_mipmap(glow::TEXTURE_2D);
            }

            HasContext::bind_texture(self, glow::TEXTURE_2D, None);

            Ok(texture)
        }
    }

    fn bind_texture(&self, unit: u32, texture: Option<Self::Texture>) {
        unsafe {
            self.active_texture(glow::TEXTURE0 + unit);
            HasContext::bind_texture(self, glow::TEXTURE_2D, texture);
        }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe {
            HasContext::delete_texture(self, texture);
        }
    }

    fn create_mesh(&self, vertices: &[Vertex], indices: &[u32]) -> Result<Self::Mesh, String> {
        unsafe {
            let vao = self.create_vertex_array()?;
            let vbo = self.create_buffer()?;
            let ebo = self.create_buffer()?;

            self.bind_vertex_array(Some(vao));
            self.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            self.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    vertices.as_ptr() as *const u8,
                    std::mem::size_of_val(vertices),
                ),
                glow::STATIC_DRAW,
            );

            self.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            self.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    indices.as_ptr() as *const u8,
                    std::mem::size_of_val(indices),
                ),
                glow::STATIC_DRAW,
            );

            let stride = std::mem::size_of::<Vertex>() as i32;
            for (index, (size, offset)) in Vertex::ATTRIBUTES.iter().enumerate() {
                self.enable_vertex_attrib_array(index as u32);
                self.vertex_attrib_pointer_f32(
                    index as u32,
                    *size,
                    glow::FLOAT,
                    false,
                    stride,
                    *offset,
                );
            }

            self.bind_vertex_array(None);
            self.bind_buffer(glow::ARRAY_BUFFER, None);
            self.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(GlMesh { vao, vbo, ebo })
        }
    }

    fn draw_mesh(&self, mesh: &Self::Mesh, index_count: usize) {
        unsafe {
            self.bind_vertex_array(Some(mesh.vao));
            self.draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0);
            self.bind_vertex_array(None);
        }
    }

    fn delete_mesh(&self, mesh: &Self::Mesh) {
        unsafe {
            self.delete_buffer(mesh.vbo);
            self.delete_buffer(mesh.ebo);
            self.delete_vertex_array(mesh.vao);
        }
    }

    fn clear(&self, color: Vec4) {
        unsafe {
            self.clear_color(color.x, color.y, color.z, color.w);
            HasContext::clear(self, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }
}
