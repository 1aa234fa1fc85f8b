//! Per-frame material binding.
//!
//! For every [`RenderItem`], in order, the [`MaterialBinder`] makes the drawable's program
//! current, pushes the frame, camera and material uniforms, binds the drawable's texture to unit
//! 0 and draws. Uniforms a program does not declare are skipped without complaint.

use std::{rc::Rc, sync::Arc};

use glam::{Vec3, Vec4};

use crate::{camera::Camera, drawable::Drawable, gpu::Gpu, material::MaterialSlot};

/// Texture unit used for a drawable's texture.
pub const TEXTURE_UNIT: u32 = 0;

/// Values shared by every drawable in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub light_position: Vec3,
    pub view_position: Vec3,
    /// Seconds since startup.
    pub time: f32,
}

/// A drawable and the material table bound before drawing it.
pub struct RenderItem<G: Gpu = glow::Context> {
    pub drawable: Drawable<G>,
    pub material: MaterialSlot,
}

pub struct MaterialBinder<G: Gpu = glow::Context> {
    gpu: Arc<G>,
    pub clear_color: Vec4,
    /// Unbinds unit 0 after each textured draw.
    pub unbind_textures: bool,
}

impl<G: Gpu> MaterialBinder<G> {
    pub fn new(gpu: &Arc<G>) -> Self {
        Self {
            gpu: Arc::clone(gpu),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            unbind_textures: true,
        }
    }

    /// Clears the framebuffer and draws every item.
    pub fn render_frame(
        &self,
        items: &mut [RenderItem<G>],
        camera: &mut Camera,
        frame: &FrameUniforms,
    ) {
        self.gpu.clear(self.clear_color);
        for item in items.iter_mut() {
            self.draw_item(item, camera, frame);
        }
    }

    /// Binds one item's program, uniforms and texture, then draws it.
    pub fn draw_item(&self, item: &mut RenderItem<G>, camera: &mut Camera, frame: &FrameUniforms) {
        let program = Rc::clone(item.drawable.program());
        program.use_program();

        program.set_uniform("light_position", frame.light_position);
        program.set_uniform("view_pos", frame.view_position);
        program.set_uniform("time", frame.time);
        camera.update(&program);
        item.material.apply(&program);

        let textured = match item.drawable.texture() {
            Some(binding) => {
                binding.texture.bind(TEXTURE_UNIT);
                program.set_uniform(&binding.sampler, TEXTURE_UNIT as i32);
                true
            }
            None => false,
        };

        item.drawable.draw(frame.time);

        if textured && self.unbind_textures {
            self.gpu.bind_texture(TEXTURE_UNIT, None);
        }
    }
}
