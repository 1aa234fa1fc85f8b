//! The demo scene: three spinning spheres, each with its own program and material table.
//!
//! Both variants share everything except which program draws the third sphere and where the
//! water normal map comes from.

use std::{rc::Rc, sync::Arc};

use glam::Vec3;
use include_dir::{Dir, include_dir};
use matdemo_core::{
    Camera, Drawable, MaterialSlot, Mesh, MeshData, MeshError, Projection, RenderItem, Sampling,
    ShaderError, ShaderProgram, ShaderProgramBuilder, Spin, Texture, TextureError, Transform,
};

use crate::{
    config::{DemoConfig, Variant},
    procedural,
};

static SHADERS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/shaders");

const SPHERE_SCALE: f32 = 0.1;
const SPHERE_SPACING: f32 = 0.5;
const SPIN_DEGREES_PER_SECOND: f32 = 60.0;
const WATER_SAMPLER: &str = "water_wave_map";
const PROCEDURAL_MAP_SIZE: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Shader source '{0}' is not embedded")]
    MissingShader(String),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("Failed to load sphere mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// The shader programs available to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Metal,
    Water,
    Opaque,
}

impl ProgramKind {
    fn fragment_file(self) -> &'static str {
        match self {
            ProgramKind::Metal => "metal.glsl",
            ProgramKind::Water => "water.glsl",
            ProgramKind::Opaque => "opaque.glsl",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProgramKind::Metal => "metal",
            ProgramKind::Water => "water",
            ProgramKind::Opaque => "opaque",
        }
    }
}

/// Which program draws each sphere, left to right.
pub fn wiring(variant: Variant) -> [ProgramKind; 3] {
    match variant {
        Variant::Textured => [ProgramKind::Metal, ProgramKind::Water, ProgramKind::Opaque],
        Variant::Procedural => [ProgramKind::Metal, ProgramKind::Water, ProgramKind::Metal],
    }
}

/// Material tables of the three spheres, left to right.
pub fn materials() -> [MaterialSlot; 3] {
    let metal = MaterialSlot::new()
        .with("metallic", 1.0)
        .with("metalness", 1.0)
        .with("roughness", 0.3)
        .with("fresnel", 0.1);

    let water = MaterialSlot::new()
        .with("light_pos", Vec3::splat(3.0))
        .with("light_color", Vec3::ONE)
        .with("deep_water_color", Vec3::new(0.0, 0.3, 0.5))
        .with("shallow_water_color", Vec3::new(0.5, 0.8, 0.9))
        .with("wave_speed", 0.3)
        .with("wave_strength", 0.08)
        .with("specular_power", 128.0)
        .with("specular_intensity", 0.8)
        .with("fresnel_power", 2.0)
        .with("fresnel_scale", 0.8)
        .with("fresnel_bias", 0.1)
        .with("refraction_strength", 0.1)
        .with("metalness", 0.1)
        .with("roughness", 0.2)
        .with("fresnel", 0.8);

    let matte = MaterialSlot::new()
        .with("object_color", Vec3::splat(0.5))
        .with("metalness", 0.0)
        .with("roughness", 0.9)
        .with("fresnel", 0.0);

    [metal, water, matte]
}

fn shader_source(name: &str) -> Result<&'static str, SceneError> {
    SHADERS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| SceneError::MissingShader(name.to_string()))
}

/// Compiled programs, keyed by [`ProgramKind`].
pub struct Programs {
    metal: Rc<ShaderProgram>,
    water: Rc<ShaderProgram>,
    opaque: Rc<ShaderProgram>,
}

impl Programs {
    /// Builds every program. Any compile or link error aborts startup.
    pub fn build(gl: &Arc<glow::Context>) -> Result<Self, SceneError> {
        let vertex = shader_source("vertex.glsl")?;
        let build = |kind: ProgramKind| -> Result<Rc<ShaderProgram>, SceneError> {
            let program = ShaderProgramBuilder::new(gl)
                .label(kind.label())
                .vertex(vertex)
                .fragment(shader_source(kind.fragment_file())?)
                .build()?;
            Ok(Rc::new(program))
        };

        Ok(Self {
            metal: build(ProgramKind::Metal)?,
            water: build(ProgramKind::Water)?,
            opaque: build(ProgramKind::Opaque)?,
        })
    }

    pub fn get(&self, kind: ProgramKind) -> &Rc<ShaderProgram> {
        match kind {
            ProgramKind::Metal => &self.metal,
            ProgramKind::Water => &self.water,
            ProgramKind::Opaque => &self.opaque,
        }
    }
}

fn water_texture(gl: &Arc<glow::Context>, config: &DemoConfig) -> Result<Texture, SceneError> {
    let texture = match config.variant {
        Variant::Textured => Texture::load(
            gl,
            config.assets_dir.join("textures").join("water_normal.png"),
            Sampling::default(),
        )?,
        Variant::Procedural => {
            let image = procedural::water_normal_map(PROCEDURAL_MAP_SIZE, config.noise_seed);
            Texture::from_image(gl, &image, Sampling::default())?
        }
    };
    Ok(texture)
}

pub struct Scene {
    pub items: Vec<RenderItem>,
    pub camera: Camera,
    pub light_position: Vec3,
}

impl Scene {
    pub fn build(gl: &Arc<glow::Context>, config: &DemoConfig) -> Result<Self, SceneError> {
        let programs = Programs::build(gl)?;
        let water_map = Rc::new(water_texture(gl, config)?);
        let sphere = MeshData::load_obj(config.assets_dir.join("models").join("sphere.obj"))?;
        log::info!(
            "Loaded sphere mesh with {} triangles",
            sphere.triangle_count()
        );

        let mut items = Vec::with_capacity(3);
        for (slot, (kind, material)) in wiring(config.variant)
            .into_iter()
            .zip(materials())
            .enumerate()
        {
            let transform = Transform {
                location: Vec3::new((slot as f32 - 1.0) * SPHERE_SPACING, 0.0, 0.0),
                scale: Vec3::splat(SPHERE_SCALE),
                spin: Spin::new(SPIN_DEGREES_PER_SECOND, Vec3::Z),
            };
            let mut drawable =
                Drawable::new(Mesh::new(gl, &sphere)?, Rc::clone(programs.get(kind)), transform);
            if kind == ProgramKind::Water {
                drawable = drawable.with_texture(Rc::clone(&water_map), WATER_SAMPLER);
            }
            items.push(RenderItem { drawable, material });
        }

        // aspect is set from the window's drawable size once the scene is built
        let camera = Camera::new(Projection {
            fov_degrees: config.fov,
            ..Default::default()
        });

        log::info!("Built {:?} scene with {} drawables", config.variant, items.len());

        Ok(Self {
            items,
            camera,
            light_position: config.light_position(),
        })
    }
}
