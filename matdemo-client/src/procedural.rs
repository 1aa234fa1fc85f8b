//! Procedural water normal map for the `procedural` variant.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use glam::Vec3;
use image::{Rgb, RgbImage};

const FREQUENCY: f32 = 0.04;
const BUMP_STRENGTH: f32 = 4.0;

/// Generates a `size`×`size` tangent-space normal map from an OpenSimplex height field.
pub fn water_normal_map(size: u32, seed: i32) -> RgbImage {
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(seed));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(FREQUENCY));

    let height = |x: u32, y: u32| noise.get_noise_2d(x as f32, y as f32);

    RgbImage::from_fn(size, size, |x, y| {
        let dx = height(x + 1, y) - height(x.saturating_sub(1), y);
        let dy = height(x, y + 1) - height(x, y.saturating_sub(1));
        let normal = Vec3::new(-dx * BUMP_STRENGTH, -dy * BUMP_STRENGTH, 1.0).normalize();
        let encoded = (normal * 0.5 + 0.5) * 255.0;
        Rgb([
            encoded.x.round() as u8,
            encoded.y.round() as u8,
            encoded.z.round() as u8,
        ])
    })
}
