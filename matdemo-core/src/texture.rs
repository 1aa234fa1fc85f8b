//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture.
//! Loading from disk never fails because of a bad image: undecodable files are replaced with a
//! 1×1 placeholder so the rest of the scene still renders.

use std::{path::Path, sync::Arc};

use image::RgbImage;

use crate::gpu::{Gpu, Sampling};

/// Colour of the placeholder used in place of textures that failed to decode.
pub const PLACEHOLDER_PIXEL: [u8; 3] = [255, 255, 255];

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Expected {expected} bytes of RGB data, got {actual}")]
    DataSize { expected: usize, actual: usize },

    #[error("Failed to create texture: {0}")]
    Create(String),
}

/// Byte length of tightly packed RGB8 data of the given size.
pub fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Decodes an image file into RGB8 rows ordered bottom-up, matching OpenGL's texture origin.
pub fn decode_rgb(path: impl AsRef<Path>) -> Result<RgbImage, TextureError> {
    let image = image::open(path)?;
    Ok(image.flipv().to_rgb8())
}

/// Represents a texture stored on the GPU side.
pub struct Texture<G: Gpu = glow::Context> {
    gpu: Arc<G>,
    id: G::Texture,
    width: u32,
    height: u32,
}

impl<G: Gpu> Texture<G> {
    /// Uploads an RGB image as-is. Its first row ends up at texture coordinate `v = 0`.
    pub fn from_image(
        gpu: &Arc<G>,
        image: &RgbImage,
        sampling: Sampling,
    ) -> Result<Self, TextureError> {
        let (width, height) = image.dimensions();
        Self::from_data(gpu, width, height, image.as_raw(), sampling)
    }

    /// Uploads raw tightly packed RGB8 data.
    pub fn from_data(
        gpu: &Arc<G>,
        width: u32,
        height: u32,
        data: &[u8],
        sampling: Sampling,
    ) -> Result<Self, TextureError> {
        let expected = rgb_len(width, height);
        if data.len() != expected {
            return Err(TextureError::DataSize {
                expected,
                actual: data.len(),
            });
        }

        let id = gpu
            .create_texture_rgb(width, height, data, sampling)
            .map_err(TextureError::Create)?;

        Ok(Self {
            gpu: Arc::clone(gpu),
            id,
            width,
            height,
        })
    }

    /// Creates the 1×1 opaque placeholder texture.
    pub fn placeholder(gpu: &Arc<G>, sampling: Sampling) -> Result<Self, TextureError> {
        Self::from_data(gpu, 1, 1, &PLACEHOLDER_PIXEL, sampling)
    }

    /// Loads a texture from an image file, substituting the placeholder when decoding fails.
    ///
    /// Only a failure to create the GPU object is reported as an error.
    pub fn load(
        gpu: &Arc<G>,
        path: impl AsRef<Path>,
        sampling: Sampling,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        match decode_rgb(path) {
            Ok(image) => {
                log::debug!(
                    "Loaded texture {} ({}x{})",
                    path.display(),
                    image.width(),
                    image.height()
                );
                Self::from_image(gpu, &image, sampling)
            }
            Err(err) => {
                log::warn!(
                    "Could not load texture {}: {}. Using a placeholder.",
                    path.display(),
                    err
                );
                Self::placeholder(gpu, sampling)
            }
        }
    }

    /// Returns the raw texture handle.
    pub fn id(&self) -> G::Texture {
        self.id
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        self.gpu.bind_texture(unit, Some(self.id));
    }
}

impl<G: Gpu> Drop for Texture<G> {
    fn drop(&mut self) {
        self.gpu.delete_texture(self.id);
    }
}
