// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CPU-side textures and sampler state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::{Pod, Zeroable};
use mpu_core::math::LinearRgba;
use thiserror::Error;

static NEXT_TEXTURE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique handle of a [`Texture`]. Backends key their GPU copies on it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct TextureId(pub u32);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Errors raised while creating textures.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The file could not be read or decoded.
    #[error("failed to load texture '{path}': {source}")]
    Load {
        /// The file.
        path: PathBuf,
        /// The decoder error.
        #[source]
        source: image::ImageError,
    },
    /// In-memory image data could not be decoded.
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
    /// The pixel buffer does not match the dimensions.
    #[error("texture of {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// `width * height * 4`.
        expected: usize,
        /// Length of the given buffer.
        actual: usize,
    },
    /// Width or height is zero.
    #[error("texture dimensions must be non-zero")]
    Empty,
}

/// An RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Wraps tightly packed RGBA8 pixels, row by row starting at the top.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            id: TextureId::next(),
            width,
            height,
            pixels,
        })
    }

    /// A 1x1 texture of a single colour.
    pub fn solid(color: LinearRgba) -> Self {
        Self {
            id: TextureId::next(),
            width: 1,
            height: 1,
            pixels: color.to_rgba8().to_vec(),
        }
    }

    /// Decodes an image file (PNG or JPEG).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_dynamic_image(img)
    }

    /// Decodes an encoded image held in memory.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_dynamic_image(img)
    }

    fn from_dynamic_image(img: image::DynamicImage) -> Result<Self, TextureError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// The unique id.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width / height`.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Raw RGBA8 data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The pixel at `(x, y)`, with `(0, 0)` at the top left.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[start..start + 4]);
        Some(out)
    }
}

/// Texel filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Bilinear interpolation.
    Linear,
}

/// Filtering between mipmap levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipmapFilterMode {
    /// Nearest level.
    Nearest,
    /// Interpolate between the two nearest levels.
    Linear,
}

/// Behaviour outside the `[0, 1]` texture coordinate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Wrap around.
    Repeat,
    /// Clamp to the edge texel.
    ClampToEdge,
    /// Wrap around, mirroring every repetition.
    MirrorRepeat,
}

/// Sampler state used for every sprite of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sampling {
    /// Wrapping along U.
    pub address_mode_u: AddressMode,
    /// Wrapping along V.
    pub address_mode_v: AddressMode,
    /// Wrapping along W.
    pub address_mode_w: AddressMode,
    /// Filter when the texture is magnified.
    pub mag_filter: FilterMode,
    /// Filter when the texture is minified.
    pub min_filter: FilterMode,
    /// Filter between mipmap levels.
    pub mipmap_filter: MipmapFilterMode,
}

impl Sampling {
    /// Sprite sampling: tiled in U and V, clamped in W.
    ///
    /// Linear minification is trilinear; nearest minification also picks
    /// the nearest mipmap level.
    pub fn new(linear_min: bool, linear_mag: bool) -> Self {
        let (min_filter, mipmap_filter) = if linear_min {
            (FilterMode::Linear, MipmapFilterMode::Linear)
        } else {
            (FilterMode::Nearest, MipmapFilterMode::Nearest)
        };
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: if linear_mag {
                FilterMode::Linear
            } else {
                FilterMode::Nearest
            },
            min_filter,
            mipmap_filter,
        }
    }
}

impl Default for Sampling {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Texture::solid(LinearRgba::WHITE);
        let b = Texture::solid(LinearRgba::WHITE);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.pixels(), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_from_rgba_validates_size() {
        assert!(matches!(
            Texture::from_rgba(2, 2, vec![0; 15]),
            Err(TextureError::SizeMismatch { expected: 16, actual: 15, .. })
        ));
        assert!(matches!(Texture::from_rgba(0, 2, vec![]), Err(TextureError::Empty)));
    }

    #[test]
    fn test_pixel_access() {
        let pixels = (0..2 * 3 * 4).map(|v| v as u8).collect();
        let tex = Texture::from_rgba(2, 3, pixels).unwrap();
        assert_eq!(tex.pixel(1, 2), Some([20, 21, 22, 23]));
        assert_eq!(tex.pixel(2, 0), None);
        assert!((tex.aspect_ratio() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_png_from_memory() {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let tex = Texture::from_image_bytes(bytes.get_ref()).unwrap();
        assert_eq!((tex.width(), tex.height()), (4, 2));
        assert_eq!(tex.pixel(3, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Texture::load("/definitely/not/here.png"),
            Err(TextureError::Load { .. })
        ));
    }

    #[test]
    fn test_sampling_modes() {
        let linear = Sampling::new(true, true);
        assert_eq!(linear.min_filter, FilterMode::Linear);
        assert_eq!(linear.mipmap_filter, MipmapFilterMode::Linear);
        assert_eq!(linear.address_mode_w, AddressMode::ClampToEdge);

        let nearest = Sampling::new(false, true);
        assert_eq!(nearest.min_filter, FilterMode::Nearest);
        assert_eq!(nearest.mipmap_filter, MipmapFilterMode::Nearest);
        assert_eq!(nearest.mag_filter, FilterMode::Linear);
        assert_eq!(nearest.address_mode_u, AddressMode::Repeat);
    }
}
