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

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use mpu_core::math::{LinearRgba, Mat4, Vec2, Vec3};

use super::texture::{Texture, TextureId};

/// A textured quad with a fixed size in world units.
#[derive(Debug, Clone)]
pub struct Sprite2D {
    texture: Arc<Texture>,
    world_size: Vec2,
    forward: f32,
    tile_factor: f32,
    base_transform: Mat4,
}

impl Sprite2D {
    /// Creates a sprite.
    ///
    /// If one component of `world_size` is zero it is derived from the other
    /// and the texture's aspect ratio; if both are zero the texture size in
    /// pixels is used. `forward` is the angle (radians) at which the image's
    /// "front" points and is undone so the sprite faces `+X` at rotation
    /// zero. `tile_factor` repeats the texture across the quad.
    pub fn new(texture: Arc<Texture>, world_size: Vec2, forward: f32, tile_factor: f32) -> Self {
        let world_size = resolve_world_size(&texture, world_size);
        Self {
            texture,
            world_size,
            forward,
            tile_factor,
            base_transform: base_transform(world_size, forward),
        }
    }

    /// The texture.
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Size in world units.
    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Changes the size, deriving a zero component as in [`Sprite2D::new`].
    pub fn set_world_size(&mut self, world_size: Vec2) {
        self.world_size = resolve_world_size(&self.texture, world_size);
        self.base_transform = base_transform(self.world_size, self.forward);
    }

    /// The forward angle in radians.
    pub fn forward(&self) -> f32 {
        self.forward
    }

    /// Changes the forward angle.
    pub fn set_forward(&mut self, forward: f32) {
        self.forward = forward;
        self.base_transform = base_transform(self.world_size, self.forward);
    }

    /// Texture repetitions across the quad.
    pub fn tile_factor(&self) -> f32 {
        self.tile_factor
    }

    /// Changes the tile factor.
    pub fn set_tile_factor(&mut self, tile_factor: f32) {
        self.tile_factor = tile_factor;
    }

    /// Maps the unit quad `[-1, 1]²` to the sprite's size and orientation:
    /// `rotation_z(-forward) * scale(world_size / 2)`.
    pub fn base_transform(&self) -> Mat4 {
        self.base_transform
    }
}

fn resolve_world_size(texture: &Texture, size: Vec2) -> Vec2 {
    let aspect = texture.aspect_ratio();
    match (size.x == 0.0, size.y == 0.0) {
        (true, true) => Vec2::new(texture.width() as f32, texture.height() as f32),
        (true, false) => Vec2::new(size.y * aspect, size.y),
        (false, true) => Vec2::new(size.x, size.x / aspect),
        (false, false) => size,
    }
}

fn base_transform(world_size: Vec2, forward: f32) -> Mat4 {
    let half = world_size * 0.5;
    Mat4::from_rotation_z(-forward) * Mat4::from_scale(Vec3::new(half.x, half.y, 1.0))
}

/// One queued quad, laid out for direct upload to a GPU storage buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Maps the unit quad to world space. `model[3][2]` holds `-layer`.
    pub model: Mat4,
    /// Tint multiplied with the texture.
    pub color: LinearRgba,
    /// Texture to sample.
    pub texture: TextureId,
    /// Texture repetitions across the quad.
    pub tile_factor: f32,
    /// Keeps the record 16-byte aligned for std430 layouts.
    pub _padding: [u32; 2],
}

impl SpriteInstance {
    /// Creates an instance record.
    pub fn new(model: Mat4, color: LinearRgba, texture: TextureId, tile_factor: f32) -> Self {
        Self {
            model,
            color,
            texture,
            tile_factor,
            _padding: [0; 2],
        }
    }

    /// The layer encoded in the model matrix.
    pub fn layer(&self) -> i32 {
        (-self.model[3].z).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mpu_core::math::FRAC_PI_2;

    fn texture(width: u32, height: u32) -> Arc<Texture> {
        let pixels = vec![255; (width * height * 4) as usize];
        Arc::new(Texture::from_rgba(width, height, pixels).unwrap())
    }

    #[test]
    fn test_zero_component_derived_from_aspect_ratio() {
        let tex = texture(4, 2);
        assert_eq!(Sprite2D::new(tex.clone(), Vec2::new(0.0, 3.0), 0.0, 1.0).world_size(), Vec2::new(6.0, 3.0));
        assert_eq!(Sprite2D::new(tex.clone(), Vec2::new(3.0, 0.0), 0.0, 1.0).world_size(), Vec2::new(3.0, 1.5));
        assert_eq!(Sprite2D::new(tex.clone(), Vec2::ZERO, 0.0, 1.0).world_size(), Vec2::new(4.0, 2.0));
        assert_eq!(Sprite2D::new(tex, Vec2::new(1.0, 1.0), 0.0, 1.0).world_size(), Vec2::ONE);
    }

    #[test]
    fn test_base_transform_scales_then_rotates() {
        let sprite = Sprite2D::new(texture(1, 1), Vec2::new(4.0, 2.0), FRAC_PI_2, 1.0);
        // Unit quad corner (1, 0) -> scaled to (2, 0) -> rotated by -90 degrees.
        let p = sprite.base_transform().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_setters_refresh_base_transform() {
        let mut sprite = Sprite2D::new(texture(2, 1), Vec2::new(2.0, 0.0), 0.0, 1.0);
        sprite.set_world_size(Vec2::new(0.0, 4.0));
        assert_eq!(sprite.world_size(), Vec2::new(8.0, 4.0));
        let corner = sprite.base_transform().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(corner.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 96);
        let instance = SpriteInstance::new(Mat4::IDENTITY, LinearRgba::RED, TextureId(7), 2.0);
        let bytes: &[u8] = bytemuck::bytes_of(&instance);
        assert_eq!(bytes.len(), 96);
        assert_eq!(&bytes[80..84], &7u32.to_ne_bytes());
    }
}
