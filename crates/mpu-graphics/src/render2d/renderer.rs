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

use mpu_core::math::{LinearRgba, Mat4, Vec2, Vec3};

use super::backend::{RenderError, SpriteBackend, SpriteFrame};
use super::sprite::{Sprite2D, SpriteInstance};
use super::texture::{Sampling, Texture};

/// Collects rectangles and sprites for a frame and hands them to a
/// [`SpriteBackend`] in one batch.
///
/// Layers are encoded as depth: a sprite on layer `n` sits at `z = -n`. With
/// [`Renderer2D::set_projection_ortho`] `min_layer` maps to the near plane,
/// so under a less-than depth test lower layers cover higher ones.
#[derive(Debug)]
pub struct Renderer2D {
    projection: Mat4,
    sampling: Sampling,
    rect_texture: Arc<Texture>,
    instances: Vec<SpriteInstance>,
    textures: Vec<Arc<Texture>>,
}

impl Default for Renderer2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer2D {
    /// Creates a renderer with an identity projection and linear sampling.
    pub fn new() -> Self {
        let rect_texture = Arc::new(Texture::solid(LinearRgba::WHITE));
        Self {
            projection: Mat4::IDENTITY,
            sampling: Sampling::new(true, true),
            textures: vec![rect_texture.clone()],
            rect_texture,
            instances: Vec::new(),
        }
    }

    /// Sets the projection used for the next frames. Layers outside its
    /// depth range are clipped.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Sets an orthographic projection showing the given world rectangle and
    /// the layers `min_layer..=max_layer`.
    pub fn set_projection_ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        min_layer: i32,
        max_layer: i32,
    ) {
        self.projection = Mat4::orthographic_rh_gl(
            left,
            right,
            bottom,
            top,
            min_layer as f32,
            max_layer as f32,
        );
    }

    /// The current projection.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Chooses linear or nearest filtering for minification and magnification.
    pub fn set_sampling_linear(&mut self, min: bool, mag: bool) {
        self.sampling = Sampling::new(min, mag);
    }

    /// The current sampler state.
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Queues a filled rectangle of `size` world units, centred on the origin
    /// of `transform`.
    pub fn add_rect(&mut self, color: LinearRgba, size: Vec2, transform: Mat4, layer: i32) {
        let half = size * 0.5;
        let mut model = transform * Mat4::from_scale(Vec3::new(half.x, half.y, 1.0));
        model[3].z = -(layer as f32);
        self.instances
            .push(SpriteInstance::new(model, color, self.rect_texture.id(), 1.0));
    }

    /// Queues a sprite.
    /// ## Arguments
    /// * `sprite` - The sprite; its texture is kept alive until the next render.
    /// * `transform` - Placement of the sprite in world space. Its z translation is replaced.
    /// * `layer` - Draw layer, stored as `z = -layer`.
    /// * `color` - Multiplied with the texture color.
    pub fn add_sprite(&mut self, sprite: &Sprite2D, transform: Mat4, layer: i32, color: LinearRgba) {
        let mut model = transform * sprite.base_transform();
        model[3].z = -(layer as f32);
        let texture = sprite.texture();
        if !self.textures.iter().any(|t| t.id() == texture.id()) {
            self.textures.push(texture.clone());
        }
        self.instances.push(SpriteInstance::new(
            model,
            color,
            texture.id(),
            sprite.tile_factor(),
        ));
    }

    /// Sprites queued since the last render.
    pub fn queued(&self) -> &[SpriteInstance] {
        &self.instances
    }

    /// Draws everything queued, then clears the queue even if the backend
    /// failed.
    pub fn render(&mut self, backend: &mut dyn SpriteBackend) -> Result<(), RenderError> {
        let result = if self.instances.is_empty() {
            Ok(())
        } else {
            let frame = SpriteFrame {
                projection: self.projection,
                sampling: self.sampling,
                textures: &self.textures,
                instances: &self.instances,
            };
            backend.draw_sprites(&frame)
        };
        if let Err(e) = &result {
            log::error!("Sprite rendering failed: {e}");
        }
        self.instances.clear();
        self.textures.truncate(1);
        result
    }
}
