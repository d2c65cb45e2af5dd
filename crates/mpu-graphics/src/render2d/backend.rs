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

//! The seam between the sprite batcher and a graphics API.

use std::sync::Arc;

use mpu_core::math::Mat4;
use thiserror::Error;

use super::sprite::SpriteInstance;
use super::texture::{Sampling, Texture, TextureId};

/// Vertices drawn per sprite: two triangles, expanded in the vertex stage.
pub const VERTICES_PER_SPRITE: u32 = 6;

/// Errors reported by a [`SpriteBackend`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// An instance references a texture that was not part of the frame.
    #[error("texture {0:?} is not available to the backend")]
    MissingTexture(TextureId),
    /// Any other backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Everything needed to draw one batch of sprites.
#[derive(Debug, Clone, Copy)]
pub struct SpriteFrame<'a> {
    /// Projection applied after each instance's model matrix.
    pub projection: Mat4,
    /// Sampler state for all textures.
    pub sampling: Sampling,
    /// Every texture referenced by `instances`, without duplicates.
    pub textures: &'a [Arc<Texture>],
    /// The queued sprites in submission order.
    pub instances: &'a [SpriteInstance],
}

impl SpriteFrame<'_> {
    /// Number of vertices for a non-indexed triangle-list draw.
    pub fn vertex_count(&self) -> u32 {
        self.instances.len() as u32 * VERTICES_PER_SPRITE
    }

    /// The instance data as bytes, ready for a storage buffer upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.instances)
    }

    /// Looks up a texture of this frame by id.
    pub fn texture(&self, id: TextureId) -> Option<&Arc<Texture>> {
        self.textures.iter().find(|t| t.id() == id)
    }
}

/// A graphics API able to draw sprite batches.
pub trait SpriteBackend {
    /// Draws one frame's sprites.
    fn draw_sprites(&mut self, frame: &SpriteFrame<'_>) -> Result<(), RenderError>;
}

/// A frame recorded by [`FrameCapture`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    /// The projection in use.
    pub projection: Mat4,
    /// The sampler state in use.
    pub sampling: Sampling,
    /// Ids of the textures referenced.
    pub textures: Vec<TextureId>,
    /// The instances in submission order.
    pub instances: Vec<SpriteInstance>,
    /// What a GPU backend would draw.
    pub vertex_count: u32,
}

/// A backend that records frames instead of drawing them.
#[derive(Debug, Default, Clone)]
pub struct FrameCapture {
    frames: Vec<CapturedFrame>,
}

impl FrameCapture {
    /// Creates an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded frames, oldest first.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<&CapturedFrame> {
        self.frames.last()
    }

    /// Forgets all recorded frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl SpriteBackend for FrameCapture {
    fn draw_sprites(&mut self, frame: &SpriteFrame<'_>) -> Result<(), RenderError> {
        if let Some(missing) = frame
            .instances
            .iter()
            .find(|i| frame.texture(i.texture).is_none())
        {
            return Err(RenderError::MissingTexture(missing.texture));
        }
        self.frames.push(CapturedFrame {
            projection: frame.projection,
            sampling: frame.sampling,
            textures: frame.textures.iter().map(|t| t.id()).collect(),
            instances: frame.instances.to_vec(),
            vertex_count: frame.vertex_count(),
        });
        Ok(())
    }
}
