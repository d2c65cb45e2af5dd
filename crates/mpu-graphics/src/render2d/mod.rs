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

//! Backend-agnostic 2D sprite batching.
//!
//! [`Renderer2D`] turns rectangles and [`Sprite2D`]s into [`SpriteInstance`]
//! records. A [`SpriteBackend`] uploads them and draws six vertices per
//! instance; [`FrameCapture`] records frames without a GPU.

mod backend;
mod renderer;
mod sprite;
mod texture;

pub use backend::{
    CapturedFrame, FrameCapture, RenderError, SpriteBackend, SpriteFrame, VERTICES_PER_SPRITE,
};
pub use renderer::Renderer2D;
pub use sprite::{Sprite2D, SpriteInstance};
pub use texture::{
    AddressMode, FilterMode, MipmapFilterMode, Sampling, Texture, TextureError, TextureId,
};
