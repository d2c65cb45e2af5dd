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

//! Graphics helpers: named input actions, a trackball/FPS camera, a
//! backend-agnostic 2D sprite batcher and egui debug windows.

#![warn(missing_docs)]

pub mod camera;
pub mod gui;
pub mod input;
pub mod platform;
pub mod render2d;

pub use camera::{Camera, CameraMode, CameraSettings};
pub use gui::FrameStats;
pub use input::{ButtonBehavior, InputEvent, InputManager, MouseButton};
pub use render2d::{FrameCapture, Renderer2D, Sprite2D, SpriteBackend, Texture};
