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

// mpu sandbox
// Drives the library headlessly: usage `sandbox [config.cfg]`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use mpu_core::math::{LinearRgba, Mat4, Vec2, Vec3};
use mpu_core::{CfgFile, Stopwatch};
use mpu_graphics::{
    Camera, CameraSettings, FrameCapture, FrameStats, InputEvent, InputManager, MouseButton,
    Renderer2D, Sprite2D, Texture,
};
use mpu_log::LogConfig;

const FRAMES: usize = 30;
const FRAME_TIME: f64 = 1.0 / 60.0;

/// Scripted input for a frame: hold W for a while, then drag with the right
/// mouse button and finally scroll.
fn scripted_events(frame: usize) -> Vec<InputEvent> {
    let key = |code: &str, pressed: bool| {
        let key_code = code.to_string();
        if pressed {
            InputEvent::KeyPressed { key_code }
        } else {
            InputEvent::KeyReleased { key_code }
        }
    };
    match frame {
        0 => vec![key("KeyX", true)],
        1 => vec![key("KeyX", false), key("KeyW", true)],
        10 => vec![
            key("KeyW", false),
            key("KeyX", true),
            InputEvent::MouseMoved { x: 400.0, y: 300.0 },
            InputEvent::MouseButtonPressed {
                button: MouseButton::Right,
            },
        ],
        11..=19 => vec![InputEvent::MouseMoved {
            x: 400.0 + (frame - 10) as f32 * 8.0,
            y: 300.0,
        }],
        20 => vec![
            key("KeyX", false),
            InputEvent::MouseButtonReleased {
                button: MouseButton::Right,
            },
            InputEvent::MouseWheelScrolled {
                delta_x: 0.0,
                delta_y: 3.0,
            },
        ],
        _ => Vec::new(),
    }
}

fn main() -> Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => CfgFile::open(&path).with_context(|| format!("reading config {path}"))?,
        None => CfgFile::new(),
    };

    let log = LogConfig::from_cfg(&cfg, "logging")?
        .build()
        .context("setting up logging")?;
    log.clone().install()?;
    log::info!("sandbox starting");

    let settings = CameraSettings::from_cfg(&cfg, "camera")?;
    let camera = Rc::new(RefCell::new(Camera::new(
        settings.mode,
        Vec3::new(0.0, 2.0, 10.0),
        Vec3::ZERO,
        Vec3::Y,
        "Main",
    )));
    camera.borrow_mut().apply_settings(settings);

    let mut input = InputManager::new();
    Camera::add_inputs(&camera, &mut input);
    camera.borrow().add_default_bindings(&mut input);
    log::debug!("{} inputs registered", input.inputs().count());

    let checker = Arc::new(Texture::from_rgba(
        2,
        2,
        vec![
            255, 255, 255, 255, 40, 40, 40, 255, //
            40, 40, 40, 255, 255, 255, 255, 255,
        ],
    )?);
    let ground = Sprite2D::new(checker, Vec2::new(16.0, 0.0), 0.0, 8.0);
    let marker = Sprite2D::new(Arc::new(Texture::solid(LinearRgba::RED)), Vec2::splat(0.5), 0.0, 1.0);

    let mut renderer = Renderer2D::new();
    renderer.set_projection_ortho(-8.0, 8.0, -8.0, 8.0, -10, 10);
    let mut backend = FrameCapture::new();
    let mut stats = FrameStats::new();
    let stopwatch = Stopwatch::new();

    for frame in 0..FRAMES {
        for event in scripted_events(frame) {
            input.handle_event(&event);
        }
        input.update_with_delta(FRAME_TIME);
        camera.borrow_mut().update();
        stats.push(FRAME_TIME as f32);

        let position = camera.borrow().position();
        renderer.add_sprite(&ground, Mat4::IDENTITY, 5, LinearRgba::WHITE);
        renderer.add_sprite(
            &marker,
            Mat4::from_translation(Vec3::new(position.x, position.z, 0.0)),
            0,
            LinearRgba::WHITE,
        );
        renderer.add_rect(
            LinearRgba::new(0.1, 0.1, 0.3, 1.0),
            Vec2::new(16.0, 16.0),
            Mat4::IDENTITY,
            9,
        );
        renderer.render(&mut backend)?;
    }

    let camera = camera.borrow();
    log::info!(
        "rendered {} frames ({} sprites in the last) in {} us, {:.0} fps average",
        backend.frames().len(),
        backend.last().map_or(0, |f| f.instances.len()),
        stopwatch.elapsed_us(),
        stats.average_fps(),
    );
    log::info!(
        "camera ended in {} mode at {:?}, {:.2} from its target",
        camera.mode(),
        camera.position(),
        camera.target_distance(),
    );

    log.flush();
    Ok(())
}
