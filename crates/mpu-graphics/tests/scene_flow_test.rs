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

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use approx::assert_relative_eq;
use mpu_core::math::{LinearRgba, Mat4, Vec2, Vec3};
use mpu_graphics::{
    Camera, CameraMode, FrameCapture, InputEvent, InputManager, Renderer2D, Sprite2D, Texture,
};

fn key(code: &str, pressed: bool) -> InputEvent {
    let key_code = code.to_string();
    if pressed {
        InputEvent::KeyPressed { key_code }
    } else {
        InputEvent::KeyReleased { key_code }
    }
}

fn fps_rig() -> (Rc<RefCell<Camera>>, InputManager) {
    let camera = Rc::new(RefCell::new(Camera::new(
        CameraMode::Fps,
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
        "",
    )));
    let mut input = InputManager::new();
    Camera::add_inputs(&camera, &mut input);
    camera.borrow().add_default_bindings(&mut input);
    (camera, input)
}

#[test]
fn test_held_key_moves_fps_camera_each_frame() {
    let (camera, mut input) = fps_rig();

    input.handle_event(&key("KeyW", true));
    input.update_with_delta(0.1);
    camera.borrow_mut().update();
    assert_relative_eq!(camera.borrow().position().z, 4.4, epsilon = 1e-4);

    // Still held: moves again without a new event.
    input.update_with_delta(0.1);
    camera.borrow_mut().update();
    assert_relative_eq!(camera.borrow().position().z, 3.8, epsilon = 1e-4);

    input.handle_event(&key("KeyW", false));
    input.update_with_delta(0.1);
    camera.borrow_mut().update();
    assert_relative_eq!(camera.borrow().position().z, 3.8, epsilon = 1e-4);
}

#[test]
fn test_shift_doubles_movement_for_one_frame() {
    let (camera, mut input) = fps_rig();

    input.handle_event(&key("ShiftLeft", true));
    input.handle_event(&key("KeyW", true));
    input.update_with_delta(0.1);
    camera.borrow_mut().update();
    assert_relative_eq!(camera.borrow().position().z, 3.8, epsilon = 1e-4);
    assert_relative_eq!(camera.borrow().movement_speed_modifier(), 1.0);
}

#[test]
fn test_toggle_key_switches_to_trackball_and_wheel_zooms() {
    let (camera, mut input) = fps_rig();

    input.handle_event(&key("KeyX", true));
    input.update_with_delta(0.016);
    camera.borrow_mut().update();
    assert_eq!(camera.borrow().mode(), CameraMode::Trackball);

    input.handle_event(&key("KeyX", false));
    input.handle_event(&InputEvent::MouseWheelScrolled {
        delta_x: 0.0,
        delta_y: 2.0,
    });
    input.update_with_delta(0.016);
    camera.borrow_mut().update();

    let camera = camera.borrow();
    assert_relative_eq!(camera.target_distance(), 4.0, epsilon = 1e-4);
    assert_relative_eq!(camera.position().z, 4.0, epsilon = 1e-4);
}

#[test]
fn test_camera_driven_sprite_frame() {
    let (camera, _input) = fps_rig();
    let texture = Arc::new(Texture::solid(LinearRgba::GREEN));
    let sprite = Sprite2D::new(texture.clone(), Vec2::new(2.0, 0.0), 0.0, 1.0);

    let mut renderer = Renderer2D::new();
    renderer.set_projection_ortho(-8.0, 8.0, -4.5, 4.5, -5, 5);
    let position = camera.borrow().position();
    renderer.add_sprite(
        &sprite,
        Mat4::from_translation(Vec3::new(position.x, position.y, 0.0)),
        1,
        LinearRgba::WHITE,
    );
    renderer.add_rect(LinearRgba::BLACK, Vec2::new(16.0, 9.0), Mat4::IDENTITY, 4);

    let mut capture = FrameCapture::new();
    renderer.render(&mut capture).unwrap();

    let frame = capture.last().unwrap();
    assert_eq!(frame.vertex_count, 12);
    assert_eq!(frame.instances[0].layer(), 1);
    assert_eq!(frame.instances[1].layer(), 4);
    assert_eq!(frame.instances[0].texture, texture.id());
    assert_eq!(frame.projection, renderer.projection());
}
