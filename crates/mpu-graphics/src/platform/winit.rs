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

//! `winit` window events to [`InputEvent`]s.

use ::winit::event::{
    ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use ::winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{InputEvent, MouseButton};

/// Pixels of touchpad scrolling that count as one wheel line.
const PIXELS_PER_LINE: f32 = 20.0;

/// Converts a window event into an input event.
///
/// Returns `None` for events that are not user input (resize, focus, ...),
/// for key repeats and for unidentified keys.
pub fn translate_winit_input(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => {
            let PhysicalKey::Code(keycode) = key_event.physical_key else {
                return None;
            };
            let key_code = key_name(keycode);
            match key_event.state {
                ElementState::Pressed if !key_event.repeat => {
                    Some(InputEvent::KeyPressed { key_code })
                }
                ElementState::Released => Some(InputEvent::KeyReleased { key_code }),
                _ => None,
            }
        }
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            Some(match state {
                ElementState::Pressed => InputEvent::MouseButtonPressed { button },
                ElementState::Released => InputEvent::MouseButtonReleased { button },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (delta_x, delta_y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (
                    pos.x as f32 / PIXELS_PER_LINE,
                    pos.y as f32 / PIXELS_PER_LINE,
                ),
            };
            (delta_x != 0.0 || delta_y != 0.0)
                .then_some(InputEvent::MouseWheelScrolled { delta_x, delta_y })
        }
        _ => None,
    }
}

/// Name used for key bindings, e.g. `"KeyW"`, `"ShiftLeft"`, `"F1"`.
pub fn key_name(keycode: KeyCode) -> String {
    format!("{keycode:?}")
}

fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::winit::dpi::PhysicalPosition;
    use ::winit::event::{DeviceId, TouchPhase};

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(KeyCode::KeyW), "KeyW");
        assert_eq!(key_name(KeyCode::ShiftLeft), "ShiftLeft");
        assert_eq!(key_name(KeyCode::Space), "Space");
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(map_mouse_button(WinitMouseButton::Right), MouseButton::Right);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), MouseButton::Other(9));
    }

    #[test]
    fn test_cursor_moved() {
        let event = WindowEvent::CursorMoved {
            device_id: DeviceId::dummy(),
            position: PhysicalPosition::new(12.5, 40.0),
        };
        assert_eq!(
            translate_winit_input(&event),
            Some(InputEvent::MouseMoved { x: 12.5, y: 40.0 })
        );
    }

    #[test]
    fn test_mouse_input() {
        let event = WindowEvent::MouseInput {
            device_id: DeviceId::dummy(),
            state: ElementState::Released,
            button: WinitMouseButton::Middle,
        };
        assert_eq!(
            translate_winit_input(&event),
            Some(InputEvent::MouseButtonReleased {
                button: MouseButton::Middle
            })
        );
    }

    #[test]
    fn test_wheel_pixel_delta_is_scaled_and_zero_is_dropped() {
        let event = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)),
            phase: TouchPhase::Moved,
        };
        assert_eq!(
            translate_winit_input(&event),
            Some(InputEvent::MouseWheelScrolled {
                delta_x: 0.0,
                delta_y: 2.0
            })
        );

        let still = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 0.0),
            phase: TouchPhase::Moved,
        };
        assert_eq!(translate_winit_input(&still), None);
    }

    #[test]
    fn test_non_input_events_are_ignored() {
        assert_eq!(translate_winit_input(&WindowEvent::Focused(true)), None);
    }
}
