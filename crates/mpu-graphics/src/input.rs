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

//! Named input actions.
//!
//! Code that reacts to input registers *buttons* (fired as `FnMut()`) and
//! *axes* (fired as `FnMut(f64)`) by name. Separately, keys, mouse buttons,
//! the wheel and the cursor are bound to those names. Raw events are fed in
//! with [`InputManager::handle_event`] and the callbacks run once per frame
//! in [`InputManager::update`].

use std::collections::HashSet;
use std::fmt;

use mpu_core::DeltaTimer;

/// A backend-agnostic user input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A keyboard key was pressed.
    KeyPressed {
        /// Physical key code, e.g. `"KeyW"` or `"Space"`.
        key_code: String,
    },
    /// A keyboard key was released.
    KeyReleased {
        /// Physical key code.
        key_code: String,
    },
    /// A mouse button was pressed.
    MouseButtonPressed {
        /// The button.
        button: MouseButton,
    },
    /// A mouse button was released.
    MouseButtonReleased {
        /// The button.
        button: MouseButton,
    },
    /// The cursor moved.
    MouseMoved {
        /// New x position in window pixels.
        x: f32,
        /// New y position in window pixels.
        y: f32,
    },
    /// The mouse wheel was scrolled.
    MouseWheelScrolled {
        /// Horizontal scroll.
        delta_x: f32,
        /// Vertical scroll.
        delta_y: f32,
    },
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// The back side button.
    Back,
    /// The forward side button.
    Forward,
    /// Any other button, by numeric code.
    Other(u16),
}

/// When a button binding fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonBehavior {
    /// Once, in the frame the key or button goes down.
    OnPress,
    /// Once, in the frame the key or button goes up.
    OnRelease,
    /// Every frame while held.
    WhileDown,
}

/// Whether a registered input is a button or an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Fired without a value.
    Button,
    /// Fired with a value.
    Axis,
}

/// A registered input, as listed by [`InputManager::inputs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputInfo<'a> {
    /// Unique name.
    pub name: &'a str,
    /// Human readable description.
    pub description: &'a str,
    /// Button or axis.
    pub kind: InputKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Trigger {
    Key(String),
    Mouse(MouseButton),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Key(key) => f.write_str(key),
            Trigger::Mouse(button) => write!(f, "Mouse{button:?}"),
        }
    }
}

#[derive(Debug, Clone)]
enum AxisSource {
    Key { key: String, scale: f64 },
    Scroll { scale: f64 },
    CursorX { scale: f64, modifier: Option<String> },
    CursorY { scale: f64, modifier: Option<String> },
}

struct ButtonBinding {
    button: String,
    trigger: Trigger,
    behavior: ButtonBehavior,
}

struct AxisBinding {
    axis: String,
    source: AxisSource,
}

enum Callback {
    Button(Box<dyn FnMut()>),
    Axis(Box<dyn FnMut(f64)>),
}

struct Action {
    name: String,
    description: String,
    callback: Callback,
}

impl Action {
    fn kind(&self) -> InputKind {
        match self.callback {
            Callback::Button(_) => InputKind::Button,
            Callback::Axis(_) => InputKind::Axis,
        }
    }
}

/// Maps raw input to named, callback-driven actions.
pub struct InputManager {
    actions: Vec<Action>,
    button_bindings: Vec<ButtonBinding>,
    axis_bindings: Vec<AxisBinding>,

    down: HashSet<Trigger>,
    pressed: HashSet<Trigger>,
    released: HashSet<Trigger>,
    cursor: Option<(f64, f64)>,
    cursor_delta: (f64, f64),
    scroll: (f64, f64),

    timer: DeltaTimer,
    delta_time: f64,
    warned: HashSet<String>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InputManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputManager")
            .field("inputs", &self.actions.len())
            .field("button_bindings", &self.button_bindings.len())
            .field("axis_bindings", &self.axis_bindings.len())
            .field("delta_time", &self.delta_time)
            .finish()
    }
}

impl InputManager {
    /// Creates a manager with no inputs or bindings.
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            button_bindings: Vec::new(),
            axis_bindings: Vec::new(),
            down: HashSet::new(),
            pressed: HashSet::new(),
            released: HashSet::new(),
            cursor: None,
            cursor_delta: (0.0, 0.0),
            scroll: (0.0, 0.0),
            timer: DeltaTimer::new(),
            delta_time: 0.0,
            warned: HashSet::new(),
        }
    }

    /// Registers a button. Re-registering a name replaces the previous one.
    pub fn add_button(&mut self, name: &str, description: &str, callback: impl FnMut() + 'static) {
        self.insert_action(name, description, Callback::Button(Box::new(callback)));
    }

    /// Registers an axis. Re-registering a name replaces the previous one.
    pub fn add_axis(&mut self, name: &str, description: &str, callback: impl FnMut(f64) + 'static) {
        self.insert_action(name, description, Callback::Axis(Box::new(callback)));
    }

    /// Removes a registered input. Its bindings stay in place.
    pub fn remove_input(&mut self, name: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| a.name != name);
        before != self.actions.len()
    }

    fn insert_action(&mut self, name: &str, description: &str, callback: Callback) {
        let action = Action {
            name: name.to_string(),
            description: description.to_string(),
            callback,
        };
        match self.actions.iter_mut().find(|a| a.name == name) {
            Some(existing) => {
                log::debug!("Replacing input '{name}'");
                *existing = action;
            }
            None => self.actions.push(action),
        }
        self.warned.remove(name);
    }

    /// Binds a keyboard key to a button.
    pub fn map_key_to_button(&mut self, button: &str, key: &str, behavior: ButtonBehavior) {
        self.button_bindings.push(ButtonBinding {
            button: button.to_string(),
            trigger: Trigger::Key(key.to_string()),
            behavior,
        });
    }

    /// Binds a mouse button to a button.
    pub fn map_mouse_button_to_button(
        &mut self,
        button: &str,
        mouse_button: MouseButton,
        behavior: ButtonBehavior,
    ) {
        self.button_bindings.push(ButtonBinding {
            button: button.to_string(),
            trigger: Trigger::Mouse(mouse_button),
            behavior,
        });
    }

    /// While `key` is held the axis receives `scale * delta_time` every frame.
    pub fn map_key_to_axis(&mut self, axis: &str, key: &str, scale: f64) {
        self.push_axis(axis, AxisSource::Key {
            key: key.to_string(),
            scale,
        });
    }

    /// The axis receives the vertical wheel movement of the frame times `scale`.
    pub fn map_scroll_to_axis(&mut self, axis: &str, scale: f64) {
        self.push_axis(axis, AxisSource::Scroll { scale });
    }

    /// The axis receives the horizontal cursor movement of the frame times
    /// `scale`, but only while the `modifier` button is down (if given).
    pub fn map_cursor_x_to_axis(&mut self, axis: &str, scale: f64, modifier: Option<&str>) {
        self.push_axis(axis, AxisSource::CursorX {
            scale,
            modifier: modifier.map(str::to_string),
        });
    }

    /// Vertical counterpart of [`InputManager::map_cursor_x_to_axis`].
    pub fn map_cursor_y_to_axis(&mut self, axis: &str, scale: f64, modifier: Option<&str>) {
        self.push_axis(axis, AxisSource::CursorY {
            scale,
            modifier: modifier.map(str::to_string),
        });
    }

    fn push_axis(&mut self, axis: &str, source: AxisSource) {
        self.axis_bindings.push(AxisBinding {
            axis: axis.to_string(),
            source,
        });
    }

    /// Removes every binding, keeping the registered inputs.
    pub fn clear_bindings(&mut self) {
        self.button_bindings.clear();
        self.axis_bindings.clear();
    }

    /// Records a raw event. Nothing fires until [`InputManager::update`].
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPressed { key_code } => self.press(Trigger::Key(key_code.clone())),
            InputEvent::KeyReleased { key_code } => self.release(Trigger::Key(key_code.clone())),
            InputEvent::MouseButtonPressed { button } => self.press(Trigger::Mouse(*button)),
            InputEvent::MouseButtonReleased { button } => self.release(Trigger::Mouse(*button)),
            InputEvent::MouseMoved { x, y } => {
                let (x, y) = (*x as f64, *y as f64);
                if let Some((last_x, last_y)) = self.cursor {
                    self.cursor_delta.0 += x - last_x;
                    self.cursor_delta.1 += y - last_y;
                }
                self.cursor = Some((x, y));
            }
            InputEvent::MouseWheelScrolled { delta_x, delta_y } => {
                self.scroll.0 += *delta_x as f64;
                self.scroll.1 += *delta_y as f64;
            }
        }
    }

    fn press(&mut self, trigger: Trigger) {
        if self.down.insert(trigger.clone()) {
            self.pressed.insert(trigger);
        }
    }

    fn release(&mut self, trigger: Trigger) {
        if self.down.remove(&trigger) {
            self.released.insert(trigger);
        }
    }

    /// Measures the frame time and fires the callbacks for this frame.
    pub fn update(&mut self) {
        let delta = self.timer.tick().as_secs_f64();
        self.update_with_delta(delta);
    }

    /// Like [`InputManager::update`] with an explicit frame time in seconds.
    pub fn update_with_delta(&mut self, delta_time: f64) {
        self.delta_time = delta_time;

        let mut buttons: Vec<String> = Vec::new();
        for binding in &self.button_bindings {
            let fire = match binding.behavior {
                ButtonBehavior::OnPress => self.pressed.contains(&binding.trigger),
                ButtonBehavior::OnRelease => self.released.contains(&binding.trigger),
                ButtonBehavior::WhileDown => {
                    self.down.contains(&binding.trigger) || self.pressed.contains(&binding.trigger)
                }
            };
            if fire {
                buttons.push(binding.button.clone());
            }
        }

        let mut axes: Vec<(String, f64)> = Vec::new();
        for binding in &self.axis_bindings {
            let value = match &binding.source {
                AxisSource::Key { key, scale } => {
                    let trigger = Trigger::Key(key.clone());
                    if self.down.contains(&trigger) || self.pressed.contains(&trigger) {
                        scale * delta_time
                    } else {
                        0.0
                    }
                }
                AxisSource::Scroll { scale } => self.scroll.1 * scale,
                AxisSource::CursorX { scale, modifier } => {
                    if self.modifier_active(modifier.as_deref()) {
                        self.cursor_delta.0 * scale
                    } else {
                        0.0
                    }
                }
                AxisSource::CursorY { scale, modifier } => {
                    if self.modifier_active(modifier.as_deref()) {
                        self.cursor_delta.1 * scale
                    } else {
                        0.0
                    }
                }
            };
            if value != 0.0 {
                axes.push((binding.axis.clone(), value));
            }
        }

        for name in buttons {
            self.fire_button(&name);
        }
        for (name, value) in axes {
            self.fire_axis(&name, value);
        }

        self.pressed.clear();
        self.released.clear();
        self.cursor_delta = (0.0, 0.0);
        self.scroll = (0.0, 0.0);
    }

    /// A modifier is a *button name*; it is active if any trigger bound to
    /// that button is held.
    fn modifier_active(&self, modifier: Option<&str>) -> bool {
        let Some(modifier) = modifier else {
            return true;
        };
        self.button_bindings
            .iter()
            .filter(|b| b.button == modifier)
            .any(|b| self.down.contains(&b.trigger) || self.pressed.contains(&b.trigger))
    }

    fn fire_button(&mut self, name: &str) {
        let warned = &mut self.warned;
        match self.actions.iter_mut().find(|a| a.name == name) {
            Some(Action {
                callback: Callback::Button(callback),
                ..
            }) => callback(),
            Some(_) => warn_once(warned, name, "is an axis but is bound like a button"),
            None => warn_once(warned, name, "is bound but was never registered"),
        }
    }

    fn fire_axis(&mut self, name: &str, value: f64) {
        let warned = &mut self.warned;
        match self.actions.iter_mut().find(|a| a.name == name) {
            Some(Action {
                callback: Callback::Axis(callback),
                ..
            }) => callback(value),
            Some(_) => warn_once(warned, name, "is a button but is bound like an axis"),
            None => warn_once(warned, name, "is bound but was never registered"),
        }
    }

    /// Duration of the last frame in seconds.
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Whether a key is currently held.
    pub fn is_key_down(&self, key: &str) -> bool {
        self.down.contains(&Trigger::Key(key.to_string()))
    }

    /// Whether a mouse button is currently held.
    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.down.contains(&Trigger::Mouse(button))
    }

    /// Last known cursor position.
    pub fn cursor_position(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// All registered inputs in registration order.
    pub fn inputs(&self) -> impl Iterator<Item = InputInfo<'_>> {
        self.actions.iter().map(|a| InputInfo {
            name: &a.name,
            description: &a.description,
            kind: a.kind(),
        })
    }

    /// Human readable descriptions of what is bound to `name`.
    pub fn bindings_for(&self, name: &str) -> Vec<String> {
        let buttons = self
            .button_bindings
            .iter()
            .filter(|b| b.button == name)
            .map(|b| format!("{} ({:?})", b.trigger, b.behavior));
        let axes = self
            .axis_bindings
            .iter()
            .filter(|b| b.axis == name)
            .map(|b| match &b.source {
                AxisSource::Key { key, scale } => format!("{key} x{scale}"),
                AxisSource::Scroll { scale } => format!("Scroll x{scale}"),
                AxisSource::CursorX { scale, modifier } => {
                    describe_cursor("CursorX", *scale, modifier.as_deref())
                }
                AxisSource::CursorY { scale, modifier } => {
                    describe_cursor("CursorY", *scale, modifier.as_deref())
                }
            });
        buttons.chain(axes).collect()
    }
}

fn warn_once(warned: &mut HashSet<String>, name: &str, problem: &str) {
    if warned.insert(name.to_string()) {
        log::warn!("Input '{name}' {problem}");
    }
}

fn describe_cursor(axis: &str, scale: f64, modifier: Option<&str>) -> String {
    match modifier {
        Some(m) => format!("{axis} x{scale} while {m}"),
        None => format!("{axis} x{scale}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn key_down(key: &str) -> InputEvent {
        InputEvent::KeyPressed {
            key_code: key.to_string(),
        }
    }

    fn key_up(key: &str) -> InputEvent {
        InputEvent::KeyReleased {
            key_code: key.to_string(),
        }
    }

    fn counter(input: &mut InputManager, name: &str) -> Rc<RefCell<u32>> {
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        input.add_button(name, "test button", move || *c.borrow_mut() += 1);
        count
    }

    fn accumulator(input: &mut InputManager, name: &str) -> Rc<RefCell<f64>> {
        let total = Rc::new(RefCell::new(0.0));
        let t = total.clone();
        input.add_axis(name, "test axis", move |v| *t.borrow_mut() += v);
        total
    }

    #[test]
    fn test_on_press_fires_once() {
        let mut input = InputManager::new();
        let count = counter(&mut input, "Jump");
        input.map_key_to_button("Jump", "Space", ButtonBehavior::OnPress);

        input.handle_event(&key_down("Space"));
        input.update_with_delta(0.016);
        input.update_with_delta(0.016);
        assert_eq!(*count.borrow(), 1);

        // Key repeat does not re-trigger.
        input.handle_event(&key_down("Space"));
        input.update_with_delta(0.016);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_on_release_and_while_down() {
        let mut input = InputManager::new();
        let released = counter(&mut input, "Released");
        let held = counter(&mut input, "Held");
        input.map_key_to_button("Released", "KeyR", ButtonBehavior::OnRelease);
        input.map_key_to_button("Held", "KeyR", ButtonBehavior::WhileDown);

        input.handle_event(&key_down("KeyR"));
        input.update_with_delta(0.016);
        input.update_with_delta(0.016);
        input.handle_event(&key_up("KeyR"));
        input.update_with_delta(0.016);

        assert_eq!(*held.borrow(), 2);
        assert_eq!(*released.borrow(), 1);
    }

    #[test]
    fn test_tap_within_one_frame_still_fires_press() {
        let mut input = InputManager::new();
        let pressed = counter(&mut input, "Tap");
        let held = counter(&mut input, "Hold");
        input.map_key_to_button("Tap", "KeyT", ButtonBehavior::OnPress);
        input.map_key_to_button("Hold", "KeyT", ButtonBehavior::WhileDown);

        input.handle_event(&key_down("KeyT"));
        input.handle_event(&key_up("KeyT"));
        input.update_with_delta(0.016);

        assert_eq!(*pressed.borrow(), 1);
        assert_eq!(*held.borrow(), 1);
    }

    #[test]
    fn test_mouse_button_binding() {
        let mut input = InputManager::new();
        let count = counter(&mut input, "Select");
        input.map_mouse_button_to_button("Select", MouseButton::Left, ButtonBehavior::OnPress);

        input.handle_event(&InputEvent::MouseButtonPressed {
            button: MouseButton::Left,
        });
        assert!(input.is_mouse_button_down(MouseButton::Left));
        input.update_with_delta(0.016);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_key_axis_scales_with_delta_time() {
        let mut input = InputManager::new();
        let total = accumulator(&mut input, "Forward");
        input.map_key_to_axis("Forward", "KeyW", 2.0);
        input.map_key_to_axis("Forward", "KeyS", -2.0);

        input.handle_event(&key_down("KeyW"));
        input.update_with_delta(0.5);
        input.update_with_delta(0.25);
        assert!((*total.borrow() - 1.5).abs() < 1e-12);

        input.handle_event(&key_up("KeyW"));
        input.handle_event(&key_down("KeyS"));
        input.update_with_delta(0.5);
        assert!((*total.borrow() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_scroll_axis() {
        let mut input = InputManager::new();
        let total = accumulator(&mut input, "Zoom");
        input.map_scroll_to_axis("Zoom", 0.5);

        input.handle_event(&InputEvent::MouseWheelScrolled {
            delta_x: 0.0,
            delta_y: 2.0,
        });
        input.handle_event(&InputEvent::MouseWheelScrolled {
            delta_x: 0.0,
            delta_y: 1.0,
        });
        input.update_with_delta(0.016);
        input.update_with_delta(0.016);
        assert!((*total.borrow() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_cursor_axis_requires_modifier() {
        let mut input = InputManager::new();
        let yaw = accumulator(&mut input, "Yaw");
        input.add_button("Drag", "modifier", || {});
        input.map_mouse_button_to_button("Drag", MouseButton::Right, ButtonBehavior::WhileDown);
        input.map_cursor_x_to_axis("Yaw", 0.1, Some("Drag"));

        input.handle_event(&InputEvent::MouseMoved { x: 10.0, y: 0.0 });
        input.handle_event(&InputEvent::MouseMoved { x: 30.0, y: 0.0 });
        input.update_with_delta(0.016);
        assert_eq!(*yaw.borrow(), 0.0);

        input.handle_event(&InputEvent::MouseButtonPressed {
            button: MouseButton::Right,
        });
        input.handle_event(&InputEvent::MouseMoved { x: 40.0, y: 5.0 });
        input.update_with_delta(0.016);
        assert!((*yaw.borrow() - 1.0).abs() < 1e-9);
        assert_eq!(input.cursor_position(), Some((40.0, 5.0)));
    }

    #[test]
    fn test_cursor_axis_without_modifier() {
        let mut input = InputManager::new();
        let pitch = accumulator(&mut input, "Pitch");
        input.map_cursor_y_to_axis("Pitch", -1.0, None);

        input.handle_event(&InputEvent::MouseMoved { x: 0.0, y: 0.0 });
        input.handle_event(&InputEvent::MouseMoved { x: 0.0, y: 4.0 });
        input.update_with_delta(0.016);
        assert_eq!(*pitch.borrow(), -4.0);
    }

    #[test]
    fn test_unregistered_binding_is_ignored_until_registered() {
        let mut input = InputManager::new();
        input.map_key_to_button("Later", "KeyL", ButtonBehavior::WhileDown);
        input.handle_event(&key_down("KeyL"));
        input.update_with_delta(0.016);
        input.update_with_delta(0.016);
        assert!(input.warned.contains("Later"));

        let count = counter(&mut input, "Later");
        input.update_with_delta(0.016);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_inputs_listing_and_replacement() {
        let mut input = InputManager::new();
        input.add_button("A", "first", || {});
        input.add_axis("B", "second", |_| {});
        input.add_button("A", "replaced", || {});

        let listed: Vec<_> = input.inputs().collect();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "A");
        assert_eq!(listed[0].description, "replaced");
        assert_eq!(listed[1].kind, InputKind::Axis);

        assert!(input.remove_input("B"));
        assert!(!input.remove_input("B"));
    }

    #[test]
    fn test_bindings_description() {
        let mut input = InputManager::new();
        input.map_key_to_button("Fast", "ShiftLeft", ButtonBehavior::WhileDown);
        input.map_cursor_x_to_axis("Yaw", 0.5, Some("Drag"));
        assert_eq!(input.bindings_for("Fast"), vec!["ShiftLeft (WhileDown)"]);
        assert_eq!(input.bindings_for("Yaw"), vec!["CursorX x0.5 while Drag"]);
    }

    #[test]
    fn test_update_measures_delta_time() {
        let mut input = InputManager::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        input.update();
        assert!(input.delta_time() > 0.0);
    }
}
