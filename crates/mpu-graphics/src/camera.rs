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

//! A camera controller with trackball and first-person modes.
//!
//! Inputs (`rotate_h`, `move_z`, `zoom`, ...) are accumulated during a frame
//! and applied by [`Camera::update`], after which they are cleared.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mpu_core::math::{Mat4, Quaternion, Vec2, Vec3};
use mpu_core::{CfgError, CfgFile, Transform};

use crate::input::{ButtonBehavior, InputManager, MouseButton};

/// How the camera reacts to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// Orbit around a target point. Supports pan and zoom.
    #[default]
    Trackball,
    /// Free flight. Supports moving along the camera axes.
    Fps,
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CameraMode::Trackball => "trackball",
            CameraMode::Fps => "fps",
        })
    }
}

impl FromStr for CameraMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trackball" => Ok(CameraMode::Trackball),
            "fps" => Ok(CameraMode::Fps),
            other => Err(format!("unknown camera mode '{other}'")),
        }
    }
}

/// Sensitivities and starting mode of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Mode the camera starts in.
    pub mode: CameraMode,
    /// Radians per input unit in FPS mode.
    pub fps_rotation_speed: f32,
    /// World units per input unit when moving.
    pub move_speed: f32,
    /// Radians per input unit in trackball mode.
    pub tb_rotation_speed: f32,
    /// World units per input unit when panning.
    pub pan_speed: f32,
    /// World units per input unit when zooming.
    pub zoom_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            mode: CameraMode::Trackball,
            fps_rotation_speed: 0.005,
            move_speed: 0.1,
            tb_rotation_speed: 0.015,
            pan_speed: 0.008,
            zoom_speed: 0.5,
        }
    }
}

impl CameraSettings {
    /// Reads `mode`, `fps_rotation_speed`, `move_speed`, `tb_rotation_speed`,
    /// `pan_speed` and `zoom_speed` from `block`. Missing keys keep their
    /// defaults.
    pub fn from_cfg(cfg: &CfgFile, block: &str) -> Result<Self, CfgError> {
        let d = Self::default();
        Ok(Self {
            mode: cfg.get_or(block, "mode", d.mode)?,
            fps_rotation_speed: cfg.get_or(block, "fps_rotation_speed", d.fps_rotation_speed)?,
            move_speed: cfg.get_or(block, "move_speed", d.move_speed)?,
            tb_rotation_speed: cfg.get_or(block, "tb_rotation_speed", d.tb_rotation_speed)?,
            pan_speed: cfg.get_or(block, "pan_speed", d.pan_speed)?,
            zoom_speed: cfg.get_or(block, "zoom_speed", d.zoom_speed)?,
        })
    }

    /// Writes the settings into `block`.
    ///
    /// ## Errors
    ///
    /// Fails with [`CfgError::InvalidName`] when `block` cannot be written
    /// as a block header.
    pub fn write_to(&self, cfg: &mut CfgFile, block: &str) -> Result<(), CfgError> {
        cfg.set(block, "mode", self.mode)?;
        cfg.set(block, "fps_rotation_speed", self.fps_rotation_speed)?;
        cfg.set(block, "move_speed", self.move_speed)?;
        cfg.set(block, "tb_rotation_speed", self.tb_rotation_speed)?;
        cfg.set(block, "pan_speed", self.pan_speed)?;
        cfg.set(block, "zoom_speed", self.zoom_speed)
    }
}

/// A trackball / first-person camera.
///
/// The camera looks down its local `-Z` axis.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    world_up: Vec3,
    mode: CameraMode,
    ui_prefix: String,
    target_distance: f32,
    view: Mat4,

    rotation_input: Vec2,
    movement_input: Vec3,
    movement_speed_mod: f32,
    enable_all_controls: bool,

    settings: CameraSettings,
}

impl Camera {
    /// Creates a camera at `position` looking at `target`.
    ///
    /// `ui_name` prefixes the names of the inputs registered by
    /// [`Camera::add_inputs`] and the debug window title.
    pub fn new(mode: CameraMode, position: Vec3, target: Vec3, world_up: Vec3, ui_name: &str) -> Self {
        let mut camera = Self {
            transform: Transform::new(position),
            world_up,
            mode,
            ui_prefix: ui_name.to_string(),
            target_distance: 0.0,
            view: Mat4::IDENTITY,
            rotation_input: Vec2::ZERO,
            movement_input: Vec3::ZERO,
            movement_speed_mod: 1.0,
            enable_all_controls: false,
            settings: CameraSettings {
                mode,
                ..CameraSettings::default()
            },
        };
        camera.set_target(target);
        camera.refresh_view();
        camera
    }

    /// Registers the camera's axes and buttons with `input`.
    ///
    /// The callbacks hold weak references, so they silently do nothing once
    /// the camera is dropped. They are skipped while the camera is borrowed.
    pub fn add_inputs(camera: &Rc<RefCell<Camera>>, input: &mut InputManager) {
        let prefix = camera.borrow().ui_prefix.clone();
        let weak = Rc::downgrade(camera);
        let axes: [(&str, &str, fn(&mut Camera, f32)); 8] = [
            ("RotateHorizontal", "Rotate camera horizontally.", Camera::rotate_h),
            ("RotateVertical", "Rotate camera vertically.", Camera::rotate_v),
            ("MoveSideways", "Move the camera sideways in FPS mode.", Camera::move_x),
            (
                "MoveForwardBackward",
                "Move the camera forwards and backwards in FPS mode.",
                Camera::move_z,
            ),
            ("MoveUpDown", "Move the camera up and down in FPS mode.", Camera::move_y),
            ("Zoom", "Zoom camera in and out in trackball mode.", Camera::zoom),
            ("PanHorizontal", "Pan camera horizontally in trackball mode.", Camera::pan_h),
            ("PanVertical", "Pan camera vertically in trackball mode.", Camera::pan_v),
        ];
        for (name, description, apply) in axes {
            input.add_axis(&format!("{prefix}{name}"), description, axis_callback(&weak, apply));
        }

        input.add_axis(
            &format!("{prefix}MovementSpeed"),
            "Change cameras movement and pan/zoom speed.",
            axis_callback(&weak, Camera::scale_speeds),
        );

        let buttons: [(&str, &str, fn(&mut Camera)); 3] = [
            ("ToggleMode", "Toggles between fps and trackball mode.", Camera::toggle_mode),
            ("FastMode", "While triggered movement speed is doubled.", Camera::fast_mode),
            ("SlowMode", "While triggered movement speed is halved.", Camera::slow_mode),
        ];
        for (name, description, apply) in buttons {
            input.add_button(&format!("{prefix}{name}"), description, button_callback(&weak, apply));
        }
    }

    /// Binds a common keyboard and mouse layout to the inputs registered by
    /// [`Camera::add_inputs`].
    ///
    /// WASD/QE move, right mouse drag rotates, middle mouse drag pans, the
    /// wheel zooms, `X` toggles the mode, shift and control change speed.
    pub fn add_default_bindings(&self, input: &mut InputManager) {
        let p = &self.ui_prefix;
        let rotate_drag = format!("{p}RotateDrag");
        let pan_drag = format!("{p}PanDrag");
        input.add_button(&rotate_drag, "Hold to rotate the camera with the mouse.", || {});
        input.add_button(&pan_drag, "Hold to pan the camera with the mouse.", || {});
        input.map_mouse_button_to_button(&rotate_drag, MouseButton::Right, ButtonBehavior::WhileDown);
        input.map_mouse_button_to_button(&pan_drag, MouseButton::Middle, ButtonBehavior::WhileDown);

        input.map_cursor_x_to_axis(&format!("{p}RotateHorizontal"), -1.0, Some(rotate_drag.as_str()));
        input.map_cursor_y_to_axis(&format!("{p}RotateVertical"), -1.0, Some(rotate_drag.as_str()));
        input.map_cursor_x_to_axis(&format!("{p}PanHorizontal"), -1.0, Some(pan_drag.as_str()));
        input.map_cursor_y_to_axis(&format!("{p}PanVertical"), 1.0, Some(pan_drag.as_str()));
        input.map_scroll_to_axis(&format!("{p}Zoom"), 1.0);

        input.map_key_to_axis(&format!("{p}MoveForwardBackward"), "KeyW", 60.0);
        input.map_key_to_axis(&format!("{p}MoveForwardBackward"), "KeyS", -60.0);
        input.map_key_to_axis(&format!("{p}MoveSideways"), "KeyD", 60.0);
        input.map_key_to_axis(&format!("{p}MoveSideways"), "KeyA", -60.0);
        input.map_key_to_axis(&format!("{p}MoveUpDown"), "KeyE", 60.0);
        input.map_key_to_axis(&format!("{p}MoveUpDown"), "KeyQ", -60.0);

        input.map_key_to_button(&format!("{p}ToggleMode"), "KeyX", ButtonBehavior::OnPress);
        input.map_key_to_button(&format!("{p}FastMode"), "ShiftLeft", ButtonBehavior::WhileDown);
        input.map_key_to_button(&format!("{p}SlowMode"), "ControlLeft", ButtonBehavior::WhileDown);
    }

    /// Points the camera at `target` and remembers the distance to it.
    pub fn set_target(&mut self, target: Vec3) {
        self.transform.look_at(target, self.world_up);
        self.target_distance = (target - self.transform.position).length();
    }

    /// The point the camera orbits around in trackball mode.
    pub fn target(&self) -> Vec3 {
        self.transform.position + self.front() * self.target_distance
    }

    /// Switches the mode.
    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    /// The current mode.
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switches between trackball and FPS mode.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Trackball => CameraMode::Fps,
            CameraMode::Fps => CameraMode::Trackball,
        };
    }

    /// Applies the accumulated input and recomputes the view matrix.
    ///
    /// In trackball mode the camera first orbits the target, then pans and
    /// zooms. In FPS mode it moves along its old axes, then rotates. Inputs
    /// and the speed modifier are reset afterwards.
    pub fn update(&mut self) {
        let mut local_movement = self.movement_input * self.movement_speed_mod;
        let old_orientation = self.transform.orientation;

        match self.mode {
            CameraMode::Trackball => {
                let old_target = self.target();
                self.apply_rotation();
                // Orbit: keep the old target in front of the camera.
                let new_target = self.target();
                self.transform.position += old_target - new_target;

                if self.target_distance + local_movement.z > 0.01 * self.settings.zoom_speed {
                    self.target_distance += local_movement.z;
                } else {
                    local_movement.z = 0.0;
                }
                self.transform.position += old_orientation * local_movement;
            }
            CameraMode::Fps => {
                self.transform.position += old_orientation * local_movement;
                self.apply_rotation();
            }
        }

        self.refresh_view();
        self.rotation_input = Vec2::ZERO;
        self.movement_input = Vec3::ZERO;
        self.movement_speed_mod = 1.0;
    }

    fn apply_rotation(&mut self) {
        let yaw = Quaternion::from_axis_angle(self.world_up, self.rotation_input.x);
        let pitch = Quaternion::from_axis_angle(Vec3::X, self.rotation_input.y);
        self.transform.orientation = (yaw * self.transform.orientation * pitch).normalize();
    }

    fn refresh_view(&mut self) {
        if let Some(view) = self.transform.to_matrix().affine_inverse() {
            self.view = view;
        }
    }

    /// Rotates around the world up axis.
    /// ## Arguments
    /// * `d_phi` - Input units, scaled by the rotation speed of the current mode.
    pub fn rotate_h(&mut self, d_phi: f32) {
        self.rotation_input.x += d_phi * self.rotation_speed();
    }

    /// Rotates around the camera's right axis.
    pub fn rotate_v(&mut self, d_theta: f32) {
        self.rotation_input.y += d_theta * self.rotation_speed();
    }

    fn rotation_speed(&self) -> f32 {
        match self.mode {
            CameraMode::Fps => self.settings.fps_rotation_speed,
            CameraMode::Trackball => self.settings.tb_rotation_speed,
        }
    }

    fn movement_enabled(&self) -> bool {
        self.mode == CameraMode::Fps || self.enable_all_controls
    }

    fn trackball_enabled(&self) -> bool {
        self.mode == CameraMode::Trackball || self.enable_all_controls
    }

    /// Moves right (positive) or left.
    pub fn move_x(&mut self, dx: f32) {
        if self.movement_enabled() {
            self.movement_input.x += dx * self.settings.move_speed;
        }
    }

    /// Moves up (positive) or down.
    pub fn move_y(&mut self, dy: f32) {
        if self.movement_enabled() {
            self.movement_input.y += dy * self.settings.move_speed;
        }
    }

    /// Moves forward (positive) or backward.
    pub fn move_z(&mut self, dz: f32) {
        if self.movement_enabled() {
            self.movement_input.z -= dz * self.settings.move_speed;
        }
    }

    /// Pans right (positive) or left.
    pub fn pan_h(&mut self, dx: f32) {
        if self.trackball_enabled() {
            self.movement_input.x += dx * self.settings.pan_speed;
        }
    }

    /// Pans up (positive) or down.
    pub fn pan_v(&mut self, dy: f32) {
        if self.trackball_enabled() {
            self.movement_input.y += dy * self.settings.pan_speed;
        }
    }

    /// Zooms towards the target (positive) or away from it.
    pub fn zoom(&mut self, dz: f32) {
        if self.trackball_enabled() {
            self.movement_input.z -= dz * self.settings.zoom_speed;
        }
    }

    /// Doubles movement speed until the next update.
    pub fn fast_mode(&mut self) {
        self.movement_speed_mod *= 2.0;
    }

    /// Halves movement speed until the next update.
    pub fn slow_mode(&mut self) {
        self.movement_speed_mod *= 0.5;
    }

    /// Speed multiplier applied in the next update.
    pub fn movement_speed_modifier(&self) -> f32 {
        self.movement_speed_mod
    }

    fn scale_speeds(&mut self, v: f32) {
        let factor = 1.0 + v * 0.025;
        self.settings.move_speed *= factor;
        self.settings.pan_speed *= factor;
        self.settings.zoom_speed *= factor;
    }

    /// Allow FPS movement in trackball mode and pan/zoom in FPS mode.
    pub fn set_enable_all_controls(&mut self, enable: bool) {
        self.enable_all_controls = enable;
    }

    /// See [`Camera::set_enable_all_controls`].
    pub fn all_controls_enabled(&self) -> bool {
        self.enable_all_controls
    }

    /// Sensitivities.
    pub fn settings(&self) -> CameraSettings {
        CameraSettings {
            mode: self.mode,
            ..self.settings
        }
    }

    /// Replaces the sensitivities and the mode.
    pub fn apply_settings(&mut self, settings: CameraSettings) {
        self.mode = settings.mode;
        self.settings = settings;
    }

    /// Rotation speed in FPS mode.
    pub fn fps_rotation_speed(&self) -> f32 {
        self.settings.fps_rotation_speed
    }

    /// Sets the rotation speed in FPS mode.
    pub fn set_fps_rotation_speed(&mut self, speed: f32) {
        self.settings.fps_rotation_speed = speed;
    }

    /// Rotation speed in trackball mode.
    pub fn tb_rotation_speed(&self) -> f32 {
        self.settings.tb_rotation_speed
    }

    /// Sets the rotation speed in trackball mode.
    pub fn set_tb_rotation_speed(&mut self, speed: f32) {
        self.settings.tb_rotation_speed = speed;
    }

    /// Movement speed.
    pub fn movement_speed(&self) -> f32 {
        self.settings.move_speed
    }

    /// Sets the movement speed.
    pub fn set_movement_speed(&mut self, speed: f32) {
        self.settings.move_speed = speed;
    }

    /// Pan speed.
    pub fn pan_speed(&self) -> f32 {
        self.settings.pan_speed
    }

    /// Sets the pan speed.
    pub fn set_pan_speed(&mut self, speed: f32) {
        self.settings.pan_speed = speed;
    }

    /// Zoom speed.
    pub fn zoom_speed(&self) -> f32 {
        self.settings.zoom_speed
    }

    /// Sets the zoom speed.
    pub fn set_zoom_speed(&mut self, speed: f32) {
        self.settings.zoom_speed = speed;
    }

    /// World-to-camera matrix, as of the last update.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Camera-to-world matrix.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Camera position.
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Moves the camera without changing its orientation.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.refresh_view();
    }

    /// Camera orientation.
    pub fn orientation(&self) -> Quaternion {
        self.transform.orientation
    }

    /// World up direction used for yaw and `look_at`.
    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    /// Changes the world up direction.
    pub fn set_world_up(&mut self, world_up: Vec3) {
        self.world_up = world_up;
    }

    /// Distance to the trackball target.
    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    /// Sets the distance to the trackball target, keeping the position.
    pub fn set_target_distance(&mut self, distance: f32) {
        self.target_distance = distance.max(0.0);
    }

    /// Prefix used for input names and window titles.
    pub fn ui_name(&self) -> &str {
        &self.ui_prefix
    }

    /// Direction the camera looks in (local `-Z`).
    /// ## Returns
    /// A unit vector in world space.
    pub fn front(&self) -> Vec3 {
        self.transform.front()
    }

    /// Opposite of [`Camera::front`].
    pub fn back(&self) -> Vec3 {
        self.transform.back()
    }

    /// Local `+X` in world space.
    pub fn right(&self) -> Vec3 {
        self.transform.right()
    }

    /// Opposite of [`Camera::right`].
    pub fn left(&self) -> Vec3 {
        self.transform.left()
    }

    /// Local `+Y` in world space. Differs from [`Camera::world_up`] once the
    /// camera pitches.
    pub fn up(&self) -> Vec3 {
        self.transform.up()
    }

    /// Opposite of [`Camera::up`].
    pub fn down(&self) -> Vec3 {
        self.transform.down()
    }
}

fn axis_callback(camera: &Weak<RefCell<Camera>>, apply: fn(&mut Camera, f32)) -> impl FnMut(f64) {
    let camera = camera.clone();
    move |v| {
        if let Some(camera) = camera.upgrade() {
            if let Ok(mut camera) = camera.try_borrow_mut() {
                apply(&mut camera, v as f32);
            }
        }
    }
}

fn button_callback(camera: &Weak<RefCell<Camera>>, apply: fn(&mut Camera)) -> impl FnMut() {
    let camera = camera.clone();
    move || {
        if let Some(camera) = camera.upgrade() {
            if let Ok(mut camera) = camera.try_borrow_mut() {
                apply(&mut camera);
            }
        }
    }
}
