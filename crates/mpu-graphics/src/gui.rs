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

//! egui debug windows: performance, camera and input overview.

use egui::{Color32, Context, Rect, Sense, Ui};
use mpu_core::math::Vec3;

use crate::camera::{Camera, CameraMode};
use crate::input::{InputKind, InputManager};

/// Number of samples shown in the frame time plot.
pub const PLOT_SIZE: usize = 100;
/// Frames averaged into one plot sample.
pub const AVERAGE_SIZE: usize = 5;

/// Frame time history for [`show_performance_window`].
#[derive(Debug, Clone)]
pub struct FrameStats {
    samples: [f32; PLOT_SIZE],
    insert_index: usize,
    pending: [f32; AVERAGE_SIZE],
    pending_len: usize,
    last_average: f32,
    last_delta: f32,
    /// While set, new frame times are not added to the plot.
    pub hold: bool,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    /// An empty history.
    pub fn new() -> Self {
        Self {
            samples: [0.0; PLOT_SIZE],
            insert_index: 0,
            pending: [0.0; AVERAGE_SIZE],
            pending_len: 0,
            last_average: 0.0,
            last_delta: 0.0,
            hold: false,
        }
    }

    /// Records the duration of a frame in seconds. Every
    /// [`AVERAGE_SIZE`] frames one averaged sample enters the plot.
    pub fn push(&mut self, delta: f32) {
        self.last_delta = delta;
        if self.hold {
            return;
        }
        self.pending[self.pending_len] = delta;
        self.pending_len += 1;
        if self.pending_len == AVERAGE_SIZE {
            self.pending_len = 0;
            self.last_average = self.pending.iter().sum::<f32>() / AVERAGE_SIZE as f32;
            self.samples[self.insert_index] = self.last_average;
            self.insert_index = (self.insert_index + 1) % PLOT_SIZE;
        }
    }

    /// The most recently pushed frame time.
    pub fn frame_time(&self) -> f32 {
        self.last_delta
    }

    /// Frames per second of the most recent frame.
    pub fn fps(&self) -> f32 {
        if self.last_delta > 0.0 {
            1.0 / self.last_delta
        } else {
            0.0
        }
    }

    /// Frames per second over the last completed averaging window.
    pub fn average_fps(&self) -> f32 {
        if self.last_average > 0.0 {
            1.0 / self.last_average
        } else {
            0.0
        }
    }

    /// The plot samples, oldest first.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples[self.insert_index..]
            .iter()
            .chain(&self.samples[..self.insert_index])
            .copied()
    }
}

/// Shows frame time, FPS and a frame time histogram.
///
/// Returns `true` when the "Enable V-Sync (override)" checkbox was toggled;
/// the new state is in `vsync` and applying it is up to the caller.
pub fn show_performance_window(
    ctx: &Context,
    open: &mut bool,
    stats: &mut FrameStats,
    vsync: &mut bool,
) -> bool {
    let mut toggled = false;
    egui::Window::new("Performance")
        .open(open)
        .default_size([180.0, 130.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Frametime: {:.6}", stats.frame_time()));
                ui.label(format!("FPS: {:.1}", stats.fps()));
            });
            draw_histogram(ui, stats);
            ui.horizontal(|ui| {
                ui.checkbox(&mut stats.hold, "hold plot");
                toggled = ui.checkbox(vsync, "Enable V-Sync (override)").changed();
            });
        });
    toggled
}

fn draw_histogram(ui: &mut Ui, stats: &FrameStats) {
    let size = egui::vec2(ui.available_width(), 60.0_f32.max(ui.available_height() - 24.0));
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

    let max = stats.values().fold(0.0_f32, f32::max);
    if max <= 0.0 {
        return;
    }
    let bar_width = rect.width() / PLOT_SIZE as f32;
    let fill = ui.visuals().selection.bg_fill;
    for (i, value) in stats.values().enumerate() {
        let height = rect.height() * value / max;
        let left = rect.left() + i as f32 * bar_width;
        let bar = Rect::from_min_max(
            egui::pos2(left, rect.bottom() - height),
            egui::pos2(left + bar_width.max(1.0) - 1.0, rect.bottom()),
        );
        painter.rect_filled(bar, 0.0, fill);
    }
}

fn vec3_row(ui: &mut Ui, label: &str, v: &mut Vec3) -> bool {
    ui.horizontal(|ui| {
        let mut changed = false;
        for c in [&mut v.x, &mut v.y, &mut v.z] {
            changed |= ui.add(egui::DragValue::new(c).speed(0.05)).changed();
        }
        ui.label(label);
        changed
    })
    .inner
}

/// Shows and edits a camera's state.
pub fn show_camera_debug_window(ctx: &Context, open: &mut bool, camera: &mut Camera) {
    let title = format!("{}Debug Information", camera.ui_name());
    egui::Window::new(title.as_str()).open(open).show(ctx, |ui| {
        let mut position = camera.position();
        if vec3_row(ui, "Position", &mut position) {
            camera.set_position(position);
        }
        let mut target = camera.target();
        if vec3_row(ui, "Target", &mut target) {
            camera.set_target(target);
        }
        let mut distance = camera.target_distance();
        ui.horizontal(|ui| {
            if ui.add(egui::DragValue::new(&mut distance).speed(0.05)).changed() {
                camera.set_target_distance(distance);
            }
            ui.label("Distance to Target");
        });
        let mut world_up = camera.world_up();
        if vec3_row(ui, "World Up", &mut world_up) {
            camera.set_world_up(world_up);
        }
        ui.label(format!("Orientation: {}", camera.orientation()));

        let mut mode = camera.mode();
        ui.horizontal(|ui| {
            ui.label("Mode: ");
            ui.radio_value(&mut mode, CameraMode::Trackball, "trackball");
            ui.radio_value(&mut mode, CameraMode::Fps, "fps");
        });
        camera.set_mode(mode);

        // The toggles persist across frames while the modifier itself resets
        // on every camera update.
        let fast_id = ui.id().with("fast_mode");
        let slow_id = ui.id().with("slow_mode");
        let mut fast = ctx.data_mut(|d| *d.get_temp_mut_or_default::<bool>(fast_id));
        let mut slow = ctx.data_mut(|d| *d.get_temp_mut_or_default::<bool>(slow_id));
        ui.horizontal(|ui| {
            ui.checkbox(&mut fast, "FastMode");
            ui.checkbox(&mut slow, "SlowMode");
        });
        ctx.data_mut(|d| {
            d.insert_temp(fast_id, fast);
            d.insert_temp(slow_id, slow);
        });
        if fast && camera.movement_speed_modifier() <= 1.0 {
            camera.fast_mode();
        }
        if slow && camera.movement_speed_modifier() >= 1.0 {
            camera.slow_mode();
        }

        let mut all_controls = camera.all_controls_enabled();
        if ui.checkbox(&mut all_controls, "Enable all controls").changed() {
            camera.set_enable_all_controls(all_controls);
        }

        ui.separator();
        ui.label("Sensitivity");
        let mut settings = camera.settings();
        let sliders = [
            ("RotateFPS", &mut settings.fps_rotation_speed, 0.0005..=0.1),
            ("Move", &mut settings.move_speed, 0.005..=1.0),
            ("RotateTB", &mut settings.tb_rotation_speed, 0.0005..=0.1),
            ("Pan", &mut settings.pan_speed, 0.001..=0.1),
            ("Zoom", &mut settings.zoom_speed, 0.01..=2.0),
        ];
        let mut changed = false;
        for (label, value, range) in sliders {
            changed |= ui
                .add(egui::Slider::new(value, range).logarithmic(true).text(label))
                .changed();
        }
        if changed {
            camera.apply_settings(settings);
        }

        ui.separator();
        ui.label("Camera coordinate System:");
        for (name, dir) in [
            ("Front", camera.front()),
            ("Back", camera.back()),
            ("Right", camera.right()),
            ("Left", camera.left()),
            ("Up", camera.up()),
            ("Down", camera.down()),
        ] {
            ui.monospace(format!("{name:<6}{:>8.3} {:>8.3} {:>8.3}", dir.x, dir.y, dir.z));
        }
    });
}

/// Lists the registered inputs and what is bound to them.
pub fn show_input_window(ctx: &Context, open: &mut bool, input: &InputManager) {
    egui::Window::new("Inputs").open(open).show(ctx, |ui| {
        ui.label(format!("Frame time: {:.4} s", input.delta_time()));
        ui.separator();
        egui::Grid::new("input_grid").striped(true).show(ui, |ui| {
            ui.strong("Name");
            ui.strong("Kind");
            ui.strong("Bindings");
            ui.strong("Description");
            ui.end_row();
            for info in input.inputs() {
                ui.label(info.name);
                ui.label(match info.kind {
                    InputKind::Button => "button",
                    InputKind::Axis => "axis",
                });
                let bindings = input.bindings_for(info.name);
                if bindings.is_empty() {
                    ui.colored_label(Color32::GRAY, "unbound");
                } else {
                    ui.label(bindings.join(", "));
                }
                ui.label(info.description);
                ui.end_row();
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonBehavior;

    fn run_frame(ctx: &Context, mut f: impl FnMut(&Context)) {
        let _ = ctx.run(egui::RawInput::default(), |ctx| f(ctx));
    }

    #[test]
    fn test_frame_stats_averages_every_five_frames() {
        let mut stats = FrameStats::new();
        for _ in 0..4 {
            stats.push(0.01);
        }
        assert_eq!(stats.values().filter(|v| *v > 0.0).count(), 0);
        stats.push(0.03);

        let values: Vec<f32> = stats.values().collect();
        assert_eq!(values.len(), PLOT_SIZE);
        assert!((values[PLOT_SIZE - 1] - 0.014).abs() < 1e-6);
        assert!((stats.average_fps() - 1.0 / 0.014).abs() < 1e-2);
        assert!((stats.fps() - 1.0 / 0.03).abs() < 1e-3);
    }

    #[test]
    fn test_frame_stats_ring_is_chronological() {
        let mut stats = FrameStats::new();
        for sample in 0..(PLOT_SIZE + 3) {
            for _ in 0..AVERAGE_SIZE {
                stats.push(sample as f32);
            }
        }
        let values: Vec<f32> = stats.values().collect();
        assert_eq!(values[0], 3.0);
        assert_eq!(values[PLOT_SIZE - 1], (PLOT_SIZE + 2) as f32);
    }

    #[test]
    fn test_frame_stats_hold() {
        let mut stats = FrameStats::new();
        stats.hold = true;
        for _ in 0..10 {
            stats.push(0.02);
        }
        assert!(stats.values().all(|v| v == 0.0));
        assert_eq!(stats.frame_time(), 0.02);
    }

    #[test]
    fn test_windows_render_headless() {
        let ctx = Context::default();
        let mut stats = FrameStats::new();
        stats.push(0.016);
        let mut vsync = false;
        let mut camera = Camera::new(CameraMode::Trackball, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, "");
        let mut input = InputManager::new();
        input.add_button("Jump", "Jump around.", || {});
        input.map_key_to_button("Jump", "Space", ButtonBehavior::OnPress);

        let mut open = [true, true, true];
        for _ in 0..2 {
            run_frame(&ctx, |ctx| {
                let toggled = show_performance_window(ctx, &mut open[0], &mut stats, &mut vsync);
                assert!(!toggled);
                show_camera_debug_window(ctx, &mut open[1], &mut camera);
                show_input_window(ctx, &mut open[2], &input);
            });
        }
        assert!(open.iter().all(|o| *o));
        assert!(!vsync);
        assert_eq!(camera.mode(), CameraMode::Trackball);
        assert!((camera.target_distance() - 5.0).abs() < 1e-5);
    }
}
