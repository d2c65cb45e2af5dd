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

//! Reading and writing config files on disk.

use mpu_core::cfg::{CfgError, CfgFile};

#[test]
fn save_then_open_preserves_content_and_order() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("settings.cfg");

    let mut cfg = CfgFile::new();
    cfg.set("Window", "width", 1280).unwrap();
    cfg.set("Window", "height", 720).unwrap();
    cfg.set("Window", "title", "mpu # sandbox").unwrap();
    cfg.set("Log", "level", "info").unwrap();
    cfg.save(&path).expect("Failed to save config");

    let loaded = CfgFile::open(&path).expect("Failed to open config");
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.get::<u32>("Window", "width").unwrap(), 1280);
    assert_eq!(loaded.get::<String>("Window", "title").unwrap(), "mpu # sandbox");
    assert_eq!(loaded.blocks().collect::<Vec<_>>(), vec!["Window", "Log"]);
}

#[test]
fn open_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = CfgFile::open(dir.path().join("does_not_exist.cfg"));
    match result {
        Err(CfgError::Io { path, .. }) => assert!(path.ends_with("does_not_exist.cfg")),
        other => panic!("Expected an I/O error, got {other:?}"),
    }
}

#[test]
fn hand_written_file_with_comments() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("hand.cfg");
    std::fs::write(
        &path,
        "; generated by hand\n[Camera]\n  mode = fps   # or trackball\n\n  zoom_speed=0.5\n",
    )
    .unwrap();

    let cfg = CfgFile::open(&path).unwrap();
    assert_eq!(cfg.get::<String>("Camera", "mode").unwrap(), "fps");
    assert_eq!(cfg.get::<f32>("Camera", "zoom_speed").unwrap(), 0.5);
}
