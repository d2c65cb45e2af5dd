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

//! Position / orientation / scale transform for objects and cameras.

use serde::{Deserialize, Serialize};

use crate::math::{Mat4, Quaternion, Vec3, Vec4, EPSILON};

/// A decomposed affine transform.
///
/// The local frame is right-handed with `-Z` as "front", `+X` as "right" and
/// `+Y` as "up", which is what [`Transform::look_at`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World space position.
    pub position: Vec3,
    /// World space orientation.
    pub orientation: Quaternion,
    /// Scale along the local axes.
    pub scale: Vec3,
}

impl Transform {
    /// A transform at `position` with no rotation and unit scale.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quaternion::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Rotates the transform so that its front points at `target`.
    ///
    /// Leaves the orientation untouched when `target` is at the position or
    /// the view direction is parallel to `world_up`.
    pub fn look_at(&mut self, target: Vec3, world_up: Vec3) {
        let to_target = target - self.position;
        if to_target.length_squared() < EPSILON * EPSILON {
            return;
        }
        let front = to_target.normalize();
        let right = front.cross(world_up);
        if right.length_squared() < EPSILON * EPSILON {
            return;
        }
        let right = right.normalize();
        let up = right.cross(front);

        let basis = Mat4::from_cols(
            Vec4::from_vec3(right, 0.0),
            Vec4::from_vec3(up, 0.0),
            Vec4::from_vec3(-front, 0.0),
            Vec4::W,
        );
        self.orientation = Quaternion::from_rotation_matrix(&basis);
    }

    /// The model matrix, `translation * rotation * scale`.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation, self.position)
    }

    /// Local `-Z` in world space.
    #[inline]
    pub fn front(&self) -> Vec3 {
        self.orientation * -Vec3::Z
    }

    /// Local `+Z` in world space.
    #[inline]
    pub fn back(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Local `+X` in world space.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Local `-X` in world space.
    #[inline]
    pub fn left(&self) -> Vec3 {
        self.orientation * -Vec3::X
    }

    /// Local `+Y` in world space.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Local `-Y` in world space.
    #[inline]
    pub fn down(&self) -> Vec3 {
        self.orientation * -Vec3::Y
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}
